//! CLI command definitions and dispatch.

pub mod hash;
pub mod migrate;
pub mod policy;
pub mod serve;
pub mod user;

use clap::{Parser, Subcommand};

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;

use crate::output::OutputFormat;

/// Gatehouse: authentication, sessions and access control
#[derive(Debug, Parser)]
#[command(name = "gatehouse", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file. When absent, `config/default.toml` and
    /// `config/{env}.toml` are layered.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Environment overlay to load
    #[arg(short, long, env = "GATEHOUSE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Apply pending database migrations
    Migrate,
    /// Identity management
    User(user::UserArgs),
    /// Print the Argon2id hash of a password
    HashPassword(hash::HashArgs),
    /// Inspect the effective RBAC policy set
    Policy(policy::PolicyArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = self.load_config()?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate => migrate::execute(&config).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::HashPassword(args) => hash::execute(args),
            Commands::Policy(args) => policy::execute(args, &config, self.format),
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        match &self.config {
            Some(path) => AppConfig::load_from(path),
            None => AppConfig::load(&self.env),
        }
    }
}

/// Read a secret from the terminal, asking twice when `confirm` is set.
pub fn prompt_password(prompt: &str, confirm: bool) -> Result<String, AppError> {
    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Repeat password", "Passwords do not match");
    }
    input
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
