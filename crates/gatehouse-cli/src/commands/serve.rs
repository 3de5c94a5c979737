//! Start the Gatehouse server.

use clap::Args;

use gatehouse_core::config::{AppConfig, DatabaseDriver};
use gatehouse_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Use the in-memory store driver (data is lost on exit)
    #[arg(long)]
    pub memory: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if args.memory {
        config.database.driver = DatabaseDriver::Memory;
    }

    gatehouse_api::run_server(config).await
}
