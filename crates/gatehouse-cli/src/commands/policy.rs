//! RBAC inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_auth::PolicySet;
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for policy commands
#[derive(Debug, Args)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

/// Policy subcommands
#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// List every grant and grouping edge
    List,
    /// Evaluate a single permission check
    Check {
        role: String,
        object: String,
        action: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct PolicyRow {
    kind: &'static str,
    subject: String,
    object: String,
    action: String,
}

/// Execute policy commands
pub fn execute(args: &PolicyArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let policies = PolicySet::from_config(&config.rbac)?;

    match &args.command {
        PolicyCommand::List => {
            let grants = policies.policies().into_iter().map(|p| PolicyRow {
                kind: "p",
                subject: p.role,
                object: p.object,
                action: p.action,
            });
            let edges = policies
                .groupings()
                .into_iter()
                .map(|(child, parent)| PolicyRow {
                    kind: "g",
                    subject: child,
                    object: parent,
                    action: String::new(),
                });
            let rows: Vec<PolicyRow> = grants.chain(edges).collect();
            output::print_list(&rows, format);
        }
        PolicyCommand::Check {
            role,
            object,
            action,
        } => {
            let allowed = policies.enforce(role, object, action);
            println!("{}", if allowed { "allow" } else { "deny" });
        }
    }
    Ok(())
}
