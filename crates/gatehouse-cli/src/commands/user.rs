//! Identity management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_auth::{PasswordHasher, PasswordValidator};
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::traits::Repository;
use gatehouse_core::types::{FilterPayload, FilterValue, ListQuery};
use gatehouse_database::Stores;
use gatehouse_entity::user::User;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create an identity
    Create {
        /// Email address (login identifier)
        #[arg(long)]
        email: String,
        /// Given name
        #[arg(long)]
        first_name: String,
        /// Family name
        #[arg(long, default_value = "")]
        last_name: String,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
        /// Role tag
        #[arg(long, default_value = "user")]
        role: String,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// List identities
    List {
        /// Filter by role
        #[arg(short, long)]
        role: Option<String>,
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
        /// Sort order, e.g. `-created_at`
        #[arg(short, long, default_value = "+email")]
        sort: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    role: String,
    status: String,
    last_login_at: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.display_name(),
            role: user.role.clone(),
            status: user.status.to_string(),
            last_login_at: user
                .last_login_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let stores = Stores::open(&config.database).await?;

    let result = match &args.command {
        UserCommand::Create {
            email,
            first_name,
            last_name,
            phone,
            role,
            password,
        } => {
            let password = match password {
                Some(p) => p.clone(),
                None => super::prompt_password("Password", true)?,
            };
            PasswordValidator::new(&config.auth).validate(&password)?;
            let hash = PasswordHasher::new().hash_password(&password)?;

            let user = User::new(email, phone.as_deref(), first_name, last_name, hash, role);
            let user = stores.users.create(&user).await?;
            output::print_list(&[UserRow::from(&user)], format);
            output::print_success(&format!("Created {}", user.email));
            Ok(())
        }
        UserCommand::List { role, status, sort } => {
            let mut filter = FilterPayload::Empty;
            if let Some(role) = role {
                filter = filter.and_field("role", FilterValue::from(role.as_str()));
            }
            if let Some(status) = status {
                filter = filter.and_field("status", FilterValue::from(status.as_str()));
            }
            let query = ListQuery::default().with_sort(sort).with_filter(filter);

            let (users, total) = stores.users.list(&query).await?;
            let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!("{total} total");
            }
            Ok(())
        }
    };

    stores.close().await;
    result
}
