//! Password hashing helper.

use clap::Args;

use gatehouse_auth::PasswordHasher;
use gatehouse_core::error::AppError;

/// Arguments for hash-password
#[derive(Debug, Args)]
pub struct HashArgs {
    /// Password to hash; prompted for when omitted
    pub password: Option<String>,
}

/// Print the PHC-formatted Argon2id hash
pub fn execute(args: &HashArgs) -> Result<(), AppError> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => super::prompt_password("Password", false)?,
    };
    println!("{}", PasswordHasher::new().hash_password(&password)?);
    Ok(())
}
