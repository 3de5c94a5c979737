//! Grant contexts a login can be performed for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;

/// The audience of a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantType {
    /// End-user application.
    App,
    /// Administrative portal.
    Portal,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Portal => "portal",
        }
    }

    /// Whether `role` may authenticate through this grant.
    pub fn allows(&self, role: &str, config: &AuthConfig) -> bool {
        let roles = match self {
            Self::App => &config.app_roles,
            Self::Portal => &config.portal_roles,
        };
        roles.iter().any(|r| r == role)
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "app" => Ok(Self::App),
            "portal" => Ok(Self::Portal),
            other => Err(AppError::invalid_grant_type(format!(
                "Unsupported grant_type '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;

    #[test]
    fn test_parse() {
        assert_eq!("app".parse::<GrantType>().unwrap(), GrantType::App);
        assert_eq!(" Portal ".parse::<GrantType>().unwrap(), GrantType::Portal);
        let err = "password".parse::<GrantType>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidGrantType);
    }

    #[test]
    fn test_role_gating() {
        let config = AuthConfig::default();
        assert!(GrantType::App.allows("user", &config));
        assert!(!GrantType::App.allows("admin", &config));
        assert!(GrantType::Portal.allows("admin", &config));
        assert!(GrantType::Portal.allows("superadmin", &config));
        assert!(!GrantType::Portal.allows("user", &config));
    }
}
