//! # gatehouse-auth
//!
//! Authentication and authorization for Gatehouse.
//!
//! ## Modules
//!
//! - `jwt`: signed, time-bound access and refresh tokens
//! - `password`: Argon2id hashing and password policy
//! - `rbac`: policy set with role inheritance
//! - `session`: login, refresh, revocation and expired-session cleanup

pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;

pub use jwt::{AccessClaims, RefreshClaims, TokenError, TokenKind, TokenService};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{PolicySet, RbacEnforcer};
pub use session::{GrantType, LoginInput, SessionCleanup, SessionManager};
