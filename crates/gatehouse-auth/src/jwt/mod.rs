//! Token issuance and verification.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod service;

pub use claims::{AccessClaims, Expiring, RefreshClaims, TokenKind};
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;
pub use error::TokenError;
pub use service::TokenService;
