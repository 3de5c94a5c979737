//! Token signing with a fixed algorithm and per-kind TTL.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;

use super::claims::{Expiring, TokenKind};
use super::error::TokenError;

/// Creates signed access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("algorithm", &self.algorithm)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

impl JwtEncoder {
    /// Create an encoder for an HMAC secret.
    pub fn new(
        secret: &[u8],
        algorithm: Algorithm,
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            algorithm,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Lifetime of tokens of the given kind, in seconds.
    pub fn ttl_seconds(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Access => self.access_ttl_seconds,
            TokenKind::Refresh => self.refresh_ttl_seconds,
        }
    }

    /// Sign `claims` with `exp = now + ttl(kind)`.
    ///
    /// Returns the token and its lifetime in seconds.
    pub fn generate_token<C: Serialize>(
        &self,
        kind: TokenKind,
        claims: &C,
    ) -> Result<(String, u64), TokenError> {
        let ttl = self.ttl_seconds(kind);
        let exp = Utc::now().timestamp() + i64::try_from(ttl).unwrap_or(i64::MAX / 2);
        let token = self.sign(claims, exp)?;
        Ok((token, ttl))
    }

    /// Sign `claims` with an explicit expiry (seconds since the epoch).
    pub fn sign<C: Serialize>(&self, claims: &C, exp: i64) -> Result<String, TokenError> {
        encode(
            &Header::new(self.algorithm),
            &Expiring { claims, exp },
            &self.encoding_key,
        )
        .map_err(TokenError::SigningFailure)
    }
}
