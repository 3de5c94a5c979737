//! Token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;

use super::claims::Expiring;
use super::error::TokenError;

/// Validates signature, algorithm and expiry of tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    /// Same checks without `exp`; used to identify the session behind an
    /// expired refresh token.
    lenient: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Create a decoder that only accepts `algorithm`.
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Self {
        // Only the configured algorithm is accepted; the header is never trusted.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.leeway = 5;

        let mut lenient = validation.clone();
        lenient.validate_exp = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lenient,
        }
    }

    /// Verify a token and return its subject claims.
    pub fn parse_token<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        let data = decode::<Expiring<C>>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims.claims)
    }

    /// Verify signature and algorithm but not expiry.
    pub fn parse_token_unchecked_exp<C: DeserializeOwned>(
        &self,
        token: &str,
    ) -> Result<C, TokenError> {
        let data = decode::<Expiring<C>>(token, &self.decoding_key, &self.lenient)?;
        Ok(data.claims.claims)
    }
}
