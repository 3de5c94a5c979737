//! The token service used by the session manager and the HTTP layer.

use jsonwebtoken::Algorithm;
use serde::Serialize;
use serde::de::DeserializeOwned;

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

use super::claims::TokenKind;
use super::decoder::JwtDecoder;
use super::encoder::JwtEncoder;
use super::error::TokenError;

/// Issues and verifies tokens with one algorithm fixed at startup.
#[derive(Debug, Clone)]
pub struct TokenService {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl TokenService {
    /// Build the service from configuration. Only HMAC algorithms are
    /// accepted.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let algorithm = parse_algorithm(&config.jwt_algorithm)?;
        if config.jwt_secret.is_empty() {
            return Err(AppError::internal("auth.jwt_secret must not be empty"));
        }
        let secret = config.jwt_secret.as_bytes();

        Ok(Self {
            encoder: JwtEncoder::new(
                secret,
                algorithm,
                config.access_token_ttl_seconds,
                config.refresh_token_ttl_seconds,
            ),
            decoder: JwtDecoder::new(secret, algorithm),
        })
    }

    /// Sign claims as a token of the given kind.
    pub fn generate_token<C: Serialize>(
        &self,
        kind: TokenKind,
        claims: &C,
    ) -> Result<(String, u64), TokenError> {
        self.encoder.generate_token(kind, claims)
    }

    /// Verify a token and decode its claims.
    pub fn parse_token<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        self.decoder.parse_token(token)
    }

    /// Verify a token's signature and algorithm, ignoring its expiry.
    ///
    /// Only for locating the session of an expired refresh token; the
    /// claims must not be trusted as a credential.
    pub fn parse_token_unchecked_exp<C: DeserializeOwned>(
        &self,
        token: &str,
    ) -> Result<C, TokenError> {
        self.decoder.parse_token_unchecked_exp(token)
    }

    /// Lifetime of tokens of the given kind, in seconds.
    pub fn ttl_seconds(&self, kind: TokenKind) -> u64 {
        self.encoder.ttl_seconds(kind)
    }

    /// The underlying encoder.
    pub fn encoder(&self) -> &JwtEncoder {
        &self.encoder
    }
}

fn parse_algorithm(name: &str) -> AppResult<Algorithm> {
    match name.to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(AppError::internal(format!(
            "Unsupported auth.jwt_algorithm '{other}': expected HS256, HS384 or HS512"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::jwt::claims::{AccessClaims, RefreshClaims};

    fn config(algorithm: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            jwt_algorithm: algorithm.into(),
            ..AuthConfig::default()
        }
    }

    fn access() -> AccessClaims {
        AccessClaims {
            id: Uuid::now_v7(),
            email: "a@x.sky".into(),
            name: "Ann Admin".into(),
            role: "admin".into(),
        }
    }

    #[test]
    fn test_round_trip() {
        let tokens = TokenService::new(&config("HS256")).unwrap();
        let claims = access();
        let (token, expires_in) = tokens.generate_token(TokenKind::Access, &claims).unwrap();
        assert_eq!(expires_in, 3600);

        let parsed: AccessClaims = tokens.parse_token(&token).unwrap();
        assert_eq!(parsed, claims);
    }

    #[test]
    fn test_refresh_uses_refresh_ttl() {
        let tokens = TokenService::new(&config("HS512")).unwrap();
        let claims = RefreshClaims {
            id: Uuid::now_v7(),
            uid: Uuid::now_v7(),
        };
        let (token, expires_in) = tokens.generate_token(TokenKind::Refresh, &claims).unwrap();
        assert_eq!(expires_in, 86400);
        assert_eq!(tokens.parse_token::<RefreshClaims>(&token).unwrap(), claims);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new(&config("HS256")).unwrap();
        let token = tokens
            .encoder()
            .sign(&access(), Utc::now().timestamp() - 60)
            .unwrap();
        assert!(matches!(
            tokens.parse_token::<AccessClaims>(&token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_unchecked_exp_still_verifies_signature() {
        let tokens = TokenService::new(&config("HS256")).unwrap();
        let claims = RefreshClaims {
            id: Uuid::now_v7(),
            uid: Uuid::now_v7(),
        };
        let expired = tokens
            .encoder()
            .sign(&claims, Utc::now().timestamp() - 3600)
            .unwrap();

        assert!(matches!(
            tokens.parse_token::<RefreshClaims>(&expired),
            Err(TokenError::Expired)
        ));
        assert_eq!(
            tokens.parse_token_unchecked_exp::<RefreshClaims>(&expired).unwrap(),
            claims
        );

        let other = TokenService::new(&AuthConfig {
            jwt_secret: "other".into(),
            ..config("HS256")
        })
        .unwrap();
        assert!(matches!(
            other.parse_token_unchecked_exp::<RefreshClaims>(&expired),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_algorithm_confusion_rejected() {
        let signer = TokenService::new(&config("HS384")).unwrap();
        let verifier = TokenService::new(&config("HS256")).unwrap();
        let (token, _) = signer.generate_token(TokenKind::Access, &access()).unwrap();
        assert!(matches!(
            verifier.parse_token::<AccessClaims>(&token),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = TokenService::new(&config("HS256")).unwrap();
        let verifier = TokenService::new(&AuthConfig {
            jwt_secret: "other".into(),
            ..config("HS256")
        })
        .unwrap();
        let (token, _) = signer.generate_token(TokenKind::Access, &access()).unwrap();
        assert!(matches!(
            verifier.parse_token::<AccessClaims>(&token),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_claim_shapes_do_not_cross() {
        let tokens = TokenService::new(&config("HS256")).unwrap();
        let (refresh, _) = tokens
            .generate_token(
                TokenKind::Refresh,
                &RefreshClaims {
                    id: Uuid::now_v7(),
                    uid: Uuid::now_v7(),
                },
            )
            .unwrap();
        assert!(matches!(
            tokens.parse_token::<AccessClaims>(&refresh),
            Err(TokenError::MalformedToken(_))
        ));
        assert!(matches!(
            tokens.parse_token::<AccessClaims>("not.a.token"),
            Err(TokenError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_unknown_kind_and_algorithm() {
        assert!(matches!(
            "session".parse::<TokenKind>(),
            Err(TokenError::InvalidTokenType(_))
        ));
        assert!(TokenService::new(&config("RS256")).is_err());
        assert!(TokenService::new(&config("none")).is_err());
    }
}
