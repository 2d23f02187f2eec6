//! Token verification
//!
//! Resolvers receive the token as an argument and hand it to the
//! [`TokenVerifier`] stored in the schema data. [`JwtVerifier`] is the HS256
//! implementation used by the server.

use async_graphql::Context;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::error::BoardError;

/// Identity decoded from a verified token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Key of the user the token was issued to
    pub user_id: String,
    pub name: Option<String>,
}

pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthUser, BoardError>;
}

const ACCESS_TOKEN_TYPE: &str = "access";

/// Claims structure for access tokens
#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    name: Option<String>,
    token_type: String,
    exp: i64,
    iat: i64,
}

/// HS256 JWT issuer and verifier
#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_lifetime: i64,
}

impl JwtVerifier {
    pub fn new(secret: &str, token_lifetime: i64) -> Self {
        // Trim any whitespace/newlines from the secret
        let secret = secret.trim().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_lifetime,
        }
    }

    /// Issue an access token for a user
    pub fn issue(&self, user_id: &str, name: Option<&str>) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            name: name.map(str::to_string),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            exp: now + self.token_lifetime,
            iat: now,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<AuthUser, BoardError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::warn!("JWT verification failed: {}", e);
                BoardError::Unauthorized(e.to_string())
            })?;

        if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(BoardError::Unauthorized(format!(
                "unexpected token type '{}'",
                token_data.claims.token_type
            )));
        }

        tracing::debug!(user_pk = %token_data.claims.sub, "JWT verified");

        Ok(AuthUser {
            user_id: token_data.claims.sub,
            name: token_data.claims.name,
        })
    }
}

/// Extension trait to verify tokens against the schema's verifier
pub trait AuthExt {
    /// Verify a required token
    fn verify_token(&self, token: &str) -> Result<AuthUser, BoardError>;

    /// Verify a token if one was supplied
    fn verify_optional_token(&self, token: Option<&str>) -> Result<Option<AuthUser>, BoardError> {
        token.map(|t| self.verify_token(t)).transpose()
    }
}

impl<'a> AuthExt for Context<'a> {
    fn verify_token(&self, token: &str) -> Result<AuthUser, BoardError> {
        let verifier = self
            .data::<std::sync::Arc<dyn TokenVerifier>>()
            .map_err(|_| BoardError::Unauthorized("no token verifier configured".to_string()))?;
        verifier.verify(token)
    }
}
