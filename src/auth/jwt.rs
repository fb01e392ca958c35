//! JWT token generation and validation
//! Implements access token + refresh token pattern

use crate::{config::AppConfig, error::AppError, models::Role};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Refresh tokens (and their session entries) live for 7 days
pub const REFRESH_TOKEN_TTL: std::time::Duration = std::time::Duration::from_secs(7 * 24 * 60 * 60);

/// Minimum HS256 secret length
const MIN_SECRET_LEN: usize = 32;

/// Upper bound for the access token lifetime (30 days)
pub const MAX_ACCESS_TOKEN_HOURS: u64 = 720;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Numeric user id
    pub user_id: i64,

    /// Present on access tokens only; refresh tokens never carry a role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    pub token_type: TokenType,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Token pair returned by login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Why a token was rejected. Callers outside the auth core only ever see 401.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("malformed token")]
    Malformed,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_ttl: Duration,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.security.jwt_secret.expose_secret(),
            config.security.access_token_exp_hours,
        )
    }

    pub fn new(secret: &str, access_token_exp_hours: u64) -> Result<Self, AppError> {
        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }
        if !(1..=MAX_ACCESS_TOKEN_HOURS).contains(&access_token_exp_hours) {
            return Err(AppError::Config(format!(
                "access token lifetime must be between 1 and {} hours",
                MAX_ACCESS_TOKEN_HOURS
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_token_ttl: Duration::hours(access_token_exp_hours as i64),
        })
    }

    /// Generate an access/refresh pair issued now
    pub fn generate_tokens(&self, user_id: i64, role: Role) -> Result<TokenPair, TokenError> {
        self.generate_tokens_at(user_id, role, Utc::now())
    }

    /// Generate a pair as if issued at `issued_at`
    pub fn generate_tokens_at(
        &self,
        user_id: i64,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let access = Claims {
            user_id,
            role: Some(role),
            token_type: TokenType::Access,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.access_token_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let refresh_ttl = Duration::seconds(REFRESH_TOKEN_TTL.as_secs() as i64);
        let refresh = Claims {
            user_id,
            role: None,
            token_type: TokenType::Refresh,
            iat: issued_at.timestamp(),
            exp: (issued_at + refresh_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode {:?} token: {:?}", claims.token_type, e);
            TokenError::Signing(e.to_string())
        })
    }

    /// Validate and decode token
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let err = TokenError::from(e);
                tracing::debug!(reason = %err, "Token validation failed");
                err
            })
    }

    /// Validate access token specifically
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_typed(token, TokenType::Access)
    }

    /// Validate refresh token specifically
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_typed(token, TokenType::Refresh)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != expected {
            tracing::debug!(
                "Token type mismatch: expected {:?}, got {:?}",
                expected,
                claims.token_type
            );
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }
}
