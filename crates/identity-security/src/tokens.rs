//! Token provider: access tokens and email confirmation codes (JWT)

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Token issued for {actual}, expected {expected}")]
    WrongPurpose { expected: &'static str, actual: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Access,
    EmailConfirmation,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::EmailConfirmation => "email_confirmation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub purpose: String,
    /// Security stamp of the account when the token was issued
    pub stamp: String,
}

impl TokenClaims {
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|e| TokenError::ValidationError(e.to_string()))
    }
}

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_token_expiry: i64,
    confirmation_token_expiry: i64,
}

impl TokenService {
    pub fn new(secret: String, access_expiry: i64, confirmation_expiry: i64) -> Self {
        Self {
            secret,
            access_token_expiry: access_expiry,
            confirmation_token_expiry: confirmation_expiry,
        }
    }

    pub fn generate_access_token(&self, user_id: &Uuid, stamp: &str) -> Result<String, TokenError> {
        self.generate_token(user_id, stamp, TokenPurpose::Access, self.access_token_expiry)
    }

    pub fn generate_confirmation_token(&self, user_id: &Uuid, stamp: &str) -> Result<String, TokenError> {
        self.generate_token(
            user_id,
            stamp,
            TokenPurpose::EmailConfirmation,
            self.confirmation_token_expiry,
        )
    }

    fn generate_token(
        &self,
        user_id: &Uuid,
        stamp: &str,
        purpose: TokenPurpose,
        expiry: i64,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
            purpose: purpose.as_str().to_string(),
            stamp: stamp.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str, purpose: TokenPurpose) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            _ => TokenError::ValidationError(e.to_string()),
        })?;

        if claims.purpose != purpose.as_str() {
            return Err(TokenError::WrongPurpose {
                expected: purpose.as_str(),
                actual: claims.purpose,
            });
        }
        Ok(claims)
    }
}
