use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;
use crate::domain::UserSnapshot;

pub const MIN_KEY_BYTES: usize = 32;
pub const TOKEN_LIFETIME_HOURS: i64 = 8;
pub const CLOCK_SKEW_SECONDS: i64 = 60;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Signing key must be at least {min} bytes, got {actual}")]
    KeyTooShort { min: usize, actual: usize },

    #[error("Failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("Invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("Token expired")]
    Expired,
}

/// Claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub unique_name: String,
    pub email: String,
    #[serde(default)]
    pub role: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies HS256 access tokens with a shared secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        let secret = config.key.as_bytes();
        if secret.len() < MIN_KEY_BYTES {
            return Err(TokenError::KeyTooShort {
                min: MIN_KEY_BYTES,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }

    pub fn issue(&self, user: UserSnapshot) -> Result<IssuedToken, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Build a token as if issued at `now`; expiry is `now` + 8 hours.
    pub fn issue_at(&self, user: UserSnapshot, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + Duration::hours(TOKEN_LIFETIME_HOURS);
        let claims = Claims {
            sub: user.user_id.to_string(),
            unique_name: user.username,
            email: user.email,
            role: user.roles,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken {
            access_token,
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Check signature, algorithm, issuer and audience, then expiry against `now`
    /// with one minute of tolerated clock skew.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // Expiry is checked below so it can be evaluated against `now`.
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(TokenError::Invalid)?
            .claims;

        if now.timestamp() > claims.exp + CLOCK_SKEW_SECONDS {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
