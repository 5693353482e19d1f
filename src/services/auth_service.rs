use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::config::AdminSeed;
use crate::db::DbError;
use crate::domain::User;
use crate::repositories::UserRepository;

use super::token_service::{IssuedToken, TokenError, TokenService};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] DbError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Checks credentials against the identity store and issues access tokens.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    /// Hash checked for unknown usernames so they cost the same argon2 work.
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self {
            users,
            tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| hash_password(Uuid::new_v4().to_string()))
                .await?;
            verify_password(password.to_string(), dummy.clone()).await?;

            tracing::info!("Login rejected for unknown user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::info!("Login rejected for user '{}': bad password", username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.snapshot())?;
        tracing::info!("Issued token for user '{}'", username);

        Ok(token)
    }

    /// Register an account unless the username is already taken. Returns whether it was created.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        roles: Vec<String>,
    ) -> Result<bool, AuthError> {
        let user = User {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password.to_string()).await?,
            roles,
        };

        Ok(self.users.insert_user_if_absent(&user).await?)
    }

    pub async fn seed_admin(&self, seed: &AdminSeed) -> Result<bool, AuthError> {
        if self.users.find_by_username(&seed.username).await?.is_some() {
            tracing::debug!("Admin account '{}' already present", seed.username);
            return Ok(false);
        }

        let created = self
            .register(&seed.username, &seed.email, &seed.password, seed.roles.clone())
            .await?;
        if created {
            tracing::info!(
                "Seeded admin account '{}' with roles {:?}",
                seed.username,
                seed.roles
            );
        }

        Ok(created)
    }
}

// argon2 is CPU bound; keep it off the async workers.
async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

async fn verify_password(password: String, stored_hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed =
            PasswordHash::new(&stored_hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}
