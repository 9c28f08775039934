use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tracing::{info, warn};

use rapport_crypto::password::{hash_password, verify_password};
use rapport_db::UserStore;
use rapport_db::models::UserRow;
use rapport_types::models::User;

use super::{blocking, user_from_row};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CreateUserError {
    #[error("User already exists")]
    AlreadyExists,
    #[error("Unable to create the user")]
    CreationFailed,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials used")]
    InvalidCredentials,
    /// Login with a username nobody holds.
    #[error("Invalid credentials used")]
    UnknownUsername,
    #[error("User not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        let store = self.store.clone();
        let row = blocking(move || store.get_user_by_id(id)).await?;
        Ok(row.map(user_from_row))
    }

    /// Raw row including the password hash, for credential checks.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let store = self.store.clone();
        let username = username.to_string();
        blocking(move || store.get_user_by_username(&username)).await
    }

    /// Register a new account and return its id.
    ///
    /// The id is read back by username after the insert. An empty read-back,
    /// or any store or hashing failure on the way, is `CreationFailed`.
    pub async fn create(&self, username: &str, password: &str) -> Result<i64, CreateUserError> {
        let failed = |stage: &str, e: anyhow::Error| {
            warn!("Creating user '{}' failed at {}: {:#}", username, stage, e);
            CreateUserError::CreationFailed
        };

        let existing = self
            .get_by_username(username)
            .await
            .map_err(|e| failed("lookup", e))?;
        if existing.is_some() {
            return Err(CreateUserError::AlreadyExists);
        }

        let plaintext = password.to_string();
        let password_hash = blocking(move || hash_password(&plaintext))
            .await
            .map_err(|e| failed("hashing", e))?;

        let store = self.store.clone();
        let name = username.to_string();
        blocking(move || store.insert_user(&name, &password_hash))
            .await
            .map_err(|e| failed("insert", e))?;

        match self.get_by_username(username).await {
            Ok(Some(row)) => {
                info!("Created user '{}' (id {})", row.username, row.id);
                Ok(row.id)
            }
            Ok(None) => {
                warn!("User '{}' was inserted but could not be read back", username);
                Err(CreateUserError::CreationFailed)
            }
            Err(e) => Err(failed("read-back", e)),
        }
    }

    /// Overwrite the stored hash. No strength rules are applied.
    pub async fn update_password(&self, id: i64, new_password: &str) -> Result<()> {
        let plaintext = new_password.to_string();
        let password_hash = blocking(move || hash_password(&plaintext)).await?;

        let store = self.store.clone();
        blocking(move || store.update_password(id, &password_hash)).await
    }

    /// Check a login attempt and return the user id on success.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<i64, AuthError> {
        let row = self
            .get_by_username(username)
            .await?
            .ok_or(AuthError::UnknownUsername)?;

        if !self.password_matches(password, &row).await? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(row.id)
    }

    /// Replace the password after confirming the current one.
    pub async fn change_password(
        &self,
        id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let store = self.store.clone();
        let row = blocking(move || store.get_user_by_id(id))
            .await?
            .ok_or(AuthError::NotFound)?;

        if !self.password_matches(current_password, &row).await? {
            return Err(AuthError::InvalidCredentials);
        }

        self.update_password(id, new_password).await?;
        info!("User {} changed their password", id);
        Ok(())
    }

    async fn password_matches(&self, password: &str, row: &UserRow) -> Result<bool> {
        let plaintext = password.to_string();
        let hash = row.password_hash.clone();
        blocking(move || verify_password(&plaintext, &hash)).await
    }
}
