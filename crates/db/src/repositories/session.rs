//! Session repository for refresh-token sessions.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::sessions;

/// Error types for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No active session matches the token.
    #[error("Session not found or expired")]
    NotFound,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Hashes a refresh token for storage; raw tokens are never persisted.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

/// Session repository for refresh-token lifecycle.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a new session for a freshly issued refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        refresh_token: &str,
        user_agent: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<sessions::Model, SessionError> {
        let now = Utc::now().into();
        let session = sessions::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            refresh_token_hash: Set(hash_token(refresh_token)),
            user_agent: Set(user_agent),
            expires_at: Set(expires_at.into()),
            revoked_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(session.insert(&self.db).await?)
    }

    /// Finds the active (unrevoked, unexpired) session for a token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if no active session matches.
    pub async fn find_active(&self, refresh_token: &str) -> Result<sessions::Model, SessionError> {
        let session = sessions::Entity::find()
            .filter(sessions::Column::RefreshTokenHash.eq(hash_token(refresh_token)))
            .filter(sessions::Column::RevokedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(SessionError::NotFound)?;

        if session.expires_at < Utc::now() {
            return Err(SessionError::NotFound);
        }
        Ok(session)
    }

    /// Revokes the session holding a refresh token (used on logout and
    /// on rotation).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if no active session matches.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), SessionError> {
        let session = self.find_active(refresh_token).await?;
        let mut active: sessions::ActiveModel = session.into();
        active.revoked_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }

    #[test]
    fn test_hash_token_is_hex_sha256() {
        let hash = hash_token("token");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
