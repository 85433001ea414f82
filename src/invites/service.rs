// Invite lifecycle: issuance, lookup and single-use consumption

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::invites::models::{generate_invite_token, Invite, NewInvite};
use crate::store::{InviteStore, StoreError};
use crate::validation::is_valid_email;

/// Token collisions are astronomically unlikely; retry a couple of times anyway
const MAX_TOKEN_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    #[error("Invite email is required")]
    MissingEmail,
    #[error("Invite email is not a valid address")]
    InvalidEmail,
    #[error("Invite not found")]
    NotFound,
    #[error("Invite has expired")]
    Expired,
    #[error("Invite has already been used")]
    AlreadyUsed,
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl InviteError {
    /// Code used in `?error=` redirects of the admin page
    pub fn error_code(&self) -> &'static str {
        match self {
            InviteError::MissingEmail => "missing_email",
            InviteError::InvalidEmail => "invalid_email",
            InviteError::NotFound => "invalid_invite",
            InviteError::Expired | InviteError::AlreadyUsed => "invite_expired",
            InviteError::Storage(_) => "internal_error",
        }
    }
}

pub struct InviteService {
    invites: Arc<dyn InviteStore>,
    ttl: Duration,
}

impl InviteService {
    pub fn new(invites: Arc<dyn InviteStore>, ttl: std::time::Duration) -> Self {
        Self {
            invites,
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(7)),
        }
    }

    /// Issue an invite for `email` on behalf of the admin `issuer`
    pub async fn create(&self, issuer: Uuid, email: &str) -> Result<Invite, InviteError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(InviteError::MissingEmail);
        }
        if !is_valid_email(email) {
            return Err(InviteError::InvalidEmail);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let new_invite = NewInvite {
                token: generate_invite_token(),
                email: email.to_string(),
                invited_by: issuer,
                expires_at: Utc::now() + self.ttl,
            };

            match self.invites.create_invite(new_invite).await {
                Ok(invite) => {
                    info!("Invite created: invite_id={}, invited_by={}", invite.id, issuer);
                    return Ok(invite);
                }
                Err(StoreError::AlreadyExists) if attempt < MAX_TOKEN_ATTEMPTS => {
                    warn!("Invite token collision, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// All invites, newest first
    pub async fn list(&self) -> Result<Vec<Invite>, InviteError> {
        Ok(self.invites.list_invites().await?)
    }

    /// Look up an invite that can still be redeemed
    ///
    /// Unknown tokens fail with `NotFound`; used ones with `AlreadyUsed`;
    /// stale ones with `Expired`.
    pub async fn check(&self, token: &str) -> Result<Invite, InviteError> {
        let invite = self
            .invites
            .find_invite_by_token(token)
            .await?
            .ok_or(InviteError::NotFound)?;

        if invite.used_at.is_some() {
            return Err(InviteError::AlreadyUsed);
        }
        if !invite.is_valid() {
            return Err(InviteError::Expired);
        }

        Ok(invite)
    }

    /// Mark an invite used; a second call for the same token fails
    pub async fn consume(&self, token: &str) -> Result<(), InviteError> {
        match self.invites.mark_invite_used(token, Utc::now()).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(InviteError::NotFound),
            Err(StoreError::Conflict(_)) => Err(InviteError::AlreadyUsed),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service_with_ttl(ttl: std::time::Duration) -> InviteService {
        InviteService::new(Arc::new(MemoryStore::new()), ttl)
    }

    fn service() -> InviteService {
        service_with_ttl(std::time::Duration::from_secs(7 * 24 * 3600))
    }

    #[tokio::test]
    async fn test_create_sets_seven_day_window() {
        let service = service();
        let admin = Uuid::new_v4();

        let invite = service.create(admin, "  a@x.com ").await.unwrap();

        assert_eq!(invite.email, "a@x.com");
        assert_eq!(invite.invited_by, admin);
        assert_eq!(invite.token.len(), 64);
        assert!(invite.used_at.is_none());
        let window = invite.expires_at - invite.created_at;
        assert!((window - Duration::days(7)).num_seconds().abs() <= 1);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let service = service();

        assert!(matches!(service.create(Uuid::new_v4(), "   ").await, Err(InviteError::MissingEmail)));
        assert!(matches!(
            service.create(Uuid::new_v4(), "not-an-email").await,
            Err(InviteError::InvalidEmail)
        ));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invite_is_single_use() {
        let service = service();
        let invite = service.create(Uuid::new_v4(), "a@x.com").await.unwrap();

        assert!(service.check(&invite.token).await.is_ok());
        service.consume(&invite.token).await.unwrap();

        assert!(matches!(service.check(&invite.token).await, Err(InviteError::AlreadyUsed)));
        assert!(matches!(service.consume(&invite.token).await, Err(InviteError::AlreadyUsed)));

        let listed = service.list().await.unwrap();
        assert!(listed[0].used_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let service = service();
        assert!(matches!(service.check("deadbeef").await, Err(InviteError::NotFound)));
        assert!(matches!(service.consume("deadbeef").await, Err(InviteError::NotFound)));
    }

    #[tokio::test]
    async fn test_expired_invite_is_rejected() {
        let service = service_with_ttl(std::time::Duration::from_secs(1));
        let invite = service.create(Uuid::new_v4(), "a@x.com").await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let result = service.check(&invite.token).await;
        assert!(matches!(result, Err(InviteError::Expired)));
        assert_eq!(result.unwrap_err().error_code(), "invite_expired");
    }
}
