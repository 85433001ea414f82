//! Persistence contract for users, invites and tasks.
//!
//! Handlers and services depend on these traits only. `postgres` backs them
//! with sqlx; `memory` keeps everything in process for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::models::{NewUser, User};
use crate::invites::models::{Invite, NewInvite};
use crate::tasks::models::{Task, TaskDraft};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Uniform error type for all storage backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint rejected the write
    #[error("already exists")]
    AlreadyExists,

    /// A conditional update found the record in the wrong state
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; fails with `AlreadyExists` when the email is taken
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Insert an invite; fails with `AlreadyExists` on a token collision
    async fn create_invite(&self, invite: NewInvite) -> Result<Invite, StoreError>;

    async fn find_invite_by_token(&self, token: &str) -> Result<Option<Invite>, StoreError>;

    /// Set `used_at` on an unused invite.
    ///
    /// Fails with `NotFound` for an unknown token and `Conflict` when the
    /// invite was already used, so a second consumption never succeeds.
    async fn mark_invite_used(&self, token: &str, used_at: DateTime<Utc>) -> Result<(), StoreError>;

    /// All invites, newest first
    async fn list_invites(&self) -> Result<Vec<Invite>, StoreError>;
}

/// Task persistence; every lookup and mutation is filtered by owner
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, owner: Uuid, draft: TaskDraft) -> Result<Task, StoreError>;

    /// Tasks owned by `owner`, newest first
    async fn list_tasks(&self, owner: Uuid) -> Result<Vec<Task>, StoreError>;

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError>;

    /// Replace the task's fields; `None` when no task matches (id, owner)
    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        draft: TaskDraft,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns false when no task matches (id, owner)
    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError>;
}

/// The three collections the application works with
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub invites: Arc<dyn InviteStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl Stores {
    /// Point every collection at the same backend
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + InviteStore + TaskStore + 'static,
    {
        Self {
            users: backend.clone(),
            invites: backend.clone(),
            tasks: backend,
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }
}
