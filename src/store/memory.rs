//! In-process storage backend.
//!
//! Mirrors the Postgres constraints (unique email, unique invite token,
//! conditional invite consumption) so services behave the same on both.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{InviteStore, StoreError, TaskStore, UserStore};
use crate::auth::models::{NewUser, User};
use crate::invites::models::{Invite, NewInvite};
use crate::tasks::models::{Task, TaskDraft};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    invites: RwLock<HashMap<Uuid, Invite>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::AlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.users.read().await.len() as i64)
    }
}

#[async_trait]
impl InviteStore for MemoryStore {
    async fn create_invite(&self, invite: NewInvite) -> Result<Invite, StoreError> {
        let mut invites = self.invites.write().await;
        if invites.values().any(|existing| existing.token == invite.token) {
            return Err(StoreError::AlreadyExists);
        }

        let invite = Invite {
            id: Uuid::new_v4(),
            token: invite.token,
            email: invite.email,
            invited_by: invite.invited_by,
            expires_at: invite.expires_at,
            used_at: None,
            created_at: Utc::now(),
        };
        invites.insert(invite.id, invite.clone());

        Ok(invite)
    }

    async fn find_invite_by_token(&self, token: &str) -> Result<Option<Invite>, StoreError> {
        let invites = self.invites.read().await;
        Ok(invites.values().find(|invite| invite.token == token).cloned())
    }

    async fn mark_invite_used(&self, token: &str, used_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut invites = self.invites.write().await;
        let invite = invites
            .values_mut()
            .find(|invite| invite.token == token)
            .ok_or(StoreError::NotFound)?;

        if invite.used_at.is_some() {
            return Err(StoreError::Conflict("invite already used".to_string()));
        }
        invite.used_at = Some(used_at);

        Ok(())
    }

    async fn list_invites(&self) -> Result<Vec<Invite>, StoreError> {
        let mut invites: Vec<Invite> = self.invites.read().await.values().cloned().collect();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invites)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, owner: Uuid, draft: TaskDraft) -> Result<Task, StoreError> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            due_date: draft.due_date,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.insert(task.id, task.clone());

        Ok(task)
    }

    async fn list_tasks(&self, owner: Uuid) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|task| task.user_id == owner)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).filter(|task| task.user_id == owner).cloned())
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        draft: TaskDraft,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.get_mut(&id).filter(|task| task.user_id == owner) else {
            return Ok(None);
        };

        task.title = draft.title;
        task.description = draft.description;
        task.status = draft.status;
        task.due_date = draft.due_date;
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get(&id) {
            Some(task) if task.user_id == owner => {
                tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
