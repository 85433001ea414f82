// Postgres storage backend (schema lives in migrations/)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{InviteStore, StoreError, TaskStore, UserStore};
use crate::auth::models::{NewUser, User};
use crate::invites::models::{Invite, NewInvite};
use crate::tasks::models::{Task, TaskDraft};

const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at, updated_at";
const INVITE_COLUMNS: &str = "id, token, email, invited_by, expires_at, used_at, created_at";
const TASK_COLUMNS: &str =
    "id, title, description, status, due_date, user_id, created_at, updated_at";

/// sqlx-backed implementation of every store trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // Check for unique constraint violation
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::AlreadyExists;
            }
        }
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, password_hash, name, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl InviteStore for PgStore {
    async fn create_invite(&self, invite: NewInvite) -> Result<Invite, StoreError> {
        let invite = sqlx::query_as::<_, Invite>(&format!(
            "INSERT INTO invites (id, token, email, invited_by, expires_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {INVITE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&invite.token)
        .bind(&invite.email)
        .bind(invite.invited_by)
        .bind(invite.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(invite)
    }

    async fn find_invite_by_token(&self, token: &str) -> Result<Option<Invite>, StoreError> {
        let invite = sqlx::query_as::<_, Invite>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invites WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invite)
    }

    async fn mark_invite_used(&self, token: &str, used_at: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE invites SET used_at = $1 WHERE token = $2 AND used_at IS NULL")
            .bind(used_at)
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing updated: distinguish an unknown token from a replay
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM invites WHERE token = $1)")
            .bind(token)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            Err(StoreError::Conflict("invite already used".to_string()))
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn list_invites(&self) -> Result<Vec<Invite>, StoreError> {
        let invites = sqlx::query_as::<_, Invite>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invites ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(invites)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, owner: Uuid, draft: TaskDraft) -> Result<Task, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, title, description, status, due_date, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TASK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.status)
        .bind(draft.due_date)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_tasks(&self, owner: Uuid) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        draft: TaskDraft,
    ) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks \
             SET title = $1, description = $2, status = $3, due_date = $4, updated_at = NOW() \
             WHERE id = $5 AND user_id = $6 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.status)
        .bind(draft.due_date)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
