// Authentication service - login and invite-gated registration

use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{
    error::AuthError,
    models::{LoginForm, NewUser, RegisterForm, Role, User},
    password::PasswordService,
    token::TokenService,
};
use crate::invites::{models::Invite, service::InviteService};
use crate::store::{StoreError, UserStore};
use crate::validation::is_valid_email;

/// A user who just proved their identity, with the session token to hand out
#[derive(Debug)]
pub struct SignedIn {
    pub user: User,
    pub token: String,
}

/// Authentication service coordinating credential checks, invites and tokens
pub struct AuthService {
    users: Arc<dyn UserStore>,
    invites: Arc<InviteService>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        invites: Arc<InviteService>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            invites,
            tokens,
        }
    }

    /// Check email and password and issue a session token
    ///
    /// Unknown email and wrong password both fail with `InvalidCredentials`.
    pub async fn login(&self, form: &LoginForm) -> Result<SignedIn, AuthError> {
        let email = form.email.trim();
        if email.is_empty() || form.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let Some(user) = self.users.find_user_by_email(email).await? else {
            PasswordService::verify_against_dummy(&form.password);
            return Err(AuthError::InvalidCredentials);
        };

        if !PasswordService::verify_password(&form.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.email, user.role)?;
        info!("User logged in: user_id={}", user.id);

        Ok(SignedIn { user, token })
    }

    /// Invite that the registration page may be shown for
    pub async fn invite_for_registration(&self, token: &str) -> Result<Invite, AuthError> {
        Ok(self.invites.check(token).await?)
    }

    /// Create an account against an invite and sign the new user in
    pub async fn register(
        &self,
        invite_token: &str,
        form: &RegisterForm,
    ) -> Result<SignedIn, AuthError> {
        let invite = self.invites.check(invite_token).await?;

        let name = form.name.trim();
        let email = form.email.trim();
        if name.is_empty()
            || email.is_empty()
            || form.password.is_empty()
            || form.confirm_password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if email != invite.email {
            return Err(AuthError::EmailMismatch);
        }
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        PasswordService::validate_password_strength(&form.password)?;

        let password_hash = PasswordService::hash_password(&form.password)?;
        let user = self
            .users
            .create_user(NewUser {
                email: email.to_string(),
                password_hash,
                name: name.to_string(),
                role: Role::User,
            })
            .await
            .map_err(|err| match err {
                StoreError::AlreadyExists => AuthError::EmailAlreadyExists,
                other => AuthError::StorageError(other),
            })?;

        // The account exists at this point; a failed consume is logged, not surfaced
        if let Err(err) = self.invites.consume(invite_token).await {
            warn!(
                "Failed to mark invite used after registration: invite_id={}, user_id={}, error={}",
                invite.id, user.id, err
            );
        }

        let token = self.tokens.issue(user.id, &user.email, user.role)?;
        info!("User registered: user_id={}, invite_id={}", user.id, invite.id);

        Ok(SignedIn { user, token })
    }
}

/// Create the first administrator when the user collection is empty
///
/// Returns `None` when any user already exists.
pub async fn bootstrap_admin(
    users: &dyn UserStore,
    email: &str,
    password: &str,
    name: &str,
) -> Result<Option<User>, AuthError> {
    if users.count_users().await? > 0 {
        info!("Users already exist; skipping admin bootstrap");
        return Ok(None);
    }

    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail);
    }
    PasswordService::validate_password_strength(password)?;

    let admin = users
        .create_user(NewUser {
            email: email.to_string(),
            password_hash: PasswordService::hash_password(password)?,
            name: name.trim().to_string(),
            role: Role::Admin,
        })
        .await?;

    info!("Administrator created: user_id={}", admin.id);
    Ok(Some(admin))
}
