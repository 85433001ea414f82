// Admin pages for issuing and listing invites

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::debug;

use crate::auth::{error::AuthError, middleware::AuthenticatedUser, models::PageMessage};
use crate::invites::{models::CreateInviteForm, service::InviteError};
use crate::{views, AppState};

/// GET /admin/invites
pub async fn list_invites(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Query(message): Query<PageMessage>,
) -> Result<Response, AuthError> {
    let invites = state.invites.list().await?;
    Ok(views::invites_page(&admin, &invites, &message).into_response())
}

/// POST /admin/invites
pub async fn create_invite(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Form(form): Form<CreateInviteForm>,
) -> Result<Response, AuthError> {
    match state.invites.create(admin.user_id, &form.email).await {
        Ok(_) => Ok(Redirect::to("/admin/invites?success=invite_created").into_response()),
        Err(err @ (InviteError::MissingEmail | InviteError::InvalidEmail)) => {
            debug!("Invite creation refused: {}", err);
            Ok(Redirect::to(&format!("/admin/invites?error={}", err.error_code())).into_response())
        }
        Err(err) => Err(err.into()),
    }
}
