// HTTP handlers for the login, logout and registration pages

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::debug;

use crate::auth::{
    cookie::{clear_session_cookie, session_cookie},
    error::AuthError,
    middleware::MaybeUser,
    models::{LoginForm, PageMessage, RegisterForm},
};
use crate::{views, AppState};

fn redirect_with_error(path: &str, err: &AuthError) -> Response {
    debug!("Redirecting to {} with error={}", path, err.error_code());
    Redirect::to(&format!("{}?error={}", path, err.error_code())).into_response()
}

/// Redirect to `/` carrying a fresh session cookie
fn signed_in_redirect(state: &AppState, token: &str) -> Response {
    let cookie = session_cookie(
        token,
        state.tokens.ttl_seconds(),
        state.config.cookie_secure,
    );
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

fn invalid_invite_page() -> Response {
    (
        StatusCode::BAD_REQUEST,
        views::error_page("Invalid invite", "Invalid or expired invite"),
    )
        .into_response()
}

/// GET /login
pub async fn login_page(MaybeUser(user): MaybeUser, Query(message): Query<PageMessage>) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    views::login_page(&message).into_response()
}

/// POST /login (also mounted at /api/login)
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.auth.login(&form).await {
        Ok(signed_in) => signed_in_redirect(&state, &signed_in.token),
        Err(err) if err.status_code().is_server_error() => err.into_response(),
        Err(err) => redirect_with_error("/login", &err),
    }
}

/// POST /logout
///
/// Stateless sessions cannot be revoked; dropping the cookie is all there is.
pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

/// GET /register/{token}
pub async fn register_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(token): Path<String>,
    Query(message): Query<PageMessage>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    match state.auth.invite_for_registration(&token).await {
        Ok(invite) => views::register_page(&invite, &message).into_response(),
        Err(err) if err.status_code().is_server_error() => err.into_response(),
        Err(err) => {
            debug!("Registration page refused: {}", err);
            invalid_invite_page()
        }
    }
}

/// POST /register/{token}
pub async fn register_submit(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<RegisterForm>,
) -> Response {
    match state.auth.register(&token, &form).await {
        Ok(signed_in) => signed_in_redirect(&state, &signed_in.token),
        Err(err) if err.status_code().is_server_error() => err.into_response(),
        // Unknown token: nothing to send the visitor back to
        Err(AuthError::InvalidInvite) => invalid_invite_page(),
        Err(err) => redirect_with_error(&format!("/register/{}", token), &err),
    }
}
