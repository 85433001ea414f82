// Access middleware for protected routes
//
// Each variant validates the `token` cookie and, on success, stores an
// `AuthenticatedUser` in the request extensions for downstream handlers.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{
    cookie::{clear_session_header, read_session_token},
    error::AuthError,
    models::Role,
    token::{Claims, TokenService},
};

/// Identity attached to a request after its session token validated
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            issued_at: Utc.timestamp_opt(claims.iat, 0).single().unwrap_or_default(),
            expires_at: Utc.timestamp_opt(claims.exp, 0).single().unwrap_or_default(),
        }
    }
}

/// Reads the identity a middleware attached; rejects with 401 when there is none
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Identity if one is attached, for handlers that also serve anonymous visitors
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Outcome of looking at the session cookie
enum Session {
    Absent,
    Rejected(AuthError),
    Valid(AuthenticatedUser),
}

fn inspect_session(tokens: &TokenService, request: &Request) -> Session {
    let Some(token) = read_session_token(request.headers()) else {
        return Session::Absent;
    };

    match tokens.validate(&token) {
        Ok(claims) => Session::Valid(claims.into()),
        Err(err) => Session::Rejected(err),
    }
}

fn with_cleared_cookie(mut response: Response) -> Response {
    response
        .headers_mut()
        .append(header::SET_COOKIE, clear_session_header());
    response
}

/// Page-flow guard: no valid session means a redirect to `/login`
///
/// A present but invalid cookie is cleared on the way out.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let endpoint = request.uri().path().to_string();

    match inspect_session(&tokens, &request) {
        Session::Absent => {
            debug!("No session cookie for protected page: {}", endpoint);
            Redirect::to("/login").into_response()
        }
        Session::Rejected(err) => {
            warn!("Rejected session token for {}: {}", endpoint, err);
            with_cleared_cookie(Redirect::to("/login").into_response())
        }
        Session::Valid(user) => {
            debug!("Authenticated user_id={} for {}", user.user_id, endpoint);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
    }
}

/// API guard: same validation as [`require_auth`] but answers 401 JSON
pub async fn require_api_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let endpoint = request.uri().path().to_string();

    match inspect_session(&tokens, &request) {
        Session::Absent => {
            debug!("No session cookie for API endpoint: {}", endpoint);
            AuthError::MissingToken.into_response()
        }
        Session::Rejected(err) => {
            warn!("Rejected session token for {}: {}", endpoint, err);
            with_cleared_cookie(err.into_response())
        }
        Session::Valid(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
    }
}

/// Role gate; must run after [`require_auth`] has attached an identity
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    let Some(user) = request.extensions().get::<AuthenticatedUser>() else {
        warn!("Admin route reached without an identity: {}", endpoint);
        return Err(AuthError::InsufficientPermissions {
            required: Role::Admin,
            actual: Role::default(),
        });
    };

    if !user.is_admin() {
        warn!(
            "Authorization failed: user_id={}, required_role={}, actual_role={}, endpoint={}",
            user.user_id,
            Role::Admin,
            user.role,
            endpoint
        );
        return Err(AuthError::InsufficientPermissions {
            required: Role::Admin,
            actual: user.role,
        });
    }

    debug!("Authorization successful: user_id={}, endpoint={}", user.user_id, endpoint);
    Ok(next.run(request).await)
}

/// Attach an identity when the cookie validates, otherwise continue anonymously
pub async fn optional_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    match inspect_session(&tokens, &request) {
        Session::Valid(user) => {
            request.extensions_mut().insert(user);
        }
        Session::Rejected(err) => {
            debug!("Ignoring invalid session token on optional route: {}", err);
        }
        Session::Absent => {}
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use std::time::Duration;
    use tower::ServiceExt;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(SECRET, Duration::from_secs(3600)))
    }

    async fn whoami(user: AuthenticatedUser) -> String {
        user.email
    }

    async fn maybe(MaybeUser(user): MaybeUser) -> String {
        user.map(|u| u.email).unwrap_or_else(|| "anonymous".to_string())
    }

    fn page_app() -> Router {
        let tokens = tokens();
        Router::new()
            .route("/", get(whoami))
            .route_layer(middleware::from_fn_with_state(tokens, require_auth))
    }

    fn admin_app() -> Router {
        let tokens = tokens();
        Router::new()
            .route("/admin", get(whoami))
            .route_layer(middleware::from_fn(require_admin))
            .route_layer(middleware::from_fn_with_state(tokens, require_auth))
    }

    fn request(path: &str, cookie: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        builder.body(Body::empty()).unwrap()
    }

    fn cookie_for(role: Role) -> String {
        let token = tokens().issue(Uuid::new_v4(), "someone@example.com", role).unwrap();
        format!("token={}", token)
    }

    #[tokio::test]
    async fn test_missing_cookie_redirects_without_clearing() {
        let response = page_app().oneshot(request("/", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_bad_cookie_redirects_and_clears() {
        let response = page_app()
            .oneshot(request("/", Some("token=garbage")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.starts_with("token=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_valid_cookie_reaches_handler_with_identity() {
        let response = page_app()
            .oneshot(request("/", Some(&cookie_for(Role::User))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let as_user = admin_app()
            .oneshot(request("/admin", Some(&cookie_for(Role::User))))
            .await
            .unwrap();
        assert_eq!(as_user.status(), StatusCode::FORBIDDEN);

        let as_admin = admin_app()
            .oneshot(request("/admin", Some(&cookie_for(Role::Admin))))
            .await
            .unwrap();
        assert_eq!(as_admin.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_gate_without_identity_is_forbidden() {
        let app = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(require_admin));

        let response = app.oneshot(request("/admin", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_api_guard_answers_401() {
        let app = Router::new()
            .route("/api", get(whoami))
            .route_layer(middleware::from_fn_with_state(tokens(), require_api_auth));

        let missing = app.clone().oneshot(request("/api", None)).await.unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert!(missing.headers().get(header::SET_COOKIE).is_none());

        let bad = app.oneshot(request("/api", Some("token=a.b.c"))).await.unwrap();
        assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
        assert!(bad.headers().get(header::SET_COOKIE).is_some());
    }

    #[tokio::test]
    async fn test_optional_auth_never_blocks() {
        let app = Router::new()
            .route("/", get(maybe))
            .route_layer(middleware::from_fn_with_state(tokens(), optional_auth));

        let valid = cookie_for(Role::User);
        for cookie in [None, Some("token=garbage"), Some(valid.as_str())] {
            let response = app.clone().oneshot(request("/", cookie)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_401() {
        let app = Router::new().route("/", get(whoami));
        let response = app.oneshot(request("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
