pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod invites;
pub mod store;
pub mod tasks;
pub mod validation;
pub mod views;

use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{optional_auth, require_admin, require_api_auth, require_auth, AuthService, TokenService};
use config::AppConfig;
use error::ErrorResponse;
use invites::InviteService;
use store::Stores;
use tasks::{Task, TaskInput, TaskService, TaskStatus};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        tasks::handlers::list_tasks,
        tasks::handlers::create_task,
        tasks::handlers::get_task,
        tasks::handlers::update_task,
        tasks::handlers::delete_task,
    ),
    components(
        schemas(Task, TaskInput, TaskStatus, ErrorResponse)
    ),
    tags(
        (name = "tasks", description = "Owner-scoped task management; requires the session cookie")
    ),
    info(
        title = "Taskboard API",
        version = "0.1.0",
        description = "JSON API for the signed-in user's tasks"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthService>,
    pub invites: Arc<InviteService>,
    pub tasks: Arc<TaskService>,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl));
        let invites = Arc::new(InviteService::new(stores.invites.clone(), config.invite_ttl));
        let auth = Arc::new(AuthService::new(
            stores.users.clone(),
            invites.clone(),
            tokens.clone(),
        ));
        let tasks = Arc::new(TaskService::new(stores.tasks.clone()));

        Self {
            config: Arc::new(config),
            tokens,
            auth,
            invites,
            tasks,
        }
    }
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Creates and configures the application router
pub fn create_router(state: AppState) -> Router {
    let tokens = state.tokens.clone();

    // Login and registration pages send already signed-in visitors home
    let public_pages = Router::new()
        .route("/login", get(auth::handlers::login_page))
        .route("/register/:token", get(auth::handlers::register_page))
        .route_layer(middleware::from_fn_with_state(tokens.clone(), optional_auth));

    let public_actions = Router::new()
        .route("/login", post(auth::handlers::login_submit))
        .route("/api/login", post(auth::handlers::login_submit))
        .route("/logout", post(auth::handlers::logout))
        .route("/register/:token", post(auth::handlers::register_submit))
        .route("/health", get(health));

    let task_pages = Router::new()
        .route("/", get(tasks::pages::dashboard))
        .route("/tasks", post(tasks::pages::create_task))
        .route("/tasks/new", get(tasks::pages::new_task_page))
        .route("/tasks/:id", post(tasks::pages::update_task))
        .route("/tasks/:id/edit", get(tasks::pages::edit_task_page))
        .route("/tasks/:id/delete", post(tasks::pages::delete_task))
        .route_layer(middleware::from_fn_with_state(tokens.clone(), require_auth));

    // Layers run last-added first: authenticate, then check the role
    let admin_pages = Router::new()
        .route(
            "/admin/invites",
            get(invites::handlers::list_invites).post(invites::handlers::create_invite),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(tokens.clone(), require_auth));

    let task_api = Router::new()
        .route(
            "/api/tasks",
            get(tasks::handlers::list_tasks).post(tasks::handlers::create_task),
        )
        .route(
            "/api/tasks/:id",
            get(tasks::handlers::get_task)
                .put(tasks::handlers::update_task)
                .delete(tasks::handlers::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(tokens, require_api_auth));

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_timeout = state.config.request_timeout;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_pages)
        .merge(public_actions)
        .merge(task_pages)
        .merge(admin_pages)
        .merge(task_api)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
