// Authentication module
// Cookie-carried JWT sessions, invite-gated registration and role checks

pub mod cookie;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::{optional_auth, require_admin, require_api_auth, require_auth, AuthenticatedUser, MaybeUser};
pub use models::{Role, User};
pub use service::AuthService;
pub use token::{Claims, TokenService};
