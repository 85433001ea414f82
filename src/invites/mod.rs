// Invite module
// Single-use, time-bounded registration invites issued by admins

pub mod handlers;
pub mod models;
pub mod service;

pub use models::Invite;
pub use service::{InviteError, InviteService};
