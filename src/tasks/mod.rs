// Tasks module
// Owner-scoped to-do items exposed as a JSON API and as server-rendered pages

pub mod handlers;
pub mod models;
pub mod pages;
pub mod service;

pub use models::{Task, TaskInput, TaskStatus};
pub use service::{TaskError, TaskService};
