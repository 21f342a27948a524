//! # CourseHub client core
//!
//! Headless client for a course marketplace backend: who is logged in, which
//! courses exist and which the visitor owns, per-course lectures, and a
//! resumable checkout that spans an external payment processor.
//!
//! ## Stores
//!
//! Each store owns its state in a `tokio::sync::watch` channel and is built
//! once by [`app::App`]. Dependencies only point one way:
//!
//! - `SessionStore` is the only writer of the bearer token and publishes an
//!   identity signal.
//! - `CatalogStore` subscribes to that signal to keep "my courses" in step.
//! - `LectureStore`, `UsersStore` and the checkout flow read the session and
//!   ask it to expire when the backend answers 401.
//!
//! Busy and loading flags are cleared by drop guards, so a failed or
//! cancelled call never leaves a control disabled.

pub mod app;
pub mod cli;
pub mod client;
pub mod features;
pub mod routes;
pub mod tasks;

pub use app::App;
pub use client::{AppConfig, AppError, GIT_COMMIT_HASH};
pub use routes::Route;
