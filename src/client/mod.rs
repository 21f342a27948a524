//! Shared client plumbing: HTTP access, configuration, errors and storage.
//!
//! ## Credentials
//!
//! 1. **Bearer token:** written to durable storage by the session store on
//!    login and removed on logout, account deletion or a 401 from an
//!    authenticated call. Every request that needs it reads it fresh.
//! 2. **Activation token:** returned by registration, consumed by OTP
//!    verification, refreshed by OTP resend.
//! 3. **Checkout bridge:** `courseId` and `paymentIntentId` kept in
//!    session-scoped storage while the payment processor owns the flow.
//!
//! None of these values may be logged.

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod storage;

pub const GIT_COMMIT_HASH: &str = env!("COURSEHUB_GIT_SHA");

pub(crate) const APP_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub use api::{ApiClient, Auth, Upload};
pub use config::{AppConfig, AuthHeader};
pub use credentials::{CheckoutBridge, Credentials};
pub use errors::AppError;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
