//! Sign-in, signup with OTP verification and account self-service.

pub mod client;
pub mod state;
pub mod types;
pub mod validation;
pub mod watcher;

pub use state::{LoginOutcome, RegisterOutcome, Session, SessionPhase, SessionStore};
pub use types::{Role, User};
pub use watcher::TokenWatcher;
