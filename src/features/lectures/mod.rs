//! Per-course lectures and their admin-only management.

pub mod client;
pub mod state;
pub mod types;

pub use state::{LectureStore, Lectures};
pub use types::{Creator, Lecture};
