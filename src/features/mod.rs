pub mod auth;
pub mod courses;
pub mod lectures;
pub mod payments;
pub mod users;
