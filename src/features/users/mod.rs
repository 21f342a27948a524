//! Admin user management: list accounts, change roles and delete accounts.

pub mod client;
pub mod state;

pub use state::{UserDirectory, UsersStore};
