//! Course catalog and enrollment.

pub mod client;
pub mod state;
pub mod types;

pub use state::{Catalog, CatalogStore};
pub use types::{Course, NewCourse, Price};
