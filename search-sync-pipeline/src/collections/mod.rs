//! Collection registry and lifecycle management.

mod manager;
mod registry;

pub use manager::CollectionManager;
pub use registry::CollectionRegistry;
