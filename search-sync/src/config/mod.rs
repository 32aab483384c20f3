//! Configuration for the search sync tool.

mod collections_file;
mod dependencies;
mod settings;

pub use collections_file::{load_definitions, parse_definitions};
pub use dependencies::Dependencies;
pub use settings::SyncConfig;
