//! Interface definitions for the collaborators of the sync core.
//!
//! The core never talks to a search engine, a database or an ORM directly.
//! It goes through these traits so backends can be swapped and mocked.

mod mutation_observer;
mod record_source;
mod search_engine_client;

pub use mutation_observer::{MutationEvent, MutationKind, MutationObserver};
pub use record_source::RecordSource;
pub use search_engine_client::SearchEngineClient;
