//! # Search Sync Shared
//!
//! Types shared by every search sync crate: the record model that source
//! entities are read through, the declarative collection definitions, the
//! index schema derived from them, and the documents and import accounting
//! that flow to the search engine.

mod definition;
mod document;
mod import;
mod record;
mod schema;

pub use definition::{CollectionDefinition, FieldDefinition, FieldType};
pub use document::Document;
pub use import::ImportResult;
pub use record::{FieldValue, Record};
pub use schema::{IndexSchema, SchemaField, SchemaFieldType};
