//! Adapters implementing the domain ports.

pub mod extractor;
pub mod memory_store;
pub mod sqlite;

pub use extractor::{JsonFileExtractor, StaticExtractor};
pub use memory_store::InMemoryStateStore;
pub use sqlite::SqliteStateStore;
