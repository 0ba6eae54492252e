//! In-memory catalog and store for tests and dry runs.

mod catalog;
mod store;

pub use catalog::MemoryCatalog;
pub use store::{ClassValue, ConstructorCall, MemoryStore};
