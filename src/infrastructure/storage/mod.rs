//! Storage backends for the persistence port

mod json_file;
mod memory;

pub use json_file::JsonFileStorage;
pub use memory::InMemoryStorage;
