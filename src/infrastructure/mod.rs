//! Infrastructure layer: storage backends

pub mod storage;

pub use storage::{InMemoryStorage, JsonFileStorage};
