//! Persistence layer for recipe records

pub mod atomic;
pub mod store;
pub mod story;

pub use atomic::write_atomic;
pub use store::{validate_id, RecordStore, StoreError};
pub use story::StoryStore;
