pub mod persist;
pub mod schema;
pub mod shared;
pub mod store;

pub use persist::MemoryFileStore;
pub use schema::{MemoryFile, MemoryKind, MemorySummary, TimestampedEntry};
pub use shared::{SharedMemory, spawn_flush_task};
pub use store::MemoryStore;
