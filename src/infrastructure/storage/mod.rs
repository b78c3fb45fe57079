pub mod cache;
pub mod db;
pub mod memory;

pub use cache::TtlCache;
pub use db::SqliteStore;
pub use memory::MemoryStore;
