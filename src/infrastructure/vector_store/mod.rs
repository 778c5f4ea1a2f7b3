//! Vector store infrastructure - Store implementations

mod factory;
mod in_memory;
mod postgres;
mod sqlite;

pub use factory::VectorStoreFactory;
pub use in_memory::InMemoryVectorStore;
pub use postgres::PostgresVectorStore;
pub use sqlite::SqliteVectorStore;
