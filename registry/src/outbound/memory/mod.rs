//! In-memory store adapter and the record table it shares with the snapshot
//! adapter.

mod in_memory_user_store;
pub(crate) mod record_table;

pub use in_memory_user_store::InMemoryUserStore;
pub use record_table::TableIntegrityError;
