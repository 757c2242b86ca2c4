pub mod memory;
pub mod store;
pub mod valkey;

pub use memory::InMemoryRevocationStore;
pub use store::{RevocationError, RevocationFailurePolicy, RevocationStore};
pub use valkey::ValkeyRevocationStore;
