pub mod diesel_store;
pub mod memory;
pub mod models;

pub use diesel_store::DieselStore;
pub use memory::MemoryStore;
