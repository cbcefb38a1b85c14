//! Adapters implementing the `AccountStore` port
//!
//! - **MemoryAccountStore**: in-memory store for tests and embedded use

pub mod memory;

pub use memory::MemoryAccountStore;
