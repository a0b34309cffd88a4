//! Adapters implementing the domain ports.

pub mod cipher;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
