//! # Storage Backends
//!
//! Persistent implementations of the `EntityStore` trait. The in-memory
//! store lives next to the trait in `store`; this module holds the
//! disk-backed variants.

mod redb_store;

pub use redb_store::RedbStore;
