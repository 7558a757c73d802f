//! # Storage Module
//!
//! Disk-backed implementations of `StudentStore`.

mod redb_store;

pub use redb_store::RedbStore;
