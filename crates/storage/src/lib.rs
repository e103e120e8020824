//! Course and progress record providers.
//!
//! This crate provides a trait-based interface standing in for the remote
//! course/progress API, with in-memory and JSON file implementations.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
