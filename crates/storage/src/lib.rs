//! Key-value persistence for Lectio.
//!
//! This crate provides the minimal async key-value contract the progress
//! engine saves its snapshot through, with an in-memory and a JSON file
//! implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod memory;
pub mod json_file;

pub use trait_::{KeyValueStore, StorageError, Result};
pub use memory::MemoryStore;
pub use json_file::JsonFileStore;
