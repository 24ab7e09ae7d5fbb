//! Storage Layer
//!
//! Handles data persistence: the JSON file-per-record tool store.

pub mod tool_store;

pub use tool_store::*;
