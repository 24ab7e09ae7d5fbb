//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod tool;

pub use tool::*;
