//! Core types for Protolib
//!
//! This crate provides the building blocks shared by the operation library
//! and its tools:
//! - Value representation and JSON conversion
//! - Operation groups and effect tags
//! - Packed version numbers
//! - Error types

pub mod error;
pub mod group;
pub mod value;
pub mod version;

pub use error::{Error, Result};
pub use group::{Effect, Group};
pub use value::{Map, Value, ValueError};
pub use version::{Version, VersionInfo};
