//! fieldrules Core
//!
//! Types and utilities shared across fieldrules components.
//!
//! This crate provides:
//! - The error type and result alias used by every crate in the workspace
//! - `FieldValue`, the loosely typed value a host hands to the engine

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::FieldValue;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::FieldValue;
}
