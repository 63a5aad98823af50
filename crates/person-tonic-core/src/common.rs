//! Shared types and error definitions used by the person service.
//!
//! ## Submodules
//!
//! - [`error`] - Centralized service error type and its `tonic::Status`
//!   mapping.
//! - [`person`] - The `Person` entity, name validation, and proto
//!   conversions.

pub mod error;
pub mod person;

pub use error::{Error, Result};
pub use person::{Person, PersonId, validate_name};
