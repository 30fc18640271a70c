//! Core types and trait definitions for the Folio contact API.
//!
//! No HTTP, mail-transport or database dependencies. All other crates
//! depend on it.

pub mod mail;
pub mod store;
pub mod submission;
pub mod validate;

pub use validate::{FieldError, ValidationErrors, ValidationRules};
