//! Domain layer for the ecoscan analysis pipeline
//!
//! This module contains the data model, the error taxonomy and the ports
//! (traits) that adapters and infrastructure implement.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{EcoError, EcoResult, ErrorKind};
