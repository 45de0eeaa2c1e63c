//! Infrastructure layer module
//!
//! External integrations and process-wide concerns:
//! - Claude Messages API client
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod claude;
pub mod config;
pub mod logging;
