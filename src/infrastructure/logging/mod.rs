//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or compact human formatting on stderr
//! - Optional rolling JSON log files
//! - Secret scrubbing for upstream error bodies and displayed credentials

pub mod logger;
pub mod secret_scrubbing;

pub use logger::{parse_log_level, Logger};
pub use secret_scrubbing::SecretScrubber;
