//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the pipeline depends on:
//! - StateStore: durable key-value state (credential, history, cart, rewards)
//! - CompletionClient: the external text generation service
//! - ProductExtractor: best-effort product scraping from the current page
//! - Renderer: sink for assessments, state snapshots and errors
//!
//! These traits keep the services independent of specific backends.

pub mod completion_client;
pub mod extractor;
pub mod renderer;
pub mod state_store;

pub use completion_client::CompletionClient;
pub use extractor::ProductExtractor;
pub use renderer::{NullRenderer, Renderer};
pub use state_store::{StateKey, StateStore, StateValues};
