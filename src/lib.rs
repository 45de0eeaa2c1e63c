//! Ecoscan - product sustainability analysis
//!
//! Ecoscan asks a hosted language model to score a product's environmental
//! impact, validates the answer into a strict [`Assessment`], and keeps a
//! bounded history, a cart of chosen products and a loyalty-points balance
//! in a durable state store.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): data model, error taxonomy and ports
//! - **Service Layer** (`services`): validation, state managers and the
//!   pipeline orchestrator
//! - **Adapters** (`adapters`): in-memory and `SQLite` state stores, product
//!   extractors
//! - **Infrastructure Layer** (`infrastructure`): Claude HTTP client,
//!   configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ecoscan::adapters::{InMemoryStateStore, StaticExtractor};
//! use ecoscan::domain::ports::NullRenderer;
//! use ecoscan::services::{PipelineOrchestrator, RetryPolicy};
//!
//! let orchestrator = PipelineOrchestrator::new(
//!     Arc::new(InMemoryStateStore::new()),
//!     client,
//!     Arc::new(NullRenderer),
//!     RetryPolicy::default(),
//! );
//! orchestrator.set_credential("sk-ant-...").await?;
//! let assessment = orchestrator.analyze_current_page(&extractor).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{EcoError, EcoResult, ErrorKind};
pub use domain::models::{
    AddToCartOutcome, Assessment, CartEntry, CartSummary, Config, HistoryEntry, PipelineState,
    ProductInfo, RewardsView,
};
pub use domain::ports::{CompletionClient, ProductExtractor, Renderer, StateKey, StateStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{validate, PipelineOrchestrator, RetryPolicy};
