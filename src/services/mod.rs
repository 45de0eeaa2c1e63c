//! Application services
//!
//! Business logic on top of the domain ports: response validation, the
//! analysis client, serialized state access, the history/cart/rewards
//! managers, and the pipeline orchestrator.

pub mod analysis_service;
pub mod cart_service;
pub mod history_service;
pub mod orchestrator;
pub mod retry;
pub mod rewards_service;
pub mod state_service;
pub mod validator;

pub use analysis_service::{build_prompt, AnalysisService};
pub use cart_service::{append_unique, CartService};
pub use history_service::{prepend_bounded, HistoryService};
pub use orchestrator::PipelineOrchestrator;
pub use retry::RetryPolicy;
pub use rewards_service::{Credit, RewardsService};
pub use state_service::{Mutation, StateService};
pub use validator::validate;
