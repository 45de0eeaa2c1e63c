//! Domain models for the ecoscan pipeline.

pub mod assessment;
pub mod config;
pub mod entries;
pub mod pipeline;
pub mod product;
pub mod rewards;

pub use assessment::{
    Assessment, CarbonFootprint, CategoryDetail, ScoreBand, ScoreCategory, Scores,
};
pub use config::{
    AnalysisConfig, Config, LogFormat, LoggingConfig, RetryConfig, RotationPolicy, StoreBackend,
    StoreConfig,
};
pub use entries::{CartEntry, CartSummary, HistoryEntry, MAX_HISTORY_ENTRIES};
pub use pipeline::{AddToCartOutcome, PipelineState};
pub use product::ProductInfo;
pub use rewards::{RewardCode, RewardsView, REWARD_THRESHOLD};
