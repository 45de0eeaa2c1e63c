use crate::domain::errors::EcoError;
use crate::domain::models::{
    AddToCartOutcome, Assessment, CartEntry, CartSummary, HistoryEntry, PipelineState, ProductInfo,
    RewardsView,
};

/// Sink for everything the pipeline wants the user to see.
///
/// Rendering is infallible from the caller's point of view: a renderer whose
/// output has gone away must drop the output rather than fail.
pub trait Renderer: Send + Sync {
    /// Pipeline moved to a new state.
    fn state_changed(&self, _state: PipelineState) {}

    fn assessment(&self, product: &ProductInfo, assessment: &Assessment);

    fn cart_added(&self, outcome: &AddToCartOutcome);

    fn cart(&self, entries: &[CartEntry], summary: &CartSummary);

    fn history(&self, entries: &[HistoryEntry]);

    fn rewards(&self, view: &RewardsView);

    fn error(&self, error: &EcoError);

    fn notice(&self, message: &str);
}

/// Renderer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn assessment(&self, _product: &ProductInfo, _assessment: &Assessment) {}
    fn cart_added(&self, _outcome: &AddToCartOutcome) {}
    fn cart(&self, _entries: &[CartEntry], _summary: &CartSummary) {}
    fn history(&self, _entries: &[HistoryEntry]) {}
    fn rewards(&self, _view: &RewardsView) {}
    fn error(&self, _error: &EcoError) {}
    fn notice(&self, _message: &str) {}
}
