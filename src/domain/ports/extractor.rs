use crate::domain::models::ProductInfo;

/// Port for the page extractor.
///
/// There is no error channel: an empty `title` signals that nothing usable
/// was found on the page.
pub trait ProductExtractor: Send + Sync {
    fn extract(&self) -> ProductInfo;
}
