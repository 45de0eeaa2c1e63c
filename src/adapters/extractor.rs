//! Product extractors for the command-line front end.
//!
//! The browser front end scrapes the active page; here the product comes
//! from command arguments or a JSON file. Neither has an error channel.

use std::path::PathBuf;
use tracing::warn;

use crate::domain::models::ProductInfo;
use crate::domain::ports::ProductExtractor;

/// Returns a fixed product.
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    product: ProductInfo,
}

impl StaticExtractor {
    pub const fn new(product: ProductInfo) -> Self {
        Self { product }
    }
}

impl ProductExtractor for StaticExtractor {
    fn extract(&self) -> ProductInfo {
        self.product.clone()
    }
}

/// Reads a `{title, price, description, url}` JSON document.
///
/// An unreadable or malformed file yields an empty product, which the
/// pipeline reports as a failed extraction.
#[derive(Debug, Clone)]
pub struct JsonFileExtractor {
    path: PathBuf,
}

impl JsonFileExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProductExtractor for JsonFileExtractor {
    fn extract(&self) -> ProductInfo {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "product file unreadable");
                return ProductInfo::default();
            }
        };

        let mut product: ProductInfo = serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "product file is not valid JSON");
            ProductInfo::default()
        });
        product.title = product.title.trim().to_string();
        product
    }
}
