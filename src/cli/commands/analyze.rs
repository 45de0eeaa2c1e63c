//! Analyze CLI command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::AppContext;
use crate::adapters::{JsonFileExtractor, StaticExtractor};
use crate::cli::Reported;
use crate::domain::models::ProductInfo;
use crate::domain::ports::ProductExtractor;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeArgs {
    /// Product title
    #[arg(short, long, required_unless_present = "product")]
    pub title: Option<String>,

    /// Product page URL; identifies the item in the cart
    #[arg(short, long, required_unless_present = "product")]
    pub url: Option<String>,

    /// Displayed price
    #[arg(short, long)]
    pub price: Option<String>,

    /// Product description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Read title, price, description and url from a JSON file
    #[arg(long, value_name = "FILE", conflicts_with_all = ["title", "url", "price", "description"])]
    pub product: Option<PathBuf>,

    /// Add the product to the cart once the analysis is shown
    #[arg(short, long)]
    pub add_to_cart: bool,
}

impl AnalyzeArgs {
    fn extractor(&self) -> Box<dyn ProductExtractor> {
        if let Some(path) = &self.product {
            return Box::new(JsonFileExtractor::new(path));
        }
        let product = ProductInfo::new(
            self.title.as_deref().unwrap_or_default().trim(),
            self.url.as_deref().unwrap_or_default(),
        )
        .with_price(self.price.clone().unwrap_or_default())
        .with_description(self.description.clone().unwrap_or_default());
        Box::new(StaticExtractor::new(product))
    }
}

pub async fn execute(args: AnalyzeArgs, ctx: &AppContext) -> Result<()> {
    let extractor = args.extractor();
    ctx.orchestrator
        .analyze_current_page(extractor.as_ref())
        .await
        .map_err(Reported)?;

    if args.add_to_cart {
        ctx.orchestrator.add_last_to_cart().await.map_err(Reported)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_from_flags() {
        let args = AnalyzeArgs {
            title: Some("  Bamboo brush ".to_string()),
            url: Some("https://shop.example/brush".to_string()),
            price: Some("$4".to_string()),
            description: None,
            product: None,
            add_to_cart: false,
        };
        let product = args.extractor().extract();
        assert_eq!(product.title, "Bamboo brush");
        assert_eq!(product.price, "$4");
        assert_eq!(product.description, "");
        assert!(product.is_extracted());
    }
}
