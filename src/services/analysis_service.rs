use std::sync::Arc;
use tracing::{debug, instrument};

use super::validator;
use crate::domain::errors::EcoResult;
use crate::domain::models::{Assessment, ProductInfo};
use crate::domain::ports::CompletionClient;

const OUTPUT_FORMAT: &str = r#"Format as JSON:
{
  "carbonFootprint": {
    "kgCO2e": <number>,
    "description": "<brief explanation>",
    "comparison": "<comparison to everyday activity>"
  },
  "scores": {
    "production": <1-10>,
    "materials": <1-10>,
    "transportation": <1-10>,
    "packaging": <1-10>,
    "endOfLife": <1-10>
  },
  "overall": <1-10>,
  "quickSummary": "<2 sentence summary - is this sustainable or not? key takeaway>",
  "categoryDetails": {
    "production": {
      "explanation": "<what this means - 1 sentence>",
      "insight": "<specific to this product - 1-2 sentences>",
      "tips": "<actionable advice - 1 sentence>"
    },
    "materials": { "explanation": "...", "insight": "...", "tips": "..." },
    "transportation": { "explanation": "...", "insight": "...", "tips": "..." },
    "packaging": { "explanation": "...", "insight": "...", "tips": "..." },
    "endOfLife": { "explanation": "...", "insight": "...", "tips": "..." }
  },
  "recommendations": "<2-3 sentences about better alternatives or how to make more sustainable choice>"
}

Be specific, educational, and helpful. Use real data when possible, estimates when not. Make it informative!"#;

const INSTRUCTIONS: &str = "Please provide a COMPREHENSIVE, EDUCATIONAL analysis including:

1. CARBON FOOTPRINT ESTIMATE (in kg CO2e)
2. CATEGORY SCORES (1-10, where 10 is best/lowest impact):
   - Production Emissions
   - Materials Sourcing
   - Transportation
   - Packaging
   - End of Life

3. EDUCATIONAL INFORMATION for each category:
   - Brief explanation of what this category means
   - Specific insights about THIS product
   - Why the score is what it is
   - Tips for improvement or alternatives

4. COMPARISONS to help users understand:
   - Compare carbon footprint to everyday activities (e.g., \"equivalent to driving X miles\")
   - Industry average comparison if possible

5. ACTIONABLE INSIGHTS:
   - What makes this product sustainable/unsustainable
   - Better alternatives the user could consider
   - How they could offset or reduce the impact";

/// Instruction sent for `product`: the product fields, what to analyze, and
/// the exact JSON shape expected back.
pub fn build_prompt(product: &ProductInfo) -> String {
    format!(
        "Analyze the carbon footprint and sustainability of this product with educational details:\n\n\
         Product: {}\nPrice: {}\nDescription: {}\nURL: {}\n\n{INSTRUCTIONS}\n\n{OUTPUT_FORMAT}",
        product.title, product.price, product.description, product.url
    )
}

/// Sends products to the completion service and validates the reply.
///
/// Performs a single attempt; retrying is the caller's decision.
#[derive(Clone)]
pub struct AnalysisService {
    client: Arc<dyn CompletionClient>,
}

impl AnalysisService {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Raw reply text for `product`, not yet validated.
    #[instrument(skip(self, credential, product), fields(url = %product.url))]
    pub async fn fetch_raw(&self, credential: &str, product: &ProductInfo) -> EcoResult<String> {
        let prompt = build_prompt(product);
        let raw = self.client.complete(credential, &prompt).await?;
        debug!(response_len = raw.len(), "analysis reply received");
        Ok(raw)
    }

    /// Fetch and validate in one step.
    pub async fn analyze(&self, credential: &str, product: &ProductInfo) -> EcoResult<Assessment> {
        let raw = self.fetch_raw(credential, product).await?;
        validator::validate(&raw)
    }
}
