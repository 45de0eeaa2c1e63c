//! Terminal and JSON implementation of the [`Renderer`] port.

use console::style;
use indicatif::ProgressBar;
use serde_json::json;
use std::sync::{Mutex, PoisonError};

use super::output::progress::{create_spinner, state_message, ProgressBarExt};
use super::output::table::TableFormatter;
use super::output::{colored_badge, eprint_line, format_number, print_json, print_line};
use crate::domain::errors::EcoError;
use crate::domain::models::{
    AddToCartOutcome, Assessment, CartEntry, CartSummary, HistoryEntry, PipelineState,
    ProductInfo, RewardsView, REWARD_THRESHOLD,
};
use crate::domain::ports::Renderer;

const PROGRESS_WIDTH: usize = 10;

/// Human output to the terminal, or one JSON object per event with `--json`.
pub struct TerminalRenderer {
    json: bool,
    show_progress: bool,
    tables: TableFormatter,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalRenderer {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            show_progress: !json && console::Term::stderr().is_term(),
            tables: TableFormatter::new(),
            spinner: Mutex::new(None),
        }
    }

    fn update_spinner(&self, state: PipelineState) {
        let mut spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        match state_message(state) {
            Some(message) if self.show_progress => {
                spinner.get_or_insert_with(create_spinner).set_message(message);
            }
            _ => {
                if let Some(spinner) = spinner.take() {
                    spinner.finish_and_clear();
                }
            }
        }
    }

    fn fail_spinner(&self, message: &str) {
        let spinner = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(spinner) = spinner {
            spinner.finish_error(message);
        }
    }

    fn cart_summary_line(summary: &CartSummary) -> String {
        let average = summary.average_overall.map_or_else(
            || "-".to_string(),
            |avg| colored_badge(avg).to_string(),
        );
        format!(
            "Items: {}  Average score: {}  Total carbon: {} kg CO₂e",
            style(summary.count).bold(),
            average,
            format_number(summary.total_carbon_kg)
        )
    }
}

/// Message shown after an item was added to the cart.
pub fn add_to_cart_message(outcome: &AddToCartOutcome) -> String {
    if outcome.points_earned == 0 {
        return "Added to cart! 🛒 (Score 7+ to earn rewards points)".to_string();
    }
    if outcome.unlocked {
        format!(
            "🎉 Added to cart! +{} points! You just unlocked a coupon! Run `ecoscan rewards show` to claim it!",
            outcome.points_earned
        )
    } else {
        format!(
            "🌟 Added to cart! +{} points earned! ({}/{REWARD_THRESHOLD} pts to next coupon)",
            outcome.points_earned, outcome.total_points
        )
    }
}

/// `[■■■■■□□□□□] 50%`
pub fn progress_bar(view: &RewardsView) -> String {
    let filled = usize::try_from(view.display_points)
        .unwrap_or(PROGRESS_WIDTH)
        .min(PROGRESS_WIDTH);
    format!(
        "[{}{}] {}%",
        "■".repeat(filled),
        "□".repeat(PROGRESS_WIDTH - filled),
        view.progress_percent
    )
}

impl Renderer for TerminalRenderer {
    fn state_changed(&self, state: PipelineState) {
        if !self.json {
            self.update_spinner(state);
        }
    }

    fn assessment(&self, product: &ProductInfo, assessment: &Assessment) {
        if self.json {
            print_json(&json!({
                "event": "assessment",
                "product": product,
                "assessment": assessment,
                "band": assessment.band(),
            }));
            return;
        }

        print_line(format!(
            "{}  {}",
            style(&product.title).bold(),
            colored_badge(assessment.overall)
        ));
        print_line(assessment.summary_or_default());

        if let Some(carbon) = &assessment.carbon_footprint {
            print_line(format!(
                "\n💨 Carbon footprint: {} kg CO₂e",
                style(format_number(carbon.kg_co2e)).bold()
            ));
            for line in [&carbon.description, &carbon.comparison] {
                if !line.is_empty() {
                    print_line(format!("   {line}"));
                }
            }
        }

        print_line(format!("\n{}", self.tables.format_breakdown(assessment)));

        if let Some(details) = &assessment.category_details {
            for (category, detail) in details {
                print_line(format!("\n{}", style(category.label()).bold().underlined()));
                for (label, text) in [
                    ("What it means", &detail.explanation),
                    ("This product", &detail.insight),
                    ("Tip", &detail.tips),
                ] {
                    if !text.is_empty() {
                        print_line(format!("  {}: {text}", style(label).dim()));
                    }
                }
            }
        }

        if let Some(recommendations) = &assessment.recommendations {
            print_line(format!("\n💡 {recommendations}"));
        }
    }

    fn cart_added(&self, outcome: &AddToCartOutcome) {
        if self.json {
            print_json(&json!({
                "event": "cart_added",
                "outcome": outcome,
                "message": add_to_cart_message(outcome),
            }));
            return;
        }
        print_line(add_to_cart_message(outcome));
        print_line(Self::cart_summary_line(&outcome.cart));
    }

    fn cart(&self, entries: &[CartEntry], summary: &CartSummary) {
        if self.json {
            print_json(&json!({ "event": "cart", "entries": entries, "summary": summary }));
            return;
        }
        if entries.is_empty() {
            print_line("Your cart is empty.");
            return;
        }
        print_line(self.tables.format_cart(entries));
        print_line(Self::cart_summary_line(summary));
    }

    fn history(&self, entries: &[HistoryEntry]) {
        if self.json {
            print_json(&json!({ "event": "history", "entries": entries }));
            return;
        }
        if entries.is_empty() {
            print_line("No analysis history yet");
            return;
        }
        print_line(self.tables.format_history(entries));
    }

    fn rewards(&self, view: &RewardsView) {
        if self.json {
            print_json(&json!({ "event": "rewards", "rewards": view }));
            return;
        }
        print_line(format!(
            "Rewards: {}/{REWARD_THRESHOLD} pts  {}",
            style(view.display_points).bold(),
            progress_bar(view)
        ));
        match &view.code {
            Some(code) => print_line(format!(
                "🎁 Coupon unlocked! Your code: {}",
                style(code).green().bold()
            )),
            None => print_line(format!(
                "Add products scoring 7+ to your cart to reach {REWARD_THRESHOLD} points."
            )),
        }
    }

    fn error(&self, error: &EcoError) {
        self.fail_spinner("Failed");
        if self.json {
            print_json(&json!({
                "event": "error",
                "kind": error.kind(),
                "message": error.to_string(),
            }));
            return;
        }
        eprint_line(format!("{} {error}", style("Error:").red().bold()));
    }

    fn notice(&self, message: &str) {
        if self.json {
            print_json(&json!({ "event": "notice", "message": message }));
        } else {
            print_line(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Scores;

    fn outcome(points_earned: u64, total_points: u64) -> AddToCartOutcome {
        let entry = CartEntry::new("Tee", "u1", Assessment::new(8.0, Scores::uniform(8.0)));
        AddToCartOutcome {
            cart: CartSummary::of(std::slice::from_ref(&entry)),
            entry,
            points_earned,
            total_points,
            unlocked: total_points >= REWARD_THRESHOLD,
            crossed_threshold: false,
        }
    }

    #[test]
    fn test_add_to_cart_messages() {
        assert_eq!(
            add_to_cart_message(&outcome(0, 3)),
            "Added to cart! 🛒 (Score 7+ to earn rewards points)"
        );
        assert_eq!(
            add_to_cart_message(&outcome(5, 8)),
            "🌟 Added to cart! +5 points earned! (8/10 pts to next coupon)"
        );
        assert!(add_to_cart_message(&outcome(15, 23)).contains("unlocked a coupon"));
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(&RewardsView::render(5)), "[■■■■■□□□□□] 50%");
        assert_eq!(progress_bar(&RewardsView::render(45)), "[■■■■■■■■■■] 100%");
        assert_eq!(progress_bar(&RewardsView::render(0)), "[□□□□□□□□□□] 0%");
    }
}
