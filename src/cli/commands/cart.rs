//! Cart CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{confirmed, AppContext};
use crate::cli::Reported;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CartCommands {
    /// Show cart items and totals
    List,
    /// Remove the item at a position shown by `cart list`
    Remove {
        /// Zero-based position
        index: usize,
    },
    /// Remove every item
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn execute(args: CartArgs, ctx: &AppContext) -> Result<()> {
    match args.command {
        CartCommands::List => {
            ctx.orchestrator.show_cart().await.map_err(Reported)?;
        }
        CartCommands::Remove { index } => {
            ctx.orchestrator
                .remove_cart_entry(index)
                .await
                .map_err(Reported)?;
        }
        CartCommands::Clear { yes } => {
            confirmed(ctx, "Clear all items from cart?", yes, || {
                ctx.orchestrator.clear_cart()
            })
            .await?;
        }
    }
    Ok(())
}
