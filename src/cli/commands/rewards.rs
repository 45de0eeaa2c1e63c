//! Rewards CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{confirmed, AppContext};
use crate::cli::Reported;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RewardsArgs {
    #[command(subcommand)]
    pub command: RewardsCommands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RewardsCommands {
    /// Show points, progress and any unlocked coupon code
    Show,
    /// Set points back to zero
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn execute(args: RewardsArgs, ctx: &AppContext) -> Result<()> {
    match args.command {
        RewardsCommands::Show => {
            ctx.orchestrator.show_rewards().await.map_err(Reported)?;
        }
        RewardsCommands::Reset { yes } => {
            confirmed(ctx, "Reset rewards points to 0?", yes, || {
                ctx.orchestrator.reset_rewards()
            })
            .await?;
        }
    }
    Ok(())
}
