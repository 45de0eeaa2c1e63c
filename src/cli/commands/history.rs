//! History CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{confirmed, AppContext};
use crate::cli::Reported;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommands {
    /// Show recent analyses, newest first
    List,
    /// Forget all past analyses
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn execute(args: HistoryArgs, ctx: &AppContext) -> Result<()> {
    match args.command {
        HistoryCommands::List => {
            ctx.orchestrator.show_history().await.map_err(Reported)?;
        }
        HistoryCommands::Clear { yes } => {
            confirmed(ctx, "Clear analysis history?", yes, || {
                ctx.orchestrator.clear_history()
            })
            .await?;
        }
    }
    Ok(())
}
