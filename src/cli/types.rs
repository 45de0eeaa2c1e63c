//! CLI type definitions
//!
//! This module contains the top-level clap structures. Each command's own
//! arguments live next to its handler in `commands/`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::analyze::AnalyzeArgs;
use super::commands::cart::CartArgs;
use super::commands::credential::CredentialArgs;
use super::commands::history::HistoryArgs;
use super::commands::rewards::RewardsArgs;

#[derive(Parser, Debug)]
#[command(name = "ecoscan")]
#[command(about = "Ecoscan - product sustainability scores, cart and rewards", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Read configuration from this file instead of .ecoscan/
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a product's sustainability
    Analyze(AnalyzeArgs),

    /// Shopping cart commands
    Cart(CartArgs),

    /// Analysis history commands
    History(HistoryArgs),

    /// Rewards points commands
    Rewards(RewardsArgs),

    /// Manage the stored Claude API key
    Credential(CredentialArgs),

    /// Read commands from stdin against one long-lived pipeline
    Session,
}
