//! Interactive session: many commands against one pipeline.
//!
//! The add-to-cart precondition ("an analysis was displayed") only holds
//! within one orchestrator, so `add` is available here and not as a
//! standalone command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::analyze::AnalyzeArgs;
use super::cart::CartArgs;
use super::credential::CredentialArgs;
use super::history::HistoryArgs;
use super::rewards::RewardsArgs;
use super::AppContext;
use crate::cli::output::eprint_line;
use crate::cli::{handle_error, Reported};

const PROMPT: &str = "ecoscan> ";

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    /// Analyze a product
    Analyze(AnalyzeArgs),
    /// Add the last analyzed product to the cart
    Add,
    /// Shopping cart commands
    Cart(CartArgs),
    /// Analysis history commands
    History(HistoryArgs),
    /// Rewards points commands
    Rewards(RewardsArgs),
    /// Manage the stored Claude API key
    Credential(CredentialArgs),
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

pub async fn execute(ctx: &AppContext) -> Result<()> {
    let interactive = console::user_attended();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("session started");

    loop {
        if interactive {
            eprint!("{}", style(PROMPT).cyan());
        }
        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };

        let words = match split_words(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(err) => {
                eprint_line(format!("{} {err}", style("Error:").red().bold()));
                continue;
            }
        };

        let command = match SessionLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                // Help output arrives as an Err as well.
                eprint_line(err.render().ansi().to_string().trim_end());
                continue;
            }
        };
        debug!(?command, "session command");

        if command == SessionCommand::Quit {
            break;
        }
        // A failed command ends that command, not the session.
        if let Err(err) = run(command, ctx).await {
            handle_error(&err, ctx.json);
        }
    }

    info!("session ended");
    Ok(())
}

async fn run(command: SessionCommand, ctx: &AppContext) -> Result<()> {
    match command {
        SessionCommand::Analyze(args) => super::analyze::execute(args, ctx).await,
        SessionCommand::Add => {
            ctx.orchestrator.add_last_to_cart().await.map_err(Reported)?;
            Ok(())
        }
        SessionCommand::Cart(args) => super::cart::execute(args, ctx).await,
        SessionCommand::History(args) => super::history::execute(args, ctx).await,
        SessionCommand::Rewards(args) => super::rewards::execute(args, ctx).await,
        SessionCommand::Credential(args) => super::credential::execute(args, ctx).await,
        SessionCommand::Quit => Ok(()),
    }
}

/// Split on whitespace, keeping double-quoted runs together.
///
/// `\"` inside quotes is a literal quote.
fn split_words(line: &str) -> Result<Vec<String>, &'static str> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            '\\' if quoted => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err("unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
