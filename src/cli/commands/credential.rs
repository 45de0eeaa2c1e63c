//! Credential CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dialoguer::Password;

use super::AppContext;
use crate::cli::Reported;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CredentialArgs {
    #[command(subcommand)]
    pub command: CredentialCommands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CredentialCommands {
    /// Store the Claude API key (prompted for when omitted)
    Set {
        /// API key; leave out to type it without echo
        key: Option<String>,
    },
    /// Show the stored key, masked
    Show,
    /// Remove the stored key
    Clear,
}

pub async fn execute(args: CredentialArgs, ctx: &AppContext) -> Result<()> {
    match args.command {
        CredentialCommands::Set { key } => {
            let key = match key {
                Some(key) => key,
                None => prompt_for_key()?,
            };
            ctx.orchestrator
                .set_credential(&key)
                .await
                .map_err(Reported)?;
        }
        CredentialCommands::Show => {
            ctx.orchestrator.credential_status().await.map_err(Reported)?;
        }
        CredentialCommands::Clear => {
            ctx.orchestrator.clear_credential().await.map_err(Reported)?;
        }
    }
    Ok(())
}

fn prompt_for_key() -> Result<String> {
    if !console::user_attended() {
        anyhow::bail!("No API key given. Pass it as an argument when not running in a terminal.");
    }
    Password::new()
        .with_prompt("Claude API key (input hidden)")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key from terminal")
}
