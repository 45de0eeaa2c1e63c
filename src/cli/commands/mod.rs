//! CLI command implementations.

pub mod analyze;
pub mod cart;
pub mod credential;
pub mod history;
pub mod rewards;
pub mod session;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use std::sync::Arc;
use tracing::debug;

use super::render::TerminalRenderer;
use super::types::Commands;
use super::Reported;
use crate::adapters::{InMemoryStateStore, SqliteStateStore};
use crate::domain::models::{Config, StoreBackend};
use crate::domain::ports::{CompletionClient, Renderer, StateStore};
use crate::infrastructure::claude::ClaudeClient;
use crate::services::{PipelineOrchestrator, RetryPolicy};

/// Everything a command handler needs; one per process.
pub struct AppContext {
    pub orchestrator: PipelineOrchestrator,
    pub renderer: Arc<dyn Renderer>,
    pub json: bool,
}

impl AppContext {
    /// Wire the configured store, the Claude client and the terminal renderer.
    pub async fn build(config: &Config, json: bool) -> Result<Self> {
        let store = open_store(config).await?;
        let client: Arc<dyn CompletionClient> = Arc::new(
            ClaudeClient::new(&config.analysis).context("Failed to create the analysis client")?,
        );
        let renderer: Arc<dyn Renderer> = Arc::new(TerminalRenderer::new(json));
        Ok(Self::with_parts(
            store,
            client,
            renderer,
            RetryPolicy::from_config(&config.retry),
            json,
        ))
    }

    pub fn with_parts(
        store: Arc<dyn StateStore>,
        client: Arc<dyn CompletionClient>,
        renderer: Arc<dyn Renderer>,
        retry: RetryPolicy,
        json: bool,
    ) -> Self {
        Self {
            orchestrator: PipelineOrchestrator::new(store, client, Arc::clone(&renderer), retry),
            renderer,
            json,
        }
    }
}

async fn open_store(config: &Config) -> Result<Arc<dyn StateStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            debug!("using in-memory state store");
            Ok(Arc::new(InMemoryStateStore::new()))
        }
        StoreBackend::Sqlite => {
            let path = &config.store.path;
            let store = SqliteStateStore::open(path)
                .await
                .with_context(|| format!("Failed to open state store at {path}"))?;
            debug!(path = %path, "opened sqlite state store");
            Ok(Arc::new(store))
        }
    }
}

/// Run one top-level command.
pub async fn dispatch(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Analyze(args) => analyze::execute(args, ctx).await,
        Commands::Cart(args) => cart::execute(args, ctx).await,
        Commands::History(args) => history::execute(args, ctx).await,
        Commands::Rewards(args) => rewards::execute(args, ctx).await,
        Commands::Credential(args) => credential::execute(args, ctx).await,
        Commands::Session => session::execute(ctx).await,
    }
}

/// Ask before a destructive action.
///
/// `--yes` skips the prompt. Without a terminal to ask on, the action is
/// refused rather than assumed.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !console::user_attended() {
        anyhow::bail!("{prompt} Pass --yes to confirm when not running in a terminal.");
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

/// Confirm, then run `action`; a declined prompt prints a notice instead.
pub async fn confirmed<F, Fut>(ctx: &AppContext, prompt: &str, yes: bool, action: F) -> Result<()>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = crate::domain::errors::EcoResult<()>>,
{
    if confirm(prompt, yes)? {
        action().await.map_err(Reported)?;
    } else {
        ctx.renderer.notice("Cancelled.");
    }
    Ok(())
}
