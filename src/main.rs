// This is the entry point of the guardian moderation service.
//
// **Architecture Overview:**
// - `core/` = Moderation logic (sanitizer, scanner, ban ledger, gate)
// - `infra/` = Implementations of core traits (SQLite, in-memory, config files)
// - `console/` = Operator console (line commands on stdin)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize stores and services (dependency injection)
// 3. Hand the gate to the console

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "console/console_layer.rs"]
mod console;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::moderation::{BanStore, ModerationGate, PostStore, SystemClock};
use crate::infra::config::load_config;
use crate::infra::moderation::{
    open_pool, InMemoryBanStore, InMemoryPostStore, SqliteBanStore, SqlitePostStore,
};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_DATABASE_PATH: &str = "data/guardian.db";

async fn serve<B: BanStore, P: PostStore>(gate: ModerationGate<B, P>) -> anyhow::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    console::run(&gate, stdin, stdout).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config_path = std::env::var("GUARDIAN_CONFIG_FILE").ok().map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let clock = Arc::new(SystemClock);
    let storage = std::env::var("GUARDIAN_STORAGE").unwrap_or_else(|_| "sqlite".to_string());

    match storage.as_str() {
        "memory" => {
            tracing::warn!("Using in-memory storage, bans and posts are lost on exit");
            let gate = ModerationGate::new(
                config,
                InMemoryBanStore::new(),
                InMemoryPostStore::new(),
                clock,
            );
            serve(gate).await
        }
        "sqlite" => {
            let database_path = std::env::var("GUARDIAN_DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
            let pool = open_pool(&database_path).await?;

            let bans = SqliteBanStore::new(pool.clone());
            bans.migrate().await?;
            let posts = SqlitePostStore::new(pool);
            posts.migrate().await?;

            tracing::info!(database = %database_path, "Guardian ready");
            serve(ModerationGate::new(config, bans, posts, clock)).await
        }
        other => anyhow::bail!("Unknown GUARDIAN_STORAGE {:?}, expected sqlite or memory", other),
    }
}
