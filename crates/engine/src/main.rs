//! Criteria Engine - loads and validates a static criteria dataset.
//!
//! Builds the registry the same way a game server would at startup, logs
//! what was kept and dropped per table, and prints the load report as JSON.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use criteria_engine::infrastructure::ports::NoScripts;
use criteria_engine::infrastructure::settings::{EngineSettings, DEFAULT_LOG_FILTER};
use criteria_engine::infrastructure::static_data::StaticDataSet;
use criteria_engine::registry::CriteriaRegistry;

fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    let settings = EngineSettings::from_env();

    let filter = match &settings.log_filter {
        Some(directive) => tracing_subscriber::EnvFilter::new(directive),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(data_path = %settings.data_path.display(), "Loading criteria dataset");

    let data = StaticDataSet::load_dir(&settings.data_path)?;
    let registry = Arc::new(CriteriaRegistry::build(data, &NoScripts));

    let report = registry.report();
    report.log_summary();
    tracing::info!(
        criteria = registry.criteria_count(),
        trees = registry.tree_count(),
        modifiers = registry.modifier_count(),
        dropped = report.total_dropped(),
        "Criteria registry ready"
    );

    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
