// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley serve` command implementation.
//!
//! Bootstraps missing files, loads the configuration and system prompt,
//! connects the OneBot socket and runs the relay until SIGINT or SIGTERM.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parley_config::model::ParleyConfig;
use parley_core::{EventSource, PluginAdapter, RelayError};
use parley_dispatch::{Relay, RelaySettings, shutdown};
use parley_gemini::GeminiBackend;
use parley_onebot::{OneBotDelivery, OneBotSource};
use tracing::{info, warn};

/// Runs the `parley serve` command.
pub async fn run_serve(
    config_path: &Path,
    prompt_override: Option<&Path>,
) -> Result<(), RelayError> {
    let created_config = parley_config::ensure_config_file(config_path)?;
    let config = load_config(config_path)?;

    init_tracing(&config.log.level);
    info!(config = %config_path.display(), "starting parley");
    if created_config {
        warn!(
            path = %config_path.display(),
            "wrote a default config with placeholder credentials; edit it before relying on the relay"
        );
    }

    let prompt_path = resolve_prompt_path(prompt_override, &config);
    if parley_config::ensure_prompt_file(&prompt_path)? {
        info!(path = %prompt_path.display(), "wrote default system prompt");
    }
    let prompt = read_prompt(&prompt_path)?;

    parley_dispatch::metrics::register_metrics();

    let backend = Arc::new(GeminiBackend::new(&config.gemini)?);
    let delivery = Arc::new(OneBotDelivery::new(&config.http)?);

    let mut source = OneBotSource::new(&config.websocket)?;
    source.connect().await?;

    let cancel = shutdown::install_signal_handler();
    let relay = Relay::new(
        RelaySettings::from_config(&config.relay),
        backend.clone(),
        delivery.clone(),
        prompt,
    );

    let drained = relay.run(Box::new(source), cancel).await;
    if !drained {
        warn!("shutdown timeout reached, in-flight events were abandoned");
    }

    if let Err(e) = backend.shutdown().await {
        warn!(error = %e, "backend shutdown failed");
    }
    if let Err(e) = delivery.shutdown().await {
        warn!(error = %e, "delivery shutdown failed");
    }

    info!("parley stopped");
    Ok(())
}

/// Loads and validates the config, rendering diagnostics on failure.
pub fn load_config(path: &Path) -> Result<ParleyConfig, RelayError> {
    parley_config::load_and_validate(path).map_err(|errors| {
        parley_config::render_errors(&errors);
        RelayError::Config(format!(
            "{} problem(s) in {}",
            errors.len(),
            path.display()
        ))
    })
}

/// The CLI override wins over `relay.prompt_file`.
pub fn resolve_prompt_path(prompt_override: Option<&Path>, config: &ParleyConfig) -> PathBuf {
    prompt_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.relay.prompt_file))
}

/// Reads the system prompt. An unreadable file is a configuration error.
pub fn read_prompt(path: &Path) -> Result<String, RelayError> {
    parley_config::read_prompt(path).map_err(|e| {
        RelayError::Config(format!("failed to read prompt file {}: {e}", path.display()))
    })
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    // No-op when a global subscriber is already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
