// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Parley relay.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! environment variable overrides, first-run bootstrap of the config and prompt
//! files, and miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! let config = parley_config::load_and_validate(Path::new("parley.toml")).expect("config errors");
//! println!("workers: {}", config.relay.workers);
//! ```

pub mod bootstrap;
pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use bootstrap::{ensure_config_file, ensure_prompt_file, read_prompt};
pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config_from_path, load_config_from_str};
pub use model::ParleyConfig;

/// Load configuration from `path` (plus env overrides) and validate it.
///
/// On a Figment error the file content is re-read so unknown keys can be
/// rendered with a source span.
pub fn load_and_validate(path: &Path) -> Result<ParleyConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let content = std::fs::read_to_string(path).ok();
            let display = path.display().to_string();
            let source = content.as_deref().map(|c| (display.as_str(), c));
            Err(diagnostic::figment_to_config_errors(err, source))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ParleyConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            Some(("<inline>", toml_content)),
        )),
    }
}
