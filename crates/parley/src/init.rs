// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley init` command implementation.

use std::path::Path;

use parley_config::model::ParleyConfig;
use parley_core::RelayError;

use crate::serve::resolve_prompt_path;

/// Writes the default config and prompt files where they are missing.
///
/// Existing files are left untouched.
pub fn run_init(config_path: &Path, prompt_override: Option<&Path>) -> Result<(), RelayError> {
    report(config_path, parley_config::ensure_config_file(config_path)?);

    // An existing config decides where the prompt lives.
    let config = match parley_config::load_and_validate(config_path) {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            eprintln!(
                "  {} has {} problem(s); falling back to default settings",
                config_path.display(),
                errors.len()
            );
            ParleyConfig::default()
        }
    };
    let prompt_path = resolve_prompt_path(prompt_override, &config);
    report(&prompt_path, parley_config::ensure_prompt_file(&prompt_path)?);

    Ok(())
}

fn report(path: &Path, created: bool) {
    if created {
        println!("  created  {}", path.display());
    } else {
        println!("  exists   {}", path.display());
    }
}
