// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley check` command implementation.
//!
//! Validates the local setup without opening any connection: config file,
//! system prompt, Gemini credentials and leftover placeholder values.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use parley_config::model::ParleyConfig;
use parley_core::RelayError;

use crate::serve::resolve_prompt_path;

/// Values written by the first-run bootstrap that must be replaced.
const PLACEHOLDERS: &[&str] = &["change-me", "gemini-api-key-here"];

/// Status of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Runs the `parley check` command.
///
/// Returns an error when any check fails. Warnings are reported but do not
/// fail the command.
pub fn run_check(
    config_path: &Path,
    prompt_override: Option<&Path>,
    plain: bool,
) -> Result<(), RelayError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = collect_checks(config_path, prompt_override);

    println!();
    println!("  parley check");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();

    let fail_count = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let warn_count = results
        .iter()
        .filter(|r| r.status == CheckStatus::Warn)
        .count();

    if fail_count + warn_count == 0 {
        println!("  All checks passed.");
    } else {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    }
    println!();

    if fail_count > 0 {
        return Err(RelayError::Config(format!("{fail_count} check(s) failed")));
    }
    Ok(())
}

/// Runs every check in order. Checks that need a loaded config are
/// skipped when the config itself fails.
fn collect_checks(config_path: &Path, prompt_override: Option<&Path>) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let (config_result, config) = check_config(config_path);
    results.push(config_result);
    let Some(config) = config else {
        return results;
    };

    results.push(check_prompt(&resolve_prompt_path(prompt_override, &config)));
    results.push(check_api_key(&config));
    results.push(check_placeholders(&config));
    results
}

fn check_config(path: &Path) -> (CheckResult, Option<ParleyConfig>) {
    let start = Instant::now();
    if !path.exists() {
        let result = CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("not found: {} (run `parley init`)", path.display()),
            start,
        );
        return (result, None);
    }

    match parley_config::load_and_validate(path) {
        Ok(config) => (
            CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
            Some(config),
        ),
        Err(errors) => {
            parley_config::render_errors(&errors);
            (
                CheckResult::new(
                    "Configuration",
                    CheckStatus::Fail,
                    format!("{} error(s)", errors.len()),
                    start,
                ),
                None,
            )
        }
    }
}

fn check_prompt(path: &Path) -> CheckResult {
    let start = Instant::now();
    match parley_config::read_prompt(path) {
        Ok(prompt) if prompt.trim().is_empty() => CheckResult::new(
            "System prompt",
            CheckStatus::Fail,
            format!("{} is blank; every exchange would be rejected", path.display()),
            start,
        ),
        Ok(prompt) => CheckResult::new(
            "System prompt",
            CheckStatus::Pass,
            format!("{} ({} chars)", path.display(), prompt.chars().count()),
            start,
        ),
        Err(e) => CheckResult::new(
            "System prompt",
            CheckStatus::Fail,
            format!("{}: {e}", path.display()),
            start,
        ),
    }
}

fn check_api_key(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();
    match parley_gemini::resolve_api_key(config.gemini.api_key.as_deref()) {
        Ok(_) => CheckResult::new(
            "Gemini API key",
            CheckStatus::Pass,
            format!("configured (model {})", config.gemini.model),
            start,
        ),
        Err(e) => CheckResult::new("Gemini API key", CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_placeholders(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();
    let fields = placeholder_fields(config);
    if fields.is_empty() {
        CheckResult::new("Credentials", CheckStatus::Pass, "no placeholders", start)
    } else {
        CheckResult::new(
            "Credentials",
            CheckStatus::Warn,
            format!("placeholder value in {}", fields.join(", ")),
            start,
        )
    }
}

fn placeholder_fields(config: &ParleyConfig) -> Vec<&'static str> {
    let is_placeholder = |value: &str| PLACEHOLDERS.contains(&value.trim());
    let mut fields = Vec::new();
    if is_placeholder(&config.http.url_token) {
        fields.push("http.urlToken");
    }
    if is_placeholder(&config.websocket.ws_token) {
        fields.push("websocket.wsToken");
    }
    if config.gemini.api_key.as_deref().is_some_and(is_placeholder) {
        fields.push("gemini.apiKey");
    }
    fields
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<20} {} ({duration_ms}ms)", result.name, result.message)
    }
}
