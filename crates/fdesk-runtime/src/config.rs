#![forbid(unsafe_code)]

//! Widget tunables.
//!
//! [`WidgetConfig`] collects the knobs shared by selectors and reference
//! tables. Defaults match what the forms ship with, so
//! `WidgetConfig::default()` needs no file at all.
//!
//! # Environment
//!
//! ```bash
//! export FDESK_DEBOUNCE_MS=150   # search quiescence window, 0-2000
//! export FDESK_PAGE_SIZE=25      # table rows per page, 1-500
//! export FDESK_OVERLAY_ROWS=6    # visible option rows, 1-50
//! ```
//!
//! # Files
//!
//! With the `config-file` feature:
//!
//! ```toml
//! debounce_ms = 250
//! page_size = 20
//! add_new_label = "Add Party"
//! ```
//!
//! ```rust,ignore
//! let config = WidgetConfig::from_toml_file("fdesk.toml")?.ensure_valid()?;
//! ```

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "config-file")]
use std::path::Path;
use web_time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const MAX_DEBOUNCE_MS: u64 = 2_000;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 500;
pub const DEFAULT_OVERLAY_ROWS: u16 = 8;
pub const MAX_OVERLAY_ROWS: u16 = 50;

/// Tunables for selectors and tables.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct WidgetConfig {
    /// Search quiescence window in milliseconds.
    pub debounce_ms: u64,
    /// Rows per table page.
    pub page_size: usize,
    /// Option rows visible in a selector overlay before scrolling.
    pub overlay_max_rows: u16,
    pub search_placeholder: String,
    pub add_new_label: String,
    pub loading_label: String,
    /// Shown when there are no options and no query.
    pub empty_label: String,
    /// Shown when a query matches nothing.
    pub no_results_label: String,
    /// Shown by a table with no rows on the current page.
    pub no_records_label: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            page_size: DEFAULT_PAGE_SIZE,
            overlay_max_rows: DEFAULT_OVERLAY_ROWS,
            search_placeholder: "Search...".into(),
            add_new_label: "Add New".into(),
            loading_label: "Loading...".into(),
            empty_label: "No options available".into(),
            no_results_label: "No results found".into(),
            no_records_label: "No records found".into(),
        }
    }
}

impl WidgetConfig {
    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_overlay_rows(mut self, rows: u16) -> Self {
        self.overlay_max_rows = rows;
        self
    }

    #[must_use]
    pub fn with_add_new_label(mut self, label: impl Into<String>) -> Self {
        self.add_new_label = label.into();
        self
    }

    /// The debounce window as a duration.
    #[inline]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Defaults overridden by `FDESK_*` environment variables, clamped.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an injectable lookup.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(ms) = lookup("FDESK_DEBOUNCE_MS").and_then(|v| v.trim().parse().ok()) {
            config.debounce_ms = ms;
        }
        if let Some(size) = lookup("FDESK_PAGE_SIZE").and_then(|v| v.trim().parse().ok()) {
            config.page_size = size;
        }
        if let Some(rows) = lookup("FDESK_OVERLAY_ROWS").and_then(|v| v.trim().parse().ok()) {
            config.overlay_max_rows = rows;
        }
        config.validated()
    }

    /// Clamp every numeric field into its valid range.
    ///
    /// ```
    /// use fdesk_runtime::config::WidgetConfig;
    ///
    /// let config = WidgetConfig::default().with_debounce_ms(10_000).validated();
    /// assert_eq!(config.debounce_ms, 2_000);
    /// ```
    #[must_use]
    pub fn validated(mut self) -> Self {
        let before = (self.debounce_ms, self.page_size, self.overlay_max_rows);
        self.debounce_ms = self.debounce_ms.min(MAX_DEBOUNCE_MS);
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.overlay_max_rows = self.overlay_max_rows.clamp(1, MAX_OVERLAY_ROWS);
        if before != (self.debounce_ms, self.page_size, self.overlay_max_rows) {
            tracing::debug!(
                target: "fdesk.config",
                debounce_ms = self.debounce_ms,
                page_size = self.page_size,
                overlay_max_rows = self.overlay_max_rows,
                "config values clamped"
            );
        }
        self
    }

    /// Every out-of-range value, as human-readable messages.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            errors.push(format!(
                "debounce_ms must be at most {MAX_DEBOUNCE_MS}, got {}",
                self.debounce_ms
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            errors.push(format!(
                "page_size must be in 1..={MAX_PAGE_SIZE}, got {}",
                self.page_size
            ));
        }
        if !(1..=MAX_OVERLAY_ROWS).contains(&self.overlay_max_rows) {
            errors.push(format!(
                "overlay_max_rows must be in 1..={MAX_OVERLAY_ROWS}, got {}",
                self.overlay_max_rows
            ));
        }
        if self.add_new_label.trim().is_empty() {
            errors.push("add_new_label must not be blank".into());
        }
        errors
    }

    /// Reject instead of clamp.
    pub fn ensure_valid(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            tracing::warn!(target: "fdesk.config", count = errors.len(), "invalid widget config");
            Err(ConfigError::Validation(errors))
        }
    }

    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(target: "fdesk.config", path = %path.display(), "loading toml config");
        Self::from_toml_str(&content)
    }

    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(target: "fdesk.config", path = %path.display(), "loading json config");
        Self::from_json_str(&content)
    }

    /// Pick the parser by extension: `.json` is JSON, anything else TOML.
    #[cfg(feature = "config-file")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }
}

/// Errors from loading or checking a [`WidgetConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config-file")]
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[cfg(feature = "config-file")]
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config out of range: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_validate_cleanly() {
        let config = WidgetConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.add_new_label, "Add New");
        assert_eq!(config.search_placeholder, "Search...");
    }

    #[test]
    fn env_overrides_and_clamps() {
        let config = WidgetConfig::from_lookup(env(&[
            ("FDESK_DEBOUNCE_MS", "9000"),
            ("FDESK_PAGE_SIZE", " 25 "),
            ("FDESK_OVERLAY_ROWS", "0"),
        ]));
        assert_eq!(config.debounce_ms, MAX_DEBOUNCE_MS);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.overlay_max_rows, 1);
    }

    #[test]
    fn unparseable_env_is_ignored() {
        let config = WidgetConfig::from_lookup(env(&[("FDESK_DEBOUNCE_MS", "soon")]));
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let config = WidgetConfig::default().with_debounce_ms(5_000).with_page_size(0);
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        let err = config.ensure_valid().unwrap_err();
        assert!(err.to_string().contains("debounce_ms"));
    }

    #[test]
    fn validated_config_passes_validate() {
        let config = WidgetConfig::default()
            .with_debounce_ms(u64::MAX)
            .with_page_size(100_000)
            .with_overlay_rows(900)
            .validated();
        assert!(config.validate().is_empty());
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_partial_keeps_defaults() {
        let config = WidgetConfig::from_toml_str("debounce_ms = 120\nadd_new_label = \"Add Party\"")
            .unwrap();
        assert_eq!(config.debounce_ms, 120);
        assert_eq!(config.add_new_label, "Add Party");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn json_file_round_trip() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"page_size": 50}}"#).unwrap();
        let config = WidgetConfig::from_file(file.path()).unwrap();
        assert_eq!(config.page_size, 50);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn bad_toml_is_typed_error() {
        assert!(matches!(
            WidgetConfig::from_toml_str("debounce_ms = \"fast\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
