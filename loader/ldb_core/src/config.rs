//! Loader configuration.

use ldb_diagnostic::DiagnosticConfig;
use serde::Deserialize;

use crate::commit::InterruptMode;

/// How skipped classes are reported.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredClassPolicy {
    #[default]
    Silent,
    /// Emit a warning diagnostic; warnings are not counted as errors.
    Warn,
}

/// Settings for one loader session.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Parse and check every line without touching the store.
    pub validation_only: bool,
    /// Instances per commit; 0 commits only at the end.
    pub periodic_commit: u32,
    /// What a bare interrupt requests.
    pub interrupt_mode: InterruptMode,
    /// Classes to skip, matched case-insensitively.
    pub ignored_classes: Vec<String>,
    pub ignored_class_policy: IgnoredClassPolicy,
    /// Most temporary OIDs exchanged per store round trip.
    pub oid_batch_size: usize,
    /// Instances between class flushes; 0 disables.
    pub flush_interval: u32,
    pub verbose: bool,
    /// Instances between verbose status reports.
    pub status_count: u32,
    /// Diagnostics retained by the session; 0 keeps all.
    pub error_limit: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            validation_only: false,
            periodic_commit: 0,
            interrupt_mode: InterruptMode::None,
            ignored_classes: Vec::new(),
            ignored_class_policy: IgnoredClassPolicy::Silent,
            oid_batch_size: 2000,
            flush_interval: 10_000,
            verbose: false,
            status_count: 10,
            error_limit: 0,
        }
    }
}

impl LoaderConfig {
    pub fn is_ignored(&self, class: &str) -> bool {
        self.ignored_classes
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(class))
    }

    pub fn diagnostic_config(&self) -> DiagnosticConfig {
        DiagnosticConfig {
            error_limit: self.error_limit,
            ..DiagnosticConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LoaderConfig = serde_json::from_str(
            r#"{"periodic_commit": 500, "interrupt_mode": "stop_and_commit",
                "ignored_classes": ["Audit"], "ignored_class_policy": "warn"}"#,
        )
        .unwrap();
        assert_eq!(config.periodic_commit, 500);
        assert_eq!(config.interrupt_mode, InterruptMode::StopAndCommit);
        assert_eq!(config.ignored_class_policy, IgnoredClassPolicy::Warn);
        assert_eq!(config.oid_batch_size, 2000);
        assert_eq!(config.flush_interval, 10_000);
        assert_eq!(config.status_count, 10);
    }

    #[test]
    fn ignore_list_is_case_insensitive() {
        let config = LoaderConfig {
            ignored_classes: vec!["db_audit".into()],
            ..LoaderConfig::default()
        };
        assert!(config.is_ignored("DB_Audit"));
        assert!(!config.is_ignored("employee"));
    }
}
