//! Diagnostic queue for collecting load diagnostics.
//!
//! Features:
//! - Retention limit so a bad file cannot grow the queue without bound
//! - Deduplication of the same code on the same line
//! - Instance-error suppression after a fatal error

use crate::Diagnostic;

/// How the queue treats a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Fatal error - always retained.
    Hard,
    /// Instance error or warning - dropped once a hard error was seen.
    Soft,
}

impl DiagnosticSeverity {
    pub fn of(diag: &Diagnostic) -> Self {
        if diag.code.is_fatal() {
            DiagnosticSeverity::Hard
        } else {
            DiagnosticSeverity::Soft
        }
    }
}

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of retained errors (0 = unlimited). Errors past the
    /// limit are still counted.
    pub error_limit: usize,
    /// Drop a diagnostic with the same code and line as the previous one.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

/// Queue for collecting diagnostics in report order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    /// Every error seen, retained or not.
    error_count: usize,
    warning_count: usize,
    has_hard_error: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic, classifying it by its code.
    ///
    /// Returns `true` if the diagnostic was retained.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let severity = DiagnosticSeverity::of(&diag);
        self.add_with_severity(diag, severity)
    }

    /// Add a diagnostic with an explicit severity.
    ///
    /// Returns `true` if the diagnostic was retained.
    pub fn add_with_severity(&mut self, diag: Diagnostic, severity: DiagnosticSeverity) -> bool {
        let soft = matches!(severity, DiagnosticSeverity::Soft);
        if soft && self.has_hard_error {
            return false;
        }
        if self.config.deduplicate && self.is_duplicate(&diag) {
            return false;
        }

        if diag.is_error() {
            self.error_count += 1;
            if !soft {
                self.has_hard_error = true;
            }
            if self.config.error_limit > 0 && self.error_count > self.config.error_limit {
                return false;
            }
        } else {
            self.warning_count += 1;
        }

        self.diagnostics.push(diag);
        true
    }

    /// Check if the retention limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_hard_error(&self) -> bool {
        self.has_hard_error
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Return the retained diagnostics and reset the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.warning_count = 0;
        self.has_hard_error = false;
        std::mem::take(&mut self.diagnostics)
    }

    fn is_duplicate(&self, diag: &Diagnostic) -> bool {
        self.diagnostics
            .last()
            .is_some_and(|last| last.code == diag.code && last.line == diag.line && last.line > 0)
    }
}

#[cfg(test)]
mod tests;
