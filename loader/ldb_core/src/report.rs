//! Progress and outcome reporting.

use ldb_diagnostic::Diagnostic;
use serde::Serialize;

use crate::commit::InterruptMode;

/// Counts for one finished class.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub struct ClassReport {
    pub class: String,
    pub instances: u64,
    pub errors: u64,
}

/// What an interrupt did to the transaction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub struct InterruptReport {
    pub mode: InterruptMode,
    /// Instances made durable by the commit the interrupt triggered.
    pub committed_now: u64,
    /// Instances durable in total when the load stopped.
    pub durable_total: u64,
    /// Instances rolled back.
    pub lost: u64,
}

/// Final counters of a session.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, Serialize)]
pub struct LoadSummary {
    pub objects_loaded: u64,
    pub errors: u64,
    /// Forward-referenced instances that were never defined.
    pub defaulted_instances: u64,
    /// Last load-file line covered by a commit; 0 before the first commit.
    pub last_committed_line: u32,
    /// Instance lines discarded because of errors.
    pub fail_count: u64,
    pub stopped: bool,
}

/// Receives everything the operator is told during a load.
pub trait ReportSink {
    fn diagnostic(&mut self, diag: &Diagnostic);

    fn class_finished(&mut self, report: &ClassReport);

    /// Verbose progress: `total` instances of `class` loaded so far.
    fn instances_loaded(&mut self, class: &str, total: u64);

    /// `committed` instances are durable up to load-file `line`.
    fn post_commit(&mut self, committed: u64, line: u32);

    fn post_interrupt(&mut self, report: &InterruptReport);

    fn summary(&mut self, summary: &LoadSummary);

    /// The load stopped on a fatal error at `line`.
    fn stopped(&mut self, line: u32);
}

/// Emits every report as a `tracing` event.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingReporter;

impl ReportSink for TracingReporter {
    fn diagnostic(&mut self, diag: &Diagnostic) {
        if diag.is_error() {
            tracing::error!(code = %diag.code, line = diag.line, "{}", diag.message);
        } else {
            tracing::warn!(code = %diag.code, line = diag.line, "{}", diag.message);
        }
    }

    fn class_finished(&mut self, report: &ClassReport) {
        tracing::info!(
            class = %report.class,
            instances = report.instances,
            errors = report.errors,
            "class loaded"
        );
    }

    fn instances_loaded(&mut self, class: &str, total: u64) {
        tracing::info!(class, total, "instances loaded");
    }

    fn post_commit(&mut self, committed: u64, line: u32) {
        tracing::info!(committed, line, "committed");
    }

    fn post_interrupt(&mut self, report: &InterruptReport) {
        tracing::warn!(
            mode = ?report.mode,
            committed_now = report.committed_now,
            durable_total = report.durable_total,
            lost = report.lost,
            "load interrupted"
        );
    }

    fn summary(&mut self, summary: &LoadSummary) {
        tracing::info!(
            objects = summary.objects_loaded,
            errors = summary.errors,
            defaulted = summary.defaulted_instances,
            last_committed_line = summary.last_committed_line,
            failed = summary.fail_count,
            stopped = summary.stopped,
            "load finished"
        );
    }

    fn stopped(&mut self, line: u32) {
        tracing::error!(line, "load stopped");
    }
}

/// Keeps every report for later inspection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingReporter {
    pub diagnostics: Vec<Diagnostic>,
    pub classes: Vec<ClassReport>,
    pub status: Vec<(String, u64)>,
    /// `(committed, line)` per commit.
    pub commits: Vec<(u64, u32)>,
    pub interrupts: Vec<InterruptReport>,
    pub summaries: Vec<LoadSummary>,
    pub stopped_at: Option<u32>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }
}

impl ReportSink for RecordingReporter {
    fn diagnostic(&mut self, diag: &Diagnostic) {
        self.diagnostics.push(diag.clone());
    }

    fn class_finished(&mut self, report: &ClassReport) {
        self.classes.push(report.clone());
    }

    fn instances_loaded(&mut self, class: &str, total: u64) {
        self.status.push((class.to_owned(), total));
    }

    fn post_commit(&mut self, committed: u64, line: u32) {
        self.commits.push((committed, line));
    }

    fn post_interrupt(&mut self, report: &InterruptReport) {
        self.interrupts.push(*report);
    }

    fn summary(&mut self, summary: &LoadSummary) {
        self.summaries.push(summary.clone());
    }

    fn stopped(&mut self, line: u32) {
        self.stopped_at = Some(line);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use ldb_diagnostic::ErrorCode;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn recording_splits_errors_and_warnings() {
        let mut reporter = RecordingReporter::new();
        reporter.diagnostic(&Diagnostic::error(ErrorCode::L1004).with_line(3));
        reporter.diagnostic(&Diagnostic::warning(ErrorCode::W1001));
        assert_eq!(reporter.errors().count(), 1);
        assert_eq!(reporter.warnings().count(), 1);
    }

    #[test]
    fn summary_serializes_with_field_names() {
        let summary = LoadSummary {
            objects_loaded: 3,
            stopped: true,
            ..LoadSummary::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["objects_loaded"], 3);
        assert_eq!(json["stopped"], true);
    }
}
