//! The loader session: one pass over the load-file events.
//!
//! A session owns the catalog, the store and the reporter for the whole
//! load and holds at most one class context at a time. Soft errors discard
//! the current instance line and loading continues; fatal errors roll the
//! store back and stop the session.

mod class;
mod context;
mod instance;

use ldb_diagnostic::{Diagnostic, DiagnosticQueue, LoadError, LoadErrorKind, LoadResult};
use ldb_ir::ClassId;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::catalog::{CatalogError, SchemaCatalog};
use crate::commit::{CommitController, InterruptFlag, InterruptMode};
use crate::config::LoaderConfig;
use crate::event::{AttributeMode, EventKind, LoaderEvent};
use crate::report::{InterruptReport, LoadSummary, ReportSink};
use crate::resolve::{OidResolver, ResolutionTable};
use crate::store::{ObjectStore, StoreError};
use context::ClassContext;

/// Why a session stopped before the end of its input.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum LoadStop {
    #[error("load stopped: {0}")]
    Fatal(LoadError),

    #[error("load interrupted: {} instances rolled back", .0.lost)]
    Interrupted(InterruptReport),
}

impl From<LoadError> for LoadStop {
    fn from(err: LoadError) -> Self {
        LoadStop::Fatal(err)
    }
}

impl From<LoadErrorKind> for LoadStop {
    fn from(kind: LoadErrorKind) -> Self {
        LoadStop::Fatal(kind.into())
    }
}

impl From<StoreError> for LoadStop {
    fn from(err: StoreError) -> Self {
        LoadStop::Fatal(err.into())
    }
}

impl From<CatalogError> for LoadStop {
    fn from(err: CatalogError) -> Self {
        LoadStop::Fatal(err.into())
    }
}

/// Running totals of a session.
#[derive(Clone, Debug, Default)]
struct Counters {
    objects_loaded: u64,
    errors: u64,
    defaulted_instances: u64,
    last_committed_line: u32,
    fail_count: u64,
    /// Instances made durable by commits so far.
    committed: u64,
}

/// One load, from the first event to the summary.
pub struct LoaderSession<C, S, R> {
    catalog: C,
    store: S,
    reporter: R,
    config: LoaderConfig,
    validation_only: bool,
    interrupt: InterruptFlag,
    commit: CommitController,
    resolver: OidResolver,
    diagnostics: DiagnosticQueue,
    /// `%id` assignments.
    class_ids: FxHashMap<u32, ClassId>,
    /// `%id` assignments naming ignored classes that do not exist.
    ignored_ids: FxHashSet<u32>,
    context: Option<ClassContext>,
    /// Inside an ignored class block.
    skipping: bool,
    /// Classes that received inserts, in first-insert order.
    loaded_classes: Vec<ClassId>,
    counters: Counters,
    stopped: bool,
}

impl<C, S, R> LoaderSession<C, S, R>
where
    C: SchemaCatalog,
    S: ObjectStore,
    R: ReportSink,
{
    pub fn new(catalog: C, store: S, reporter: R, config: LoaderConfig) -> Self {
        LoaderSession {
            validation_only: config.validation_only,
            interrupt: InterruptFlag::new(config.interrupt_mode),
            commit: CommitController::new(config.periodic_commit, config.flush_interval),
            resolver: OidResolver::new(config.oid_batch_size),
            diagnostics: DiagnosticQueue::with_config(config.diagnostic_config()),
            class_ids: FxHashMap::default(),
            ignored_ids: FxHashSet::default(),
            context: None,
            skipping: false,
            loaded_classes: Vec::new(),
            counters: Counters::default(),
            stopped: false,
            catalog,
            store,
            reporter,
            config,
        }
    }

    /// A handle for requesting an interrupt from another thread.
    pub fn interrupt_flag(&self) -> InterruptFlag {
        self.interrupt.clone()
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn is_validation_only(&self) -> bool {
        self.validation_only
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn commit_controller(&self) -> &CommitController {
        &self.commit
    }

    pub fn resolver(&self) -> &OidResolver {
        &self.resolver
    }

    /// The resolution table of every class referenced or loaded so far.
    pub fn tables(&self) -> Vec<&ResolutionTable> {
        self.resolver.tables()
    }

    /// Retained diagnostics in report order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.peek()
    }

    /// Values consumed so far on the open instance line.
    pub fn cursor(&self) -> Option<usize> {
        self.context.as_ref()?.instance.as_ref().map(|i| i.cursor)
    }

    /// How many times the current class's descriptors were rebuilt.
    pub fn descriptor_generation(&self) -> Option<u32> {
        self.context.as_ref().map(|c| c.descriptors.generation())
    }

    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            objects_loaded: self.counters.objects_loaded,
            errors: self.counters.errors,
            defaulted_instances: self.counters.defaulted_instances,
            last_committed_line: self.counters.last_committed_line,
            fail_count: self.counters.fail_count,
            stopped: self.stopped,
        }
    }

    /// Dispatch one event.
    pub fn apply(&mut self, event: LoaderEvent) -> Result<(), LoadStop> {
        let line = event.line;
        match event.kind {
            EventKind::ClassId { name, id } => self.class_id(line, &name, id),
            EventKind::StartClass(class) => self.start_class(line, &class),
            EventKind::AttributeMode(mode) => self.set_attribute_mode(line, mode),
            EventKind::AddAttribute(name) => self.add_attribute(line, &name),
            EventKind::SetConstructor(name) => self.set_constructor(line, &name),
            EventKind::AddArgument(name) => self.add_argument(line, &name),
            EventKind::StartInstance(ordinal) => self.start_instance(line, ordinal),
            EventKind::Value(token) => self.value(line, &token),
            EventKind::OpenCollection => self.open_collection(line),
            EventKind::CloseCollection => self.close_collection(line),
            EventKind::FinishInstance => self.finish_instance(line),
            EventKind::Finish => self.finish(line).map(|_| ()),
        }
    }

    /// End of input: finish the open class, commit and report the summary.
    pub fn finish(&mut self, line: u32) -> Result<LoadSummary, LoadStop> {
        self.guard(line, |s| s.finish_context(line))?;
        if self.stopped {
            return Ok(self.summary());
        }
        self.guard(line, |s| s.final_commit(line))?;
        let summary = self.summary();
        self.reporter.summary(&summary);
        Ok(summary)
    }

    /// Switch a validated session to insertion and start counting afresh.
    pub fn start_insertion(&mut self, periodic_commit: u32) {
        self.validation_only = false;
        self.config.validation_only = false;
        self.config.periodic_commit = periodic_commit;
        self.commit = CommitController::new(periodic_commit, self.config.flush_interval);
        self.resolver.clear();
        self.diagnostics.flush();
        self.class_ids.clear();
        self.ignored_ids.clear();
        self.context = None;
        self.skipping = false;
        self.loaded_classes.clear();
        self.counters = Counters::default();
        self.stopped = false;
        tracing::info!(periodic_commit, "switched to insertion");
    }

    /// Ask the store to refresh statistics of every class loaded into.
    pub fn update_statistics(&mut self) -> LoadResult<()> {
        for &class in &self.loaded_classes {
            self.store.update_statistics(class)?;
            tracing::debug!(class = class.raw(), "statistics updated");
        }
        Ok(())
    }

    /// Run `step`; a fatal error stops the session.
    ///
    /// Events after a stop are ignored.
    fn guard(
        &mut self,
        line: u32,
        step: impl FnOnce(&mut Self) -> Result<(), LoadStop>,
    ) -> Result<(), LoadStop> {
        if self.stopped {
            return Ok(());
        }
        match step(self) {
            Err(LoadStop::Fatal(err)) => {
                self.stop_on_fatal(line, &err);
                Err(LoadStop::Fatal(err))
            }
            other => other,
        }
    }

    fn stop_on_fatal(&mut self, line: u32, err: &LoadError) {
        self.emit(Diagnostic::from_load_error(err, line));
        if let Some(ctx) = self.context.as_mut() {
            ctx.valid = false;
        }
        if !self.validation_only {
            if let Err(rollback) = self.store.rollback() {
                tracing::error!(error = %rollback, "rollback after fatal error failed");
            }
            self.commit.rolled_back();
        }
        self.resolver.discard_pending();
        self.stopped = true;
        self.reporter.stopped(line);
        let summary = self.summary();
        self.reporter.summary(&summary);
    }

    fn emit(&mut self, diag: Diagnostic) {
        if diag.is_error() {
            self.counters.errors += 1;
        }
        self.reporter.diagnostic(&diag);
        self.diagnostics.add(diag);
    }

    /// Report a soft error against the current instance line. Fatal errors
    /// pass through.
    fn soft<T>(&mut self, line: u32, result: LoadResult<T>) -> Result<Option<T>, LoadStop> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_fatal() => Err(LoadStop::Fatal(err)),
            Err(err) => {
                self.emit(Diagnostic::from_load_error(&err, line));
                if let Some(ctx) = self.context.as_mut() {
                    ctx.errors += 1;
                    if let Some(instance) = ctx.instance.as_mut() {
                        instance.errors += 1;
                    }
                }
                Ok(None)
            }
        }
    }

    /// Act on a pending interrupt request.
    fn check_interrupt(&mut self, line: u32) -> Result<(), LoadStop> {
        let mode = self.interrupt.take();
        let report = match mode {
            InterruptMode::None => return Ok(()),
            InterruptMode::AbortAndRollback => {
                let lost = if self.validation_only {
                    0
                } else {
                    self.store.rollback()?;
                    self.resolver.discard_pending();
                    self.commit.rolled_back()
                };
                InterruptReport {
                    mode,
                    committed_now: 0,
                    durable_total: self.counters.committed,
                    lost,
                }
            }
            InterruptMode::StopAndCommit => {
                let committed_now = if self.validation_only {
                    0
                } else {
                    self.commit_now(line)?
                };
                InterruptReport {
                    mode,
                    committed_now,
                    durable_total: self.counters.committed,
                    lost: 0,
                }
            }
        };
        tracing::warn!(line, ?mode, "interrupt honoured");
        self.stopped = true;
        self.reporter.post_interrupt(&report);
        let summary = self.summary();
        self.reporter.summary(&summary);
        Err(LoadStop::Interrupted(report))
    }

    /// Exchange, commit and account. Returns the instances made durable.
    #[tracing::instrument(level = "debug", skip(self))]
    fn commit_now(&mut self, line: u32) -> Result<u64, LoadStop> {
        self.resolver.exchange_pending(&mut self.store)?;
        self.store.commit()?;
        let committed = self.commit.committed();
        self.counters.committed += committed;
        self.counters.last_committed_line = line;
        Ok(committed)
    }

    /// The periodic commit threshold was reached.
    fn periodic_commit(&mut self, line: u32) -> Result<(), LoadStop> {
        self.commit_now(line)?;
        if let Some(ctx) = self.context.as_mut() {
            let is_class_attribute = ctx.mode == AttributeMode::Class;
            ctx.descriptors
                .refresh(&self.catalog, ctx.class, is_class_attribute)?;
        }
        self.reporter
            .post_commit(self.counters.committed, self.counters.last_committed_line);
        Ok(())
    }

    fn final_commit(&mut self, line: u32) -> Result<(), LoadStop> {
        if self.validation_only {
            return Ok(());
        }
        if self.commit_now(line)? > 0 {
            self.reporter.post_commit(self.counters.committed, line);
        }
        if self.counters.errors == 0 {
            self.counters.defaulted_instances = self.resolver.count_defaulted();
        }
        Ok(())
    }

    fn note_loaded_class(&mut self, class: ClassId) {
        if !self.loaded_classes.contains(&class) {
            self.loaded_classes.push(class);
        }
    }
}
