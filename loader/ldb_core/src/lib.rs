//! Bulk-load core: turns load-file events into stored instances.
//!
//! - [`LoaderSession`]: the event-driven loader and its class context
//! - [`OidResolver`]: forward references, placeholders and OID exchange
//! - [`CommitController`]/[`InterruptFlag`]: periodic commits and interrupts
//! - [`SchemaCatalog`]/[`ObjectStore`]: the schema and storage seams
//! - [`memory`]: in-memory catalog and store
//! - [`ReportSink`]: diagnostics, progress and the final summary
//!
//! # Debug Environment Variables
//!
//! - `RUST_LOG=ldb_core=debug`: class starts, commits and OID exchanges.
//! - `RUST_LOG=ldb_core=trace`: every placeholder as it is created.

mod catalog;
mod collection;
mod commit;
mod config;
mod descriptor;
mod event;
pub mod memory;
mod report;
mod resolve;
mod session;
mod store;

use std::sync::Once;

pub use catalog::{
    AttributeNamespace, CatalogError, CatalogHierarchy, MethodSignature, PartitionInfo,
    SchemaAttribute, SchemaCatalog,
};
pub use collection::CollectionBuilder;
pub use commit::{CommitController, CommitTick, InterruptFlag, InterruptMode};
pub use config::{IgnoredClassPolicy, LoaderConfig};
pub use descriptor::{AttributeDescriptor, Buffered, DescriptorTable};
pub use event::{run, AttributeMode, ClassRef, EventKind, LoaderEvent, ObjectRef, Token};
pub use report::{
    ClassReport, InterruptReport, LoadSummary, RecordingReporter, ReportSink, TracingReporter,
};
pub use resolve::{
    InstanceEntry, InstanceFlags, OidResolver, PlaceholderEntry, ReferenceOrigin, ResolutionTable,
};
pub use session::{LoadStop, LoaderSession};
pub use store::{ClassValueKind, ObjectStore, StoreError};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=ldb_core=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
