//! Diagnostics for the bulk loader.
//!
//! - [`ErrorCode`]: stable, searchable code per problem
//! - [`LoadError`]: what conversion, resolution and the session return
//! - [`Diagnostic`]: what the operator sees, tied to a load-file line
//! - [`DiagnosticQueue`]: collection with limits and fatal-error suppression

mod diagnostic;
mod error;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{LoadError, LoadErrorKind, LoadResult};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue, DiagnosticSeverity};
