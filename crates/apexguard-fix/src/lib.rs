//! Auto-fix engine for apexguard.
//!
//! Consumes violations produced by the detection engine and rewrites the
//! offending files, guaranteeing a pre-fix backup and a rollback path.
//! Violations are mutated in place (`fixed` / `fix_description`); nothing
//! is ever removed from the caller's set, so unresolved violations stay
//! visible to reporting.

mod backup;
mod engine;
mod infer;
mod session;

pub use backup::{backup_path, create_backup, rollback, RollbackOutcome};
pub use engine::{apply_fixes, FixEngine, FixError, FixSummary};
pub use infer::{build_dml_check, build_read_check, infer_object_type};
pub use session::FileEditSession;
