//! Rule catalog and detection engine for apexguard.
//!
//! Detection is a pure function of one file's content: it never performs
//! I/O and never fails — malformed input yields a best-effort violation set.

mod catalog;
mod comment;
mod complexity;
mod detect;

pub use catalog::{DetectionMode, Heuristic, Rule, RuleCatalog};
pub use comment::is_in_comment;
pub use complexity::{ComplexityEstimator, DEFAULT_COMPLEXITY_THRESHOLD};
pub use detect::{scan, scan_with_threshold};
