//! Fix orchestration: groups violations by file, applies per-rule
//! transforms in descending line order, and commits each file atomically
//! after its backup is confirmed.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use apexguard_domain::RuleCatalog;
use apexguard_types::Violation;

use crate::backup::create_backup;
use crate::infer::{build_dml_check, build_read_check, infer_object_type};
use crate::session::FileEditSession;

#[derive(Debug, thiserror::Error)]
pub enum FixError {
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Counts for a fix run. `failed` covers both violations the transforms
/// declined (inference miss, stale line) and violations abandoned because
/// their file could not be read, backed up, or written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixSummary {
    pub fixed: u32,
    pub failed: u32,
}

impl FixSummary {
    fn absorb(&mut self, other: FixSummary) {
        self.fixed += other.fixed;
        self.failed += other.failed;
    }
}

/// Rewrites files on disk to resolve fixable violations.
pub struct FixEngine {
    backup_root: PathBuf,
}

impl FixEngine {
    pub fn new(backup_root: impl Into<PathBuf>) -> Self {
        Self {
            backup_root: backup_root.into(),
        }
    }

    /// Applies every fixable violation in `violations`, mutating each record
    /// in place as it resolves. Non-fixable rules are skipped entirely and
    /// counted in neither bucket. A file-level failure (read, backup, write)
    /// abandons that file's whole queue: its violations are reset to
    /// unfixed and counted as failed, and the run moves on.
    pub fn fix_all(&self, catalog: &RuleCatalog, violations: &mut [Violation]) -> FixSummary {
        let mut by_file: BTreeMap<String, Vec<&mut Violation>> = BTreeMap::new();
        for violation in violations.iter_mut() {
            let rule = catalog
                .lookup(&violation.rule_id)
                .expect("scan produced a violation for a rule missing from the catalog");
            if rule.fix_capability.is_fixable() {
                by_file
                    .entry(violation.file_path.clone())
                    .or_default()
                    .push(violation);
            }
        }

        let mut summary = FixSummary::default();
        for (file, mut queue) in by_file {
            match self.fix_file(Path::new(&file), &mut queue) {
                Ok(file_summary) => summary.absorb(file_summary),
                Err(err) => {
                    warn!(file = %file, error = %err, "fix pass abandoned for file");
                    for violation in &mut queue {
                        violation.fixed = false;
                        violation.fix_description.clear();
                    }
                    summary.failed += queue.len() as u32;
                }
            }
        }
        summary
    }

    fn fix_file(
        &self,
        path: &Path,
        queue: &mut [&mut Violation],
    ) -> Result<FixSummary, FixError> {
        let content = fs::read_to_string(path).map_err(|source| FixError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        create_backup(&self.backup_root, path)?;

        let mut session = FileEditSession::new(&content);
        let summary = apply_to_session(&mut session, queue);

        if session.is_dirty() {
            if !session.is_brace_balanced() {
                warn!(file = %path.display(), "brace counts unbalanced after fixes");
            }
            write_atomic(path, &session.content())?;
            debug!(file = %path.display(), fixed = summary.fixed, "file rewritten");
        }
        Ok(summary)
    }
}

/// Pure fix pass over one file's content. Sorts the queue into descending
/// line order (insertions below never shift line numbers above), applies
/// each transform, and returns the rewritten content with the counts.
/// Violations are marked in place exactly as [`FixEngine::fix_all`] would.
pub fn apply_fixes(content: &str, violations: &mut [Violation]) -> (String, FixSummary) {
    let mut session = FileEditSession::new(content);
    let mut queue: Vec<&mut Violation> = violations.iter_mut().collect();
    let summary = apply_to_session(&mut session, &mut queue);
    (session.content(), summary)
}

fn apply_to_session(session: &mut FileEditSession, queue: &mut [&mut Violation]) -> FixSummary {
    // Stable sort: same-line violations keep detection order.
    queue.sort_by(|a, b| b.line_number.cmp(&a.line_number));

    let mut summary = FixSummary::default();
    for violation in queue.iter_mut() {
        let outcome = match violation.rule_id.as_str() {
            "AvoidDebugStatements" => fix_debug(session, violation.line_number),
            "NoTrailingWhitespace" => fix_whitespace(session),
            "ApexSharingViolation" => fix_sharing(session, violation.line_number),
            "ApexCRUDViolation" => fix_crud(session, violation.line_number),
            other => {
                debug!(rule = other, "no transform registered for fixable rule");
                None
            }
        };
        match outcome {
            Some(description) => {
                violation.fixed = true;
                violation.fix_description = description;
                summary.fixed += 1;
            }
            None => summary.failed += 1,
        }
    }
    summary
}

/// Comments out a `System.debug` call. Single-line statements keep the
/// surrounding code intact via a targeted replacement; statements that
/// continue onto later lines get the whole line commented and the fix is
/// reported as partial.
fn fix_debug(session: &mut FileEditSession, line_number: u32) -> Option<String> {
    let line = session.line(line_number)?.to_string();
    if !line.to_lowercase().contains("system.debug") {
        return None;
    }

    if line.trim_end().ends_with(';') {
        let re = Regex::new(r"(?i)(\s*)(System\.debug\s*\([^;]*\);)")
            .expect("debug fix pattern should compile");
        let updated = re.replace(&line, "${1}// ${2}").into_owned();
        if updated == line {
            return None;
        }
        session.replace_line(line_number, updated);
        Some("Commented out debug statement".to_string())
    } else {
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        session.replace_line(line_number, format!("{indent}// {}", line.trim_start()));
        Some("Commented out first line of multi-line debug statement (partial)".to_string())
    }
}

fn fix_whitespace(session: &mut FileEditSession) -> Option<String> {
    let modified = session.strip_trailing_whitespace();
    if modified == 0 {
        return None;
    }
    Some(format!("Removed trailing whitespace from {modified} line(s)"))
}

fn fix_sharing(session: &mut FileEditSession, line_number: u32) -> Option<String> {
    let line = session.line(line_number)?.to_string();
    let re = Regex::new(r"(?i)\b(public|global)\s+(class|abstract\s+class|virtual\s+class)\b")
        .expect("sharing fix pattern should compile");
    let updated = re.replace(&line, "${1} with sharing ${2}").into_owned();
    if updated == line {
        return None;
    }
    session.replace_line(line_number, updated);
    Some("Added 'with sharing' to class declaration".to_string())
}

/// Inserts a `Schema.sObjectType` permission guard above an unguarded DML
/// statement or inline query. Declines when the target object type cannot
/// be inferred from nearby declarations.
fn fix_crud(session: &mut FileEditSession, line_number: u32) -> Option<String> {
    let line = session.line(line_number)?.to_string();
    let dml_re = Regex::new(r"(?i)\b(insert|update|delete|upsert)\s+([a-zA-Z_]\w*)\s*;")
        .expect("dml fix pattern should compile");
    let soql_re = Regex::new(r"(?i)\[\s*SELECT\s+.+?\s+FROM\s+(\w+)")
        .expect("soql fix pattern should compile");

    let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();

    if let Some(caps) = dml_re.captures(&line) {
        let operation = caps[1].to_lowercase();
        let identifier = caps[2].to_string();
        let line_idx = line_number.checked_sub(1)? as usize;
        let object_type = infer_object_type(session.lines(), line_idx, &identifier)?;
        let guard = build_dml_check(&operation, &object_type)?;
        session.insert_before(line_number, format!("{indent}{guard}"));
        return Some(format!(
            "Added {operation} permission check for {object_type}"
        ));
    }

    if let Some(caps) = soql_re.captures(&line) {
        let object_type = caps[1].to_string();
        let guard = build_read_check(&object_type);
        session.insert_before(line_number, format!("{indent}{guard}"));
        return Some(format!("Added read permission check for {object_type}"));
    }

    None
}

fn write_atomic(path: &Path, content: &str) -> Result<(), FixError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&tmp, content).map_err(|source| FixError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| FixError::Io {
        path: path.to_path_buf(),
        source,
    })
}
