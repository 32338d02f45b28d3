//! Data types (violations + scan receipts) for apexguard.
//!
//! This crate is intentionally "dumb": pure DTOs with serde + schemars.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Schema Identifiers ─────────────────────────────────────────
pub const SCAN_SCHEMA_V1: &str = "apexguard.scan.v1";

/// Violation severity, ordered from least to most severe so that
/// `Critical > High > Moderate > Low > Info` holds under derived `Ord`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Per-rule classification of whether automatic remediation is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FixCapability {
    /// No automatic fix exists; manual review required.
    None,
    /// A fix may apply when surrounding context can be resolved.
    Partial,
    /// Fully auto-fixable.
    Safe,
}

impl FixCapability {
    pub fn as_str(self) -> &'static str {
        match self {
            FixCapability::None => "none",
            FixCapability::Partial => "partial",
            FixCapability::Safe => "safe",
        }
    }

    /// Whether violations of a rule with this capability may be handed
    /// to the fix engine at all.
    pub fn is_fixable(self) -> bool {
        matches!(self, FixCapability::Safe | FixCapability::Partial)
    }
}

/// One detected instance of a rule being broken.
///
/// Created only by the detection engine; the fix engine mutates `fixed` and
/// `fix_description` in place. `line_number` always refers to the pre-fix
/// numbering captured at detection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub rule_id: String,
    /// Copied from the rule at detection time, not re-derived later.
    pub severity: Severity,
    pub file_path: String,
    /// 1-based line in the pre-fix file.
    pub line_number: u32,
    /// 1-based column of the match start.
    pub column: u32,
    pub description: String,
    /// Verbatim source line, trimmed.
    pub code_snippet: String,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fix_description: String,
}

impl Violation {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        file_path: impl Into<String>,
        line_number: u32,
        column: u32,
        description: impl Into<String>,
        code_snippet: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            file_path: file_path.into(),
            line_number,
            column,
            description: description.into(),
            code_snippet: code_snippet.into(),
            fixed: false,
            fix_description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub moderate: u32,
    pub low: u32,
    pub info: u32,
}

impl SeverityCounts {
    pub fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical = self.critical.saturating_add(1),
            Severity::High => self.high = self.high.saturating_add(1),
            Severity::Moderate => self.moderate = self.moderate.saturating_add(1),
            Severity::Low => self.low = self.low.saturating_add(1),
            Severity::Info => self.info = self.info.saturating_add(1),
        }
    }

    pub fn total(&self) -> u32 {
        self.critical + self.high + self.moderate + self.low + self.info
    }
}

/// Summary statistics for one scan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ScanStats {
    pub files_scanned: u32,
    pub total_violations: u32,
    pub fixed_violations: u32,
    pub counts: SeverityCounts,
    /// Violation counts keyed by rule id (BTreeMap for stable report order).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_rule: BTreeMap<String, u32>,
}

/// The JSON receipt written after a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScanReceipt {
    /// Schema identifier, always "apexguard.scan.v1".
    pub schema: String,
    pub tool: ToolMeta,
    pub stats: ScanStats,
    /// Every violation found, fixed and unfixed alike.
    pub violations: Vec<Violation>,
}

impl ScanReceipt {
    /// Builds a receipt from a finished violation set, deriving the stats
    /// that depend on the violations themselves.
    pub fn from_violations(tool: ToolMeta, files_scanned: u32, violations: Vec<Violation>) -> Self {
        let mut counts = SeverityCounts::default();
        let mut by_rule = BTreeMap::<String, u32>::new();
        let mut fixed_violations = 0u32;

        for v in &violations {
            counts.bump(v.severity);
            *by_rule.entry(v.rule_id.clone()).or_insert(0) += 1;
            if v.fixed {
                fixed_violations = fixed_violations.saturating_add(1);
            }
        }

        Self {
            schema: SCAN_SCHEMA_V1.to_string(),
            tool,
            stats: ScanStats {
                files_scanned,
                total_violations: violations.len() as u32,
                fixed_violations,
                counts,
                by_rule,
            },
            violations,
        }
    }
}
