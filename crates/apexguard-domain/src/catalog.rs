use regex::Regex;

use apexguard_types::{FixCapability, Severity};

/// How a rule finds violations: a line-oriented regex, or a named
/// programmatic detector. Modeled as a tagged variant so the detection
/// engine dispatches uniformly without rule-specific branching leaking
/// into orchestration.
#[derive(Debug, Clone)]
pub enum DetectionMode {
    Pattern(Regex),
    Heuristic(Heuristic),
}

/// Named programmatic detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    /// Class declarations missing a sharing qualifier in a 3-line window.
    SharingDeclaration,
    /// Nesting-weighted control-flow score per method.
    CognitiveComplexity,
}

/// Immutable catalog entry.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub detection: DetectionMode,
    pub fix_capability: FixCapability,
    pub remediation_guidance: &'static str,
}

/// The rule registry, constructed once at startup and passed by reference
/// into the engines. Iteration order is the definition order below and is
/// stable across runs (it feeds report ordering).
#[derive(Debug)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    pub fn built_in() -> Self {
        Self {
            rules: vec![
                Rule {
                    id: "AvoidDebugStatements",
                    severity: Severity::Moderate,
                    description: "Avoid using System.debug statements in production code",
                    detection: DetectionMode::Pattern(pattern(r"(?i)System\.debug\s*\(")),
                    fix_capability: FixCapability::Safe,
                    remediation_guidance: "Remove or comment out System.debug statements to \
                        improve performance and reduce log clutter.",
                },
                Rule {
                    id: "NoTrailingWhitespace",
                    severity: Severity::Low,
                    description: "Lines should not have trailing whitespace",
                    detection: DetectionMode::Pattern(pattern(r"[ \t]+$")),
                    fix_capability: FixCapability::Safe,
                    remediation_guidance: "Remove trailing whitespace from lines to maintain \
                        clean code.",
                },
                Rule {
                    id: "ApexSharingViolation",
                    severity: Severity::Critical,
                    description: "Apex classes should declare a sharing model (with sharing, \
                        without sharing, or inherited sharing)",
                    detection: DetectionMode::Heuristic(Heuristic::SharingDeclaration),
                    fix_capability: FixCapability::Safe,
                    remediation_guidance: "Add 'with sharing' to the class declaration to \
                        enforce record-level security.",
                },
                Rule {
                    id: "ApexCRUDViolation",
                    severity: Severity::Critical,
                    description: "Validate CRUD/FLS permissions before DML operations or SOQL \
                        queries",
                    detection: DetectionMode::Pattern(pattern(
                        r"(?i)\b(insert|update|delete|upsert|merge)\s+[a-zA-Z_]\w*\s*;|\[\s*SELECT\s+.+?\s+FROM\s+\w+",
                    )),
                    fix_capability: FixCapability::Partial,
                    remediation_guidance: "Add Schema.sObjectType checks for isAccessible(), \
                        isCreateable(), isUpdateable(), or isDeletable() before DML operations.",
                },
                Rule {
                    id: "ApexSOQLInjection",
                    severity: Severity::Critical,
                    description: "Potential SOQL injection vulnerability detected",
                    detection: DetectionMode::Pattern(pattern(
                        r#"(?i)\[\s*SELECT\s+.*?\+.*?FROM|Database\.query\s*\(\s*[^'"]"#,
                    )),
                    fix_capability: FixCapability::None,
                    remediation_guidance: "Use bind variables or String.escapeSingleQuotes() to \
                        prevent SOQL injection attacks. Avoid concatenating user input directly \
                        into SOQL queries.",
                },
                Rule {
                    id: "CognitiveComplexity",
                    severity: Severity::Moderate,
                    description: "Method has high cognitive complexity",
                    detection: DetectionMode::Heuristic(Heuristic::CognitiveComplexity),
                    fix_capability: FixCapability::None,
                    remediation_guidance: "Refactor complex methods by extracting logic into \
                        smaller, focused methods. Reduce nesting levels and simplify \
                        conditional logic.",
                },
            ],
        }
    }

    /// Unknown ids are a programming error on the caller's side, hence the
    /// Option return rather than a Result.
    pub fn lookup(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    pub fn all(&self) -> &[Rule] {
        &self.rules
    }
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("built-in rule pattern should compile")
}
