use regex::Regex;
use tracing::debug;

use apexguard_types::Violation;

use crate::catalog::{DetectionMode, Heuristic, Rule, RuleCatalog};
use crate::comment::is_in_comment;
use crate::complexity::{ComplexityEstimator, DEFAULT_COMPLEXITY_THRESHOLD};

/// Evaluates every catalog rule against one file's content.
///
/// Purely in-memory: the surrounding scan handles file I/O and skips
/// unreadable files before this point. Always returns a best-effort set.
pub fn scan(catalog: &RuleCatalog, file_path: &str, content: &str) -> Vec<Violation> {
    scan_with_threshold(catalog, file_path, content, DEFAULT_COMPLEXITY_THRESHOLD)
}

pub fn scan_with_threshold(
    catalog: &RuleCatalog,
    file_path: &str,
    content: &str,
    complexity_threshold: u32,
) -> Vec<Violation> {
    let lines: Vec<&str> = content.split('\n').collect();
    let estimator = ComplexityEstimator::new();
    let mut violations = Vec::new();

    for rule in catalog.all() {
        match &rule.detection {
            DetectionMode::Pattern(re) => {
                check_pattern(rule, re, file_path, &lines, &mut violations);
            }
            DetectionMode::Heuristic(Heuristic::SharingDeclaration) => {
                check_sharing(rule, file_path, &lines, &mut violations);
            }
            DetectionMode::Heuristic(Heuristic::CognitiveComplexity) => {
                check_complexity(
                    rule,
                    &estimator,
                    file_path,
                    content,
                    complexity_threshold,
                    &mut violations,
                );
            }
        }
    }

    debug!(
        file = file_path,
        count = violations.len(),
        "detection finished"
    );
    violations
}

/// Pattern rules evaluate every line independently; matches cannot span
/// lines. Matches inside same-line comments are discarded.
fn check_pattern(
    rule: &Rule,
    re: &Regex,
    file_path: &str,
    lines: &[&str],
    out: &mut Vec<Violation>,
) {
    for (idx, line) in lines.iter().enumerate() {
        for m in re.find_iter(line) {
            if is_in_comment(line, m.start()) {
                continue;
            }

            out.push(Violation::new(
                rule.id,
                rule.severity,
                file_path,
                idx as u32 + 1,
                byte_to_column(line, m.start()),
                rule.description,
                line.trim(),
            ));
        }
    }
}

/// Class declarations introduced by `public`/`global` must carry a sharing
/// qualifier on the declaration line or on the line directly before or
/// after it.
fn check_sharing(rule: &Rule, file_path: &str, lines: &[&str], out: &mut Vec<Violation>) {
    let class_decl = Regex::new(
        r"(?i)^\s*(public|global)\s+(class|abstract\s+class|virtual\s+class)\s+\w+",
    )
    .expect("class declaration pattern should compile");
    let sharing = Regex::new(r"(?i)\b(with|without|inherited)\s+sharing\b")
        .expect("sharing qualifier pattern should compile");

    for (idx, line) in lines.iter().enumerate() {
        let Some(m) = class_decl.find(line) else {
            continue;
        };

        let window_start = idx.saturating_sub(1);
        let window_end = (idx + 2).min(lines.len());
        let window = lines[window_start..window_end].join("\n");

        if !sharing.is_match(&window) {
            out.push(Violation::new(
                rule.id,
                rule.severity,
                file_path,
                idx as u32 + 1,
                byte_to_column(line, m.start()),
                rule.description,
                line.trim(),
            ));
        }
    }
}

fn check_complexity(
    rule: &Rule,
    estimator: &ComplexityEstimator,
    file_path: &str,
    content: &str,
    threshold: u32,
    out: &mut Vec<Violation>,
) {
    for (line_number, score) in estimator.detect(content, threshold) {
        out.push(Violation::new(
            rule.id,
            rule.severity,
            file_path,
            line_number,
            1,
            format!("{} (complexity: {score})", rule.description),
            format!("Method has complexity score of {score}"),
        ));
    }
}

fn byte_to_column(line: &str, byte_idx: usize) -> u32 {
    let byte_idx = byte_idx.min(line.len());
    line[..byte_idx].chars().count() as u32 + 1
}
