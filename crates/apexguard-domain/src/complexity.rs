//! Cognitive complexity estimation.
//!
//! A simplified take on the cognitive complexity metric: each control-flow
//! token contributes a fixed weight multiplied by the brace-nesting depth of
//! its line. Nesting is tracked by counting `{`/`}` per line and clamped at
//! zero — not a real parser, and method bodies are approximated with a fixed
//! look-ahead window rather than brace matching.

use regex::Regex;

pub const DEFAULT_COMPLEXITY_THRESHOLD: u32 = 15;

/// Number of lines after a method signature taken as the body surrogate.
const BODY_WINDOW_LINES: usize = 50;

/// Pure, stateless scorer. Compiles its token patterns once; no state is
/// retained between calls.
#[derive(Debug)]
pub struct ComplexityEstimator {
    method_signature: Regex,
    control_flow: Vec<(Regex, u32)>,
}

impl Default for ComplexityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplexityEstimator {
    pub fn new() -> Self {
        let token = |re: &str| Regex::new(re).expect("control-flow pattern should compile");

        Self {
            method_signature: token(
                r"(?i)\b(public|private|protected|global)\s+(static\s+)?\w+\s+\w+\s*\([^)]*\)\s*\{",
            ),
            control_flow: vec![
                (token(r"(?i)\bif\s*\("), 1),
                (token(r"(?i)\belse\s+if\s*\("), 1),
                (token(r"(?i)\belse\s*\{"), 1),
                (token(r"(?i)\bfor\s*\("), 1),
                (token(r"(?i)\bwhile\s*\("), 1),
                (token(r"(?i)\bdo\s*\{"), 1),
                (token(r"(?i)\bcatch\s*\("), 1),
                (token(r"(?i)\bcase\s+"), 1),
                (token(r"&&"), 1),
                (token(r"\|\|"), 1),
                (token(r"\?.*?:"), 1),
            ],
        }
    }

    /// Scores a method body. Monotonic in nesting depth and in the number
    /// of control-flow tokens; deterministic.
    pub fn score(&self, method_body: &str) -> u32 {
        let mut complexity: u32 = 0;
        let mut nesting: i32 = 0;

        for line in method_body.split('\n') {
            nesting += line.matches('{').count() as i32;
            nesting -= line.matches('}').count() as i32;
            nesting = nesting.max(0);

            let weight_base = (nesting as u32).max(1);
            for (pattern, weight) in &self.control_flow {
                let hits = pattern.find_iter(line).count() as u32;
                complexity = complexity.saturating_add(hits * weight * weight_base);
            }
        }

        complexity
    }

    /// Finds method signatures and scores a bounded look-ahead window after
    /// each one. Returns `(signature_line, score)` pairs (1-based) for
    /// methods whose score exceeds `threshold`.
    pub fn detect(&self, content: &str, threshold: u32) -> Vec<(u32, u32)> {
        let lines: Vec<&str> = content.split('\n').collect();
        let mut out = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            if !self.method_signature.is_match(line) {
                continue;
            }

            let body_start = idx + 1;
            let body_end = (body_start + BODY_WINDOW_LINES).min(lines.len());
            let body = lines[body_start..body_end].join("\n");

            let score = self.score(&body);
            if score > threshold {
                out.push((idx as u32 + 1, score));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_scores_zero() {
        let est = ComplexityEstimator::new();
        assert_eq!(est.score(""), 0);
        assert_eq!(est.score("Integer x = 1;\nreturn x;"), 0);
    }

    #[test]
    fn tokens_at_top_level_count_once_each() {
        let est = ComplexityEstimator::new();
        // "if (...) {" opens a brace before the token is weighted, so the
        // multiplier is max(1, 1) = 1.
        assert_eq!(est.score("if (a) {\n}"), 1);
        assert_eq!(est.score("if (a && b) {\n}"), 2);
    }

    #[test]
    fn nesting_multiplies_token_weight() {
        let est = ComplexityEstimator::new();
        let flat = "if (a) {\n}\n";
        let nested = "if (x) {\n    if (a) {\n    }\n}\n";
        // inner if sits at depth 2 -> weight 2, outer at depth 1 -> weight 1
        assert_eq!(est.score(flat), 1);
        assert_eq!(est.score(nested), 3);
    }

    #[test]
    fn unbalanced_closers_clamp_at_zero() {
        let est = ComplexityEstimator::new();
        assert_eq!(est.score("}\n}\nif (a) {\n}"), 1);
    }

    #[test]
    fn detect_anchors_at_signature_line() {
        let est = ComplexityEstimator::new();
        let mut content = String::from("public class C {\n");
        content.push_str("    public void busy(Integer n) {\n");
        for _ in 0..6 {
            content.push_str("        if (n > 0 && n < 10) {\n");
        }
        for _ in 0..6 {
            content.push_str("        }\n");
        }
        content.push_str("    }\n}\n");

        let hits = est.detect(&content, DEFAULT_COMPLEXITY_THRESHOLD);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 2, "violation anchors at the signature line");
        assert!(hits[0].1 > DEFAULT_COMPLEXITY_THRESHOLD);
    }

    #[test]
    fn detect_ignores_simple_methods() {
        let est = ComplexityEstimator::new();
        let content = "public class C {\n    public Integer one() {\n        return 1;\n    }\n}\n";
        assert!(est.detect(content, DEFAULT_COMPLEXITY_THRESHOLD).is_empty());
    }

    #[test]
    fn body_window_is_bounded() {
        let est = ComplexityEstimator::new();
        let mut content = String::from("private static String run(String s) {\n");
        // Dense control flow past the 50-line window must not count.
        for _ in 0..BODY_WINDOW_LINES {
            content.push_str("s = s;\n");
        }
        for _ in 0..40 {
            content.push_str("if (a && b || c) {\n}\n");
        }
        assert!(est.detect(&content, DEFAULT_COMPLEXITY_THRESHOLD).is_empty());
    }
}
