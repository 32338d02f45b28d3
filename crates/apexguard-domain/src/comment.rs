//! Intra-line comment detection.
//!
//! Both checks are deliberately approximate: the `//` scan does not track
//! string-literal escaping, and the block-comment check only looks at the
//! current line (block comments spanning multiple lines are a documented
//! non-goal). `column` is a byte offset into `line` as produced by a regex
//! match on that same line.

/// Returns true when the byte position `column` on `line` falls inside a
/// comment, in which case any match there must be discarded.
pub fn is_in_comment(line: &str, column: usize) -> bool {
    if let Some(pos) = line.find("//") {
        if pos < column {
            return true;
        }
    }

    let column = column.min(line.len());
    let prefix = &line[..column];
    prefix.contains("/*") && !prefix.contains("*/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_after_line_comment_is_suppressed() {
        let line = "// System.debug('x');";
        assert!(is_in_comment(line, line.find("System").unwrap()));
    }

    #[test]
    fn match_before_line_comment_is_kept() {
        let line = "System.debug('x'); // noisy";
        assert!(!is_in_comment(line, 0));
    }

    #[test]
    fn open_block_comment_suppresses() {
        let line = "/* System.debug('x');";
        assert!(is_in_comment(line, line.find("System").unwrap()));
    }

    #[test]
    fn closed_block_comment_does_not_suppress() {
        let line = "/* old */ System.debug('x');";
        assert!(!is_in_comment(line, line.find("System").unwrap()));
    }

    #[test]
    fn column_past_line_end_is_clamped() {
        assert!(!is_in_comment("insert acc;", 10_000));
    }
}
