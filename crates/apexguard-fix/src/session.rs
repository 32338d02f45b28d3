//! Per-file edit state.
//!
//! A `FileEditSession` holds one file's content as an indexable line buffer
//! with explicit replace/insert operations. At most one session is live per
//! file; it is consumed when the file is written (or dropped on error after
//! the backup is confirmed).

/// Transient, single-file edit buffer. Lines are addressed 1-based using
/// the pre-fix numbering captured at detection time; callers that insert
/// lines are responsible for processing violations in descending line
/// order so those numbers stay valid.
#[derive(Debug)]
pub struct FileEditSession {
    original: String,
    lines: Vec<String>,
}

impl FileEditSession {
    pub fn new(content: &str) -> Self {
        Self {
            original: content.to_string(),
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        self.lines.get(idx).map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Read-only view of the buffer, for context-sensitive fixes that need
    /// to look at surrounding lines (type inference).
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Replaces a line in place. Out-of-range numbers are ignored (the
    /// buffer may legitimately be shorter than a stale violation claims).
    pub fn replace_line(&mut self, line_number: u32, new_line: String) {
        if let Some(idx) = line_number.checked_sub(1) {
            if let Some(slot) = self.lines.get_mut(idx as usize) {
                *slot = new_line;
            }
        }
    }

    /// Inserts a new line immediately before `line_number`, shifting every
    /// subsequent line down by one.
    pub fn insert_before(&mut self, line_number: u32, new_line: String) {
        if let Some(idx) = line_number.checked_sub(1) {
            let idx = idx as usize;
            if idx <= self.lines.len() {
                self.lines.insert(idx, new_line);
            }
        }
    }

    /// Strips trailing whitespace from every line in one pass; returns the
    /// number of lines that changed. Idempotent.
    pub fn strip_trailing_whitespace(&mut self) -> usize {
        let mut modified = 0;
        for line in &mut self.lines {
            let stripped = line.trim_end();
            if stripped.len() != line.len() {
                *line = stripped.to_string();
                modified += 1;
            }
        }
        modified
    }

    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    /// Whether any edit actually changed the buffer relative to the
    /// original content. Gates the file write (no spurious writes).
    pub fn is_dirty(&self) -> bool {
        self.content() != self.original
    }

    /// Coarse post-fix sanity signal: equal `{`/`}` counts. Advisory only;
    /// it never blocks a write.
    pub fn is_brace_balanced(&self) -> bool {
        let content = self.content();
        content.matches('{').count() == content.matches('}').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_one_based() {
        let s = FileEditSession::new("a\nb\nc");
        assert_eq!(s.line(1), Some("a"));
        assert_eq!(s.line(3), Some("c"));
        assert_eq!(s.line(0), None);
        assert_eq!(s.line(4), None);
    }

    #[test]
    fn insert_before_shifts_following_lines() {
        let mut s = FileEditSession::new("a\nb");
        s.insert_before(2, "x".to_string());
        assert_eq!(s.content(), "a\nx\nb");
        assert_eq!(s.line(3), Some("b"));
    }

    #[test]
    fn strip_trailing_whitespace_is_idempotent() {
        let mut s = FileEditSession::new("a  \nb\t\nc");
        assert_eq!(s.strip_trailing_whitespace(), 2);
        let first = s.content();
        assert_eq!(s.strip_trailing_whitespace(), 0);
        assert_eq!(s.content(), first);
    }

    #[test]
    fn dirty_only_after_a_real_change() {
        let mut s = FileEditSession::new("a\nb");
        assert!(!s.is_dirty());
        s.replace_line(1, "a".to_string());
        assert!(!s.is_dirty());
        s.replace_line(1, "z".to_string());
        assert!(s.is_dirty());
    }

    #[test]
    fn brace_balance_is_a_count_check_only() {
        let s = FileEditSession::new("class A { void f() { } }");
        assert!(s.is_brace_balanced());
        let t = FileEditSession::new("} {"); // balanced counts, wrong order
        assert!(t.is_brace_balanced());
        let u = FileEditSession::new("{ {");
        assert!(!u.is_brace_balanced());
    }

    #[test]
    fn trailing_newline_round_trips() {
        let s = FileEditSession::new("a\nb\n");
        assert_eq!(s.content(), "a\nb\n");
    }
}
