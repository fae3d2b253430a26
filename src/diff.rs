//! Unified diff generation for dry-run previews.
//!
//! A prepend only ever changes the top of a file, so each file gets a single
//! hunk. A header ending in `\n` is a pure insertion before line 1
//! (`@@ -0,0 +1,N @@`). A header without a trailing newline merges its last
//! fragment into the original first line, so that line is shown as replaced.

use crate::header::Header;

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file\n";

/// One file that would be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrependPreview {
    /// Display path used in the `---`/`+++` headers.
    pub file: String,
    /// First line of the original content without its `\n`, `None` when empty.
    pub first_line: Option<String>,
    /// Whether the original has more than its first line, or a `\n` after it.
    pub first_line_terminated: bool,
}

impl PrependPreview {
    /// Capture what the diff needs from the original bytes.
    pub fn from_original(file: impl Into<String>, original: &[u8]) -> Self {
        let (first_line, terminated) = match original.iter().position(|&b| b == b'\n') {
            Some(end) => (Some(&original[..end]), true),
            None if original.is_empty() => (None, false),
            None => (Some(original), false),
        };
        PrependPreview {
            file: file.into(),
            first_line: first_line.map(|line| String::from_utf8_lossy(line).to_string()),
            first_line_terminated: terminated,
        }
    }
}

/// Generate a unified diff showing `header` prepended to every file.
pub fn generate_prepend_diff(header: &Header, previews: &[PrependPreview]) -> String {
    if header.is_empty() {
        return String::new();
    }

    let mut diff = String::new();
    for preview in previews {
        diff.push_str(&format!("--- a/{}\n", preview.file));
        diff.push_str(&format!("+++ b/{}\n", preview.file));

        match preview.first_line.as_deref() {
            Some(first) if !header.ends_with_newline() => {
                push_merged_hunk(&mut diff, header, first, preview.first_line_terminated)
            }
            Some(_) => push_insert_hunk(&mut diff, header, true),
            None => push_insert_hunk(&mut diff, header, header.ends_with_newline()),
        }
    }

    diff
}

/// Header lines inserted before line 1.
fn push_insert_hunk(diff: &mut String, header: &Header, last_terminated: bool) {
    diff.push_str(&format!("@@ -0,0 +1,{} @@\n", header.line_count()));
    for line in header.lines() {
        diff.push_str(&format!("+{}\n", line));
    }
    if !last_terminated {
        diff.push_str(NO_NEWLINE_MARKER);
    }
}

/// Line 1 replaced by the header, whose last fragment carries the old line 1.
fn push_merged_hunk(diff: &mut String, header: &Header, first: &str, terminated: bool) {
    diff.push_str(&format!("@@ -1,1 +1,{} @@\n", header.line_count()));
    diff.push_str(&format!("-{}\n", first));
    if !terminated {
        diff.push_str(NO_NEWLINE_MARKER);
    }

    let lines: Vec<&str> = header.lines().collect();
    if let Some((last, leading)) = lines.split_last() {
        for line in leading {
            diff.push_str(&format!("+{}\n", line));
        }
        diff.push_str(&format!("+{}{}\n", last, first));
    }
    if !terminated {
        diff.push_str(NO_NEWLINE_MARKER);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(file: &str, original: &str) -> PrependPreview {
        PrependPreview::from_original(file, original.as_bytes())
    }

    /// Apply a single-file, single-hunk diff the way `patch` would.
    fn apply_hunk(original: &str, diff: &str) -> String {
        let mut lines = diff.lines().skip(2);
        let hunk = lines.next().expect("hunk header");
        let old_range = hunk.split(' ').nth(1).unwrap().trim_start_matches('-');
        let (start, count) = old_range.split_once(',').unwrap();
        let start: usize = start.parse().unwrap();
        let count: usize = count.parse().unwrap();

        // A zero-length old range inserts after `start`; otherwise it replaces from `start`.
        let kept = if count == 0 { start } else { start - 1 };
        let original_lines: Vec<&str> = original.split_inclusive('\n').collect();
        let body: Vec<&str> = lines.collect();

        let mut out = original_lines[..kept].concat();
        for (i, line) in body.iter().enumerate() {
            if let Some(added) = line.strip_prefix('+') {
                out.push_str(added);
                if !body.get(i + 1).is_some_and(|next| next.starts_with('\\')) {
                    out.push('\n');
                }
            }
        }
        out.push_str(&original_lines[kept + count..].concat());
        out
    }

    fn assert_applies(header: &Header, original: &str) {
        let diff = generate_prepend_diff(header, &[preview("t.test.ts", original)]);
        let expected = String::from_utf8(header.prepend(original.as_bytes())).unwrap();
        assert_eq!(apply_hunk(original, &diff), expected, "diff:\n{}", diff);
    }

    #[test]
    fn single_file_default_header() {
        let diff = generate_prepend_diff(&Header::default(), &[preview("map.test.ts", "x\n")]);

        assert!(diff.starts_with("--- a/map.test.ts\n+++ b/map.test.ts\n"));
        assert!(diff.contains("@@ -0,0 +1,3 @@\n"));
        assert!(diff.contains("+import { aseq, aseqs, ASeq } from \"@lib\"\n"));
        assert!(diff.contains("+import { expect } from \"@assertive-ts/core\"\n"));
        assert!(diff.ends_with("+\n"));
    }

    #[test]
    fn terminated_header_inserts_before_line_one() {
        assert_applies(&Header::default(), "line1\nline2\n");
        assert_applies(&Header::default(), "");
        assert_applies(&Header::new("// x\n"), "solo");
    }

    #[test]
    fn empty_original_anchors_at_zero() {
        let diff = generate_prepend_diff(&Header::new("// x\n"), &[preview("e.test.ts", "")]);
        assert!(diff.contains("@@ -0,0 +1,1 @@\n+// x\n"));
        assert!(!diff.contains("No newline"));
    }

    #[test]
    fn unterminated_header_merges_into_first_line() {
        let diff = generate_prepend_diff(&Header::new("a"), &[preview("m.test.ts", "line1\nline2\n")]);
        assert!(diff.contains("@@ -1,1 +1,1 @@\n-line1\n+aline1\n"));

        assert_applies(&Header::new("a"), "line1\nline2\n");
        assert_applies(&Header::new("x\ny"), "solo");
    }

    #[test]
    fn unterminated_header_on_empty_file_marks_missing_newline() {
        let diff = generate_prepend_diff(&Header::new("a"), &[preview("e.test.ts", "")]);
        assert!(diff.ends_with("@@ -0,0 +1,1 @@\n+a\n\\ No newline at end of file\n"));
        assert_applies(&Header::new("a"), "");
    }

    #[test]
    fn one_hunk_per_file() {
        let diff = generate_prepend_diff(
            &Header::default(),
            &[preview("a.test.ts", "a"), preview("b.test.ts", "b\n")],
        );
        assert_eq!(diff.matches("@@ -").count(), 2);
        assert!(diff.contains("--- a/a.test.ts"));
        assert!(diff.contains("--- a/b.test.ts"));
    }

    #[test]
    fn preview_captures_first_line() {
        let p = preview("f", "one\ntwo");
        assert_eq!(p.first_line.as_deref(), Some("one"));
        assert!(p.first_line_terminated);
        assert_eq!(preview("f", "").first_line, None);
        assert!(!preview("f", "solo").first_line_terminated);
    }

    #[test]
    fn empty_header_or_files_is_empty() {
        assert!(generate_prepend_diff(&Header::new(""), &[preview("a", "x")]).is_empty());
        assert!(generate_prepend_diff(&Header::default(), &[]).is_empty());
    }
}
