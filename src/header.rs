//! The import header prepended to test files.

/// Import block used when no header is configured.
///
/// Two imports (sequence constructors and the assertion entry point)
/// followed by a blank line separating them from the original content.
pub const DEFAULT_HEADER: &str =
    "import { aseq, aseqs, ASeq } from \"@lib\"\nimport { expect } from \"@assertive-ts/core\"\n\n";

/// Header text to prepend.
///
/// The text is used verbatim. No trailing newline is added, so a custom
/// header that should sit on its own line must end with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    text: String,
}

impl Header {
    /// Create a header from arbitrary text.
    pub fn new(text: impl Into<String>) -> Self {
        Header { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines the header occupies, counting a final unterminated
    /// fragment as a line.
    pub fn line_count(&self) -> usize {
        self.text.split_inclusive('\n').count()
    }

    /// Header lines without their `\n` terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.text
            .split_inclusive('\n')
            .map(|line| line.strip_suffix('\n').unwrap_or(line))
    }

    /// Whether the header ends on a line boundary. When it does not, its last
    /// fragment joins the first line of the original content.
    pub fn ends_with_newline(&self) -> bool {
        self.text.ends_with('\n')
    }

    /// Concatenate header and `original`. No check for an existing header.
    pub fn prepend(&self, original: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.text.len() + original.len());
        out.extend_from_slice(self.text.as_bytes());
        out.extend_from_slice(original);
        out
    }
}

impl Default for Header {
    fn default() -> Self {
        Header::new(DEFAULT_HEADER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_header_matches_expected_block() {
        let out = Header::default().prepend(b"describe(\"x\", () => {})");
        let expected = "import { aseq, aseqs, ASeq } from \"@lib\"\n\
                        import { expect } from \"@assertive-ts/core\"\n\
                        \n\
                        describe(\"x\", () => {})";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn prepend_is_plain_concatenation() {
        let header = Header::new("// h\n");
        let once = header.prepend(b"body");
        let twice = header.prepend(&once);
        assert_eq!(twice, b"// h\n// h\nbody");
    }

    #[test]
    fn prepend_keeps_non_utf8_bytes() {
        let header = Header::new("x\n");
        assert_eq!(header.prepend(&[0xff, 0xfe]), vec![b'x', b'\n', 0xff, 0xfe]);
    }

    #[test]
    fn line_count_counts_blank_separator() {
        assert_eq!(Header::default().line_count(), 3);
        assert_eq!(Header::new("").line_count(), 0);
        assert!(Header::new("").is_empty());
    }

    #[test]
    fn unterminated_fragment_counts_as_line() {
        let header = Header::new("a\nb");
        assert_eq!(header.line_count(), 2);
        assert_eq!(header.lines().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(!header.ends_with_newline());
        assert!(Header::default().ends_with_newline());
    }
}
