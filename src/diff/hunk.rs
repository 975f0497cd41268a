use crate::parse::{HunkHeader, ParseError, parse_hunk_header};

/// What a hunk represents within a file's diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkKind {
    /// The `diff --git`/`index`/`---`/`+++` preamble
    FileHeader,
    /// An ordinary `@@` hunk
    Change,
    /// `old mode`/`new mode` lines split out of the preamble
    ModeChange,
    /// A hunk removing a whole file
    Deletion,
    /// A hunk creating a whole file
    Addition,
}

impl HunkKind {
    /// Whether hunks of this kind start with an `@@` header line.
    pub fn has_range(self) -> bool {
        match self {
            HunkKind::Change | HunkKind::Deletion | HunkKind::Addition => true,
            HunkKind::FileHeader | HunkKind::ModeChange => false,
        }
    }
}

/// The user's verdict on a hunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Decision {
    #[default]
    Undecided,
    Accept,
    Reject,
}

impl Decision {
    pub fn is_decided(self) -> bool {
        self != Decision::Undecided
    }
}

/// Classification of a single diff body line by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
    /// `\ No newline at end of file`
    NoNewline,
    Other,
}

impl LineKind {
    pub fn of(line: &str) -> Self {
        match line.as_bytes().first() {
            Some(b' ') => LineKind::Context,
            Some(b'+') => LineKind::Added,
            Some(b'-') => LineKind::Removed,
            Some(b'\\') => LineKind::NoNewline,
            _ => LineKind::Other,
        }
    }

    pub fn is_change(self) -> bool {
        matches!(self, LineKind::Added | LineKind::Removed)
    }
}

/// One logical change unit of a file diff.
///
/// `lines` is the authoritative diff text used for patches; `display` runs
/// parallel to it and only ever reaches the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub kind: HunkKind,
    pub lines: Vec<String>,
    pub display: Vec<String>,
    /// Parsed `@@` ranges; all zero for kinds without a range
    pub header: HunkHeader,
    pub decision: Decision,
    /// Text was replaced through a manual edit
    pub edited: bool,
}

impl Hunk {
    /// Build a hunk without an `@@` range (file header or mode change).
    pub fn preamble(kind: HunkKind, lines: Vec<String>, display: Vec<String>) -> Self {
        Hunk {
            kind,
            lines,
            display,
            header: HunkHeader::default(),
            decision: Decision::Undecided,
            edited: false,
        }
    }

    /// Build a hunk whose first line is an `@@` header.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidHunkHeader`] if the first line is missing
    /// or malformed.
    pub fn with_range(
        kind: HunkKind,
        lines: Vec<String>,
        display: Vec<String>,
    ) -> Result<Self, ParseError> {
        let first = lines.first().map(String::as_str).unwrap_or_default();
        let header = parse_hunk_header(first)?;
        Ok(Hunk {
            kind,
            lines,
            display,
            header,
            decision: Decision::Undecided,
            edited: false,
        })
    }

    /// Build a hunk from body lines, prepending a freshly written header.
    ///
    /// Counts are tallied from `body`; starts are taken as given.
    pub fn from_body(
        kind: HunkKind,
        old_start: u32,
        new_start: u32,
        body: &[String],
        display: &[String],
    ) -> Self {
        let (old_count, new_count) = tally(body);
        let header = HunkHeader {
            old_start,
            old_count,
            new_start,
            new_count,
        };
        let header_line = header.to_string();

        let mut lines = Vec::with_capacity(body.len() + 1);
        lines.push(header_line.clone());
        lines.extend_from_slice(body);

        let mut shown = Vec::with_capacity(display.len() + 1);
        shown.push(header_line);
        shown.extend_from_slice(display);

        Hunk {
            kind,
            lines,
            display: shown,
            header,
            decision: Decision::Undecided,
            edited: false,
        }
    }

    /// Lines after the `@@` header, or every line for kinds without one.
    pub fn body(&self) -> &[String] {
        if self.kind.has_range() && !self.lines.is_empty() {
            &self.lines[1..]
        } else {
            &self.lines
        }
    }

    /// Display lines after the `@@` header, parallel to [`Hunk::body`].
    pub fn display_body(&self) -> &[String] {
        if self.kind.has_range() && !self.display.is_empty() {
            &self.display[1..]
        } else {
            &self.display
        }
    }

    /// First added or removed line, used for one-line summaries.
    pub fn first_change(&self) -> Option<&str> {
        self.body()
            .iter()
            .find(|line| LineKind::of(line).is_change())
            .map(String::as_str)
    }
}

/// Count old-side (` `/`-`) and new-side (` `/`+`) lines.
pub fn tally(body: &[String]) -> (u32, u32) {
    body.iter()
        .fold((0, 0), |(old, new), line| match LineKind::of(line) {
            LineKind::Context => (old + 1, new + 1),
            LineKind::Removed => (old + 1, new),
            LineKind::Added => (old, new + 1),
            LineKind::NoNewline | LineKind::Other => (old, new),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    pub(crate) fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    pub(crate) fn change(text: &str) -> Hunk {
        let lines = lines(text);
        Hunk::with_range(HunkKind::Change, lines.clone(), lines).unwrap()
    }

    #[test]
    fn classify_lines() {
        assert_eq!(LineKind::of(" ctx"), LineKind::Context);
        assert_eq!(LineKind::of("+add"), LineKind::Added);
        assert_eq!(LineKind::of("-del"), LineKind::Removed);
        assert_eq!(
            LineKind::of("\\ No newline at end of file"),
            LineKind::NoNewline
        );
        assert_eq!(LineKind::of(""), LineKind::Other);
    }

    #[test]
    fn tally_counts_both_sides() {
        let body = lines(" a\n-b\n+c\n+d\n\\ No newline at end of file\n e");
        assert_eq!(tally(&body), (3, 4));
    }

    #[test]
    fn with_range_parses_header() {
        let hunk = change("@@ -3,2 +3,3 @@ fn f()\n a\n-b\n+c\n+d");
        assert_eq!(hunk.header.old_start, 3);
        assert_eq!(hunk.header.old_count, 2);
        assert_eq!(hunk.header.new_count, 3);
        assert_eq!(hunk.body().len(), 4);
        assert_eq!(hunk.decision, Decision::Undecided);
    }

    #[test]
    fn with_range_rejects_bad_header() {
        let text = lines("@@ broken\n+x");
        let result = Hunk::with_range(HunkKind::Change, text.clone(), text);
        assert!(matches!(result, Err(ParseError::InvalidHunkHeader { .. })));
    }

    #[test]
    fn from_body_writes_header() {
        let body = lines(" a\n+b\n c");
        let hunk = Hunk::from_body(HunkKind::Change, 7, 9, &body, &body);
        assert_eq!(hunk.lines[0], "@@ -7,2 +9,3 @@");
        assert_eq!(hunk.display[0], "@@ -7,2 +9,3 @@");
        assert_eq!(hunk.body(), body.as_slice());
    }

    #[test]
    fn preamble_body_is_everything() {
        let text = lines("old mode 100644\nnew mode 100755");
        let hunk = Hunk::preamble(HunkKind::ModeChange, text.clone(), text);
        assert_eq!(hunk.body().len(), 2);
        assert_eq!(hunk.first_change(), None);
    }

    #[test]
    fn first_change_skips_context() {
        let hunk = change("@@ -1,2 +1,2 @@\n a\n-b\n+c");
        assert_eq!(hunk.first_change(), Some("-b"));
    }
}
