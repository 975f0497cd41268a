use super::hunk::{Hunk, HunkKind};
use crate::parse::ParseError;
use tracing::debug;

/// A parsed diff for a single file: its preamble plus the selectable hunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// The `FileHeader` pseudo-hunk
    pub header: Hunk,
    /// Mode change and `@@` hunks, in diff order
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// Parse one file's diff text.
    ///
    /// Returns `Ok(None)` when there is nothing to select: empty diff text or
    /// a preamble without any hunk.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if a hunk header is malformed.
    pub fn parse(plain: &[String], color: &[String]) -> Result<Option<Self>, ParseError> {
        let mut hunks = parse_hunks(plain, color)?.into_iter();
        let Some(header) = hunks.next() else {
            return Ok(None);
        };
        let hunks: Vec<Hunk> = hunks.collect();
        if hunks.is_empty() {
            return Ok(None);
        }
        Ok(Some(FileDiff { header, hunks }))
    }
}

/// Split a file's diff into hunks.
///
/// The first element is always the `FileHeader` holding every line before
/// the first `@@ ` line. `old mode`/`new mode` lines are moved out of it into
/// a `ModeChange` hunk right after it. Every line beginning with `@@ ` starts
/// a new hunk, whose kind is `Deletion`/`Addition` for whole-file removals
/// and creations and `Change` otherwise.
///
/// `color` supplies display lines; when it is empty or does not line up
/// with `plain`, the plain text is displayed instead.
///
/// # Errors
///
/// Returns [`ParseError::InvalidHunkHeader`] for a malformed `@@` line.
pub fn parse_hunks(plain: &[String], color: &[String]) -> Result<Vec<Hunk>, ParseError> {
    if plain.is_empty() {
        return Ok(Vec::new());
    }

    let color = if color.len() == plain.len() {
        color
    } else {
        if !color.is_empty() {
            debug!(
                plain = plain.len(),
                color = color.len(),
                "colored diff does not line up, displaying plain text"
            );
        }
        plain
    };

    let preamble_len = plain
        .iter()
        .position(|line| line.starts_with("@@ "))
        .unwrap_or(plain.len());

    let (header_lines, header_display, mode_lines, mode_display) =
        split_mode_lines(&plain[..preamble_len], &color[..preamble_len]);

    let kind = change_kind(&header_lines);
    let mut hunks = vec![Hunk::preamble(
        HunkKind::FileHeader,
        header_lines,
        header_display,
    )];
    if !mode_lines.is_empty() {
        hunks.push(Hunk::preamble(HunkKind::ModeChange, mode_lines, mode_display));
    }

    let mut start = preamble_len;
    while start < plain.len() {
        let end = plain[start + 1..]
            .iter()
            .position(|line| line.starts_with("@@ "))
            .map_or(plain.len(), |offset| start + 1 + offset);

        hunks.push(Hunk::with_range(
            kind,
            plain[start..end].to_vec(),
            color[start..end].to_vec(),
        )?);
        start = end;
    }

    debug!(hunks = hunks.len() - 1, "parsed file diff");
    Ok(hunks)
}

/// Separate `old mode`/`new mode` lines from the rest of the preamble.
fn split_mode_lines(
    plain: &[String],
    color: &[String],
) -> (Vec<String>, Vec<String>, Vec<String>, Vec<String>) {
    let mut header = (Vec::new(), Vec::new());
    let mut mode = (Vec::new(), Vec::new());

    for (line, shown) in plain.iter().zip(color) {
        let target = if line.starts_with("old mode ") || line.starts_with("new mode ") {
            &mut mode
        } else {
            &mut header
        };
        target.0.push(line.clone());
        target.1.push(shown.clone());
    }

    (header.0, header.1, mode.0, mode.1)
}

/// Kind of the `@@` hunks given the file's preamble.
fn change_kind(preamble: &[String]) -> HunkKind {
    if preamble
        .iter()
        .any(|line| line.starts_with("deleted file mode "))
    {
        HunkKind::Deletion
    } else if preamble.iter().any(|line| line.starts_with("new file mode ")) {
        HunkKind::Addition
    } else {
        HunkKind::Change
    }
}
