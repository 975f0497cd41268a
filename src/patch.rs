use crate::diff::Hunk;

/// Build an applyable patch from a file header and the chosen hunks.
///
/// The header's `---`/`+++` lines are held back and emitted once, right
/// before the first hunk that carries an `@@` range, so pseudo-hunks such as
/// mode changes stay inside the extended header. The result ends with a
/// single newline.
///
/// Callers skip applying when no hunk was chosen; a header-only patch is
/// still produced here.
pub fn reassemble<'a>(header: &Hunk, hunks: impl IntoIterator<Item = &'a Hunk>) -> Vec<u8> {
    let is_file_line = |line: &&String| line.starts_with("---") || line.starts_with("+++");

    let mut lines: Vec<&str> = header
        .lines
        .iter()
        .filter(|line| !is_file_line(line))
        .map(String::as_str)
        .collect();

    let mut file_lines_added = false;
    for hunk in hunks {
        if hunk.kind.has_range() && !file_lines_added {
            lines.extend(header.lines.iter().filter(is_file_line).map(String::as_str));
            file_lines_added = true;
        }
        lines.extend(hunk.lines.iter().map(String::as_str));
    }

    let mut patch = lines.join("\n");
    patch.push('\n');
    patch.into_bytes()
}
