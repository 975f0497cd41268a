//! Splitting hunks at context lines that separate independent changes.
//!
//! A split always happens at the *first* eligible context line, so a hunk
//! with `n` change blocks needs `n - 1` splits to be fully decomposed.
//! [`auto_split`] repeats the process over a whole list.

use super::hunk::{Hunk, HunkKind, LineKind};
use tracing::debug;

/// Upper bound on [`auto_split`] passes.
pub const AUTO_SPLIT_MAX_ROUNDS: usize = 10;

/// Index into [`Hunk::body`] of the context line to split at.
///
/// That is the first context line which follows some change and is itself
/// followed by another change. `\` lines are never split points.
pub fn split_point(hunk: &Hunk) -> Option<usize> {
    if hunk.kind != HunkKind::Change || hunk.edited {
        return None;
    }

    let body = hunk.body();
    let first_change = body.iter().position(|l| LineKind::of(l).is_change())?;
    let last_change = body.iter().rposition(|l| LineKind::of(l).is_change())?;

    (first_change + 1..last_change).find(|&i| LineKind::of(&body[i]) == LineKind::Context)
}

pub fn is_splittable(hunk: &Hunk) -> bool {
    split_point(hunk).is_some()
}

/// Split a hunk in two at its first split point.
///
/// Both halves share the split context line, so each applies on its own.
/// A hunk that cannot be split comes back unchanged as the only element.
pub fn split(hunk: &Hunk) -> Vec<Hunk> {
    let Some(p) = split_point(hunk) else {
        return vec![hunk.clone()];
    };

    let body = hunk.body();
    let display = hunk.display_body();

    let left = Hunk::from_body(
        hunk.kind,
        hunk.header.old_start,
        hunk.header.new_start,
        &body[..=p],
        &display[..=p],
    );
    // The shared context line is counted on both sides
    let right = Hunk::from_body(
        hunk.kind,
        hunk.header.old_start + left.header.old_count - 1,
        hunk.header.new_start + left.header.new_count - 1,
        &body[p..],
        &display[p..],
    );

    vec![left, right]
}

/// Replace the hunk at `ix` with its two halves.
///
/// Returns the new list, or `None` if that hunk cannot be split.
pub fn split_at(hunks: &[Hunk], ix: usize) -> Option<Vec<Hunk>> {
    let target = hunks.get(ix)?;
    if !is_splittable(target) {
        return None;
    }

    let mut result = Vec::with_capacity(hunks.len() + 1);
    result.extend_from_slice(&hunks[..ix]);
    result.extend(split(target));
    result.extend_from_slice(&hunks[ix + 1..]);
    Some(result)
}

/// Split every hunk repeatedly until nothing changes.
///
/// Stops early after [`AUTO_SPLIT_MAX_ROUNDS`] passes.
pub fn auto_split(hunks: &[Hunk]) -> Vec<Hunk> {
    let mut current = hunks.to_vec();

    for round in 1..=AUTO_SPLIT_MAX_ROUNDS {
        let before = current.len();
        current = current.iter().flat_map(split).collect();
        if current.len() == before {
            break;
        }
        debug!(round, before, after = current.len(), "auto-split pass");
    }

    current
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::hunk::Decision;
    use crate::diff::hunk::tests::{change, lines};
    use similar_asserts::assert_eq;

    const TWO_BLOCKS: &str = "@@ -1,7 +1,9 @@
 one
+added foo
 two
 three
 four
 five
 six
+added bar
 seven";

    #[test]
    fn split_point_is_first_context_between_changes() {
        assert_eq!(split_point(&change(TWO_BLOCKS)), Some(2));
    }

    #[test]
    fn split_two_blocks() {
        let parts = split(&change(TWO_BLOCKS));
        assert_eq!(parts.len(), 2);

        assert_eq!(
            parts[0].lines,
            lines("@@ -1,2 +1,3 @@\n one\n+added foo\n two")
        );
        assert_eq!(
            parts[1].lines,
            lines("@@ -2,6 +3,7 @@\n two\n three\n four\n five\n six\n+added bar\n seven")
        );
        assert_eq!(parts[1].header.old_start, 2);
        assert_eq!(parts[1].header.new_start, 3);
    }

    #[test]
    fn split_keeps_display_parallel() {
        let mut hunk = change(TWO_BLOCKS);
        hunk.display = hunk.lines.iter().map(|l| format!("<{l}>")).collect();
        let parts = split(&hunk);
        assert_eq!(parts[0].display[0], "@@ -1,2 +1,3 @@");
        assert_eq!(parts[0].display[2], "<+added foo>");
        assert_eq!(parts[1].display[1], "< two>");
        assert_eq!(parts[1].display.len(), parts[1].lines.len());
    }

    #[test]
    fn split_resets_decision() {
        let mut hunk = change(TWO_BLOCKS);
        hunk.decision = Decision::Accept;
        assert!(
            split(&hunk)
                .iter()
                .all(|h| h.decision == Decision::Undecided)
        );
    }

    #[test]
    fn single_block_is_not_splittable() {
        let hunk = change("@@ -1,3 +1,4 @@\n a\n-b\n+c\n+d\n e");
        assert!(!is_splittable(&hunk));
        assert_eq!(split(&hunk), vec![hunk]);
    }

    #[test]
    fn adjacent_changes_are_not_splittable() {
        let hunk = change("@@ -1,2 +1,2 @@\n-a\n+b\n-c\n+d");
        assert!(!is_splittable(&hunk));
    }

    #[test]
    fn no_newline_marker_is_not_a_split_point() {
        let hunk = change(
            "@@ -1,2 +1,3 @@\n-a\n\\ No newline at end of file\n+a\n+b\n c",
        );
        assert!(!is_splittable(&hunk));

        let hunk = change(
            "@@ -1,3 +1,3 @@\n-a\n\\ No newline at end of file\n+a\n mid\n-x\n+y",
        );
        assert_eq!(split_point(&hunk), Some(3));
        let parts = split(&hunk);
        assert_eq!(
            parts[0].lines,
            lines("@@ -1,2 +1,2 @@\n-a\n\\ No newline at end of file\n+a\n mid")
        );
        assert_eq!(parts[1].lines, lines("@@ -2,2 +2,2 @@\n mid\n-x\n+y"));
    }

    #[test]
    fn only_change_hunks_split() {
        let mut hunk = change(TWO_BLOCKS);
        hunk.kind = HunkKind::Deletion;
        assert!(!is_splittable(&hunk));

        let mut hunk = change(TWO_BLOCKS);
        hunk.edited = true;
        assert!(!is_splittable(&hunk));
    }

    #[test]
    fn three_blocks_split_first_gap_only() {
        let hunk = change("@@ -1,5 +1,8 @@\n a\n+x\n b\n+y\n c\n+z\n d\n e");
        let parts = split(&hunk);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].lines, lines("@@ -1,2 +1,3 @@\n a\n+x\n b"));
        assert!(is_splittable(&parts[1]));
    }

    #[test]
    fn split_at_replaces_in_place() {
        let other = change("@@ -40 +42 @@\n-p\n+q");
        let hunks = vec![other.clone(), change(TWO_BLOCKS), other.clone()];

        let result = split_at(&hunks, 1).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result[0], other);
        assert_eq!(result[1].lines[0], "@@ -1,2 +1,3 @@");
        assert_eq!(result[2].lines[0], "@@ -2,6 +3,7 @@");
        assert_eq!(result[3], other);

        assert_eq!(split_at(&hunks, 0), None);
        assert_eq!(split_at(&hunks, 9), None);
    }

    #[test]
    fn auto_split_fully_decomposes() {
        let hunk = change("@@ -1,5 +1,8 @@\n a\n+x\n b\n+y\n c\n+z\n d\n e");
        let result = auto_split(&[hunk]);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].lines, lines("@@ -1,2 +1,3 @@\n a\n+x\n b"));
        assert_eq!(result[1].lines, lines("@@ -2,2 +3,3 @@\n b\n+y\n c"));
        assert_eq!(result[2].lines, lines("@@ -3,3 +5,4 @@\n c\n+z\n d\n e"));
    }
}
