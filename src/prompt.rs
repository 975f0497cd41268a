//! Prompt and help text for the hunk loop.

use crate::diff::{Decision, Hunk, HunkKind, is_splittable};
use crate::mode::PatchMode;

/// Help lines for the extension commands, shown after the mode's own lines.
const EXTENSION_HELP: &str = "\
j - leave this hunk undecided, see next undecided hunk
J - leave this hunk undecided, see next hunk
k - leave this hunk undecided, see previous undecided hunk
K - leave this hunk undecided, see previous hunk
g - select a hunk to go to
/ - search for a hunk matching the given regex
G - set global filter for all files (empty pattern clears filter)
A - accept all hunks (after auto-splitting and filtering)
s - split the current hunk into smaller hunks
S - enable auto-splitting globally and split all hunks
e - manually edit the current hunk
? - print help";

fn object(kind: HunkKind) -> &'static str {
    match kind {
        HunkKind::Change | HunkKind::FileHeader => "this hunk",
        HunkKind::ModeChange => "mode change",
        HunkKind::Deletion => "deletion",
        HunkKind::Addition => "addition",
    }
}

/// The question asked for a hunk, e.g. `Stage this hunk [y,n,q,a,d,j,?]? `.
///
/// `options` is the output of [`options`], appended after `d`.
pub fn prompt(mode: &PatchMode, kind: HunkKind, options: &str) -> String {
    format!(
        "{} {}{} [y,n,q,a,d{options},?]? ",
        mode.verb,
        object(kind),
        mode.target
    )
}

/// The five mode-specific help lines.
pub fn mode_help(mode: &PatchMode) -> String {
    let verb = mode.verb.to_lowercase();
    let target = mode.target;
    format!(
        "y - {verb} this hunk{target}
n - do not {verb} this hunk{target}
q - quit; do not {verb} this hunk or any of the remaining ones
a - {verb} this hunk and all later hunks in the file
d - do not {verb} this hunk or any of the later hunks in the file"
    )
}

/// Full help for `?`.
pub fn help(mode: &PatchMode) -> String {
    format!("{}\n{EXTENSION_HELP}", mode_help(mode))
}

/// Extra command letters that currently apply, each prefixed by a comma.
pub fn options(hunks: &[Hunk], ix: usize) -> String {
    let Some(hunk) = hunks.get(ix) else {
        return String::new();
    };
    let undecided = |h: &Hunk| h.decision == Decision::Undecided;

    let mut opts = Vec::new();
    if ix > 0 {
        opts.push("K");
    }
    if ix + 1 < hunks.len() {
        opts.push("J");
    }
    if hunks[..ix].iter().any(undecided) {
        opts.push("k");
    }
    if hunks[ix + 1..].iter().any(undecided) {
        opts.push("j");
    }
    if hunks.len() > 1 {
        opts.push("g");
        opts.push("/");
    }
    opts.push("G");
    opts.push("A");
    if is_splittable(hunk) {
        opts.push("s");
    }
    opts.push("S");
    if hunk.kind == HunkKind::Change {
        opts.push("e");
    }

    opts.iter().map(|o| format!(",{o}")).collect()
}

/// `(ix/len)` position plus active session markers.
pub fn status(ix: usize, len: usize, filter: Option<&str>, auto_split: bool) -> String {
    let mut status = format!("({}/{len})", ix + 1);
    if let Some(pattern) = filter {
        status.push_str(&format!(" [filter: {pattern}]"));
    }
    if auto_split {
        status.push_str(" [auto-split]");
    }
    status
}

/// One line per hunk for the `g` listing: number, header, first change.
pub fn listing(hunks: &[Hunk]) -> Vec<String> {
    hunks
        .iter()
        .enumerate()
        .map(|(i, hunk)| {
            let header = hunk.lines.first().map(String::as_str).unwrap_or_default();
            match hunk.first_change() {
                Some(change) if hunk.kind.has_range() => format!("{:>3}: {header} {change}", i + 1),
                _ => format!("{:>3}: {header}", i + 1),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::hunk::tests::change;
    use crate::mode::MODES;
    use similar_asserts::assert_eq;

    fn mode(name: &str) -> &'static PatchMode {
        PatchMode::lookup(name).unwrap()
    }

    #[test]
    fn prompt_per_mode_and_kind() {
        assert_eq!(
            prompt(mode("stage"), HunkKind::Change, ""),
            "Stage this hunk [y,n,q,a,d,?]? "
        );
        assert_eq!(
            prompt(mode("reset_head"), HunkKind::ModeChange, ",j"),
            "Unstage mode change [y,n,q,a,d,j,?]? "
        );
        assert_eq!(
            prompt(mode("checkout_head"), HunkKind::Deletion, ""),
            "Discard deletion from index and worktree [y,n,q,a,d,?]? "
        );
        assert_eq!(
            prompt(mode("worktree_nothead"), HunkKind::Addition, ""),
            "Apply addition to worktree [y,n,q,a,d,?]? "
        );
        assert_eq!(
            prompt(mode("stash"), HunkKind::Change, ""),
            "Stash this hunk [y,n,q,a,d,?]? "
        );
    }

    #[test]
    fn every_mode_prompt_has_its_verb() {
        for m in &MODES {
            for kind in [
                HunkKind::Change,
                HunkKind::ModeChange,
                HunkKind::Deletion,
                HunkKind::Addition,
            ] {
                let text = prompt(m, kind, "");
                assert!(text.starts_with(m.verb), "{text}");
                assert!(text.ends_with("[y,n,q,a,d,?]? "), "{text}");
            }
        }
    }

    #[test]
    fn help_for_checkout_index() {
        insta::assert_snapshot!(help(mode("checkout_index")), @r"
        y - discard this hunk from worktree
        n - do not discard this hunk from worktree
        q - quit; do not discard this hunk or any of the remaining ones
        a - discard this hunk and all later hunks in the file
        d - do not discard this hunk or any of the later hunks in the file
        j - leave this hunk undecided, see next undecided hunk
        J - leave this hunk undecided, see next hunk
        k - leave this hunk undecided, see previous undecided hunk
        K - leave this hunk undecided, see previous hunk
        g - select a hunk to go to
        / - search for a hunk matching the given regex
        G - set global filter for all files (empty pattern clears filter)
        A - accept all hunks (after auto-splitting and filtering)
        s - split the current hunk into smaller hunks
        S - enable auto-splitting globally and split all hunks
        e - manually edit the current hunk
        ? - print help
        ");
    }

    #[test]
    fn mode_help_for_stage() {
        insta::assert_snapshot!(mode_help(mode("stage")), @r"
        y - stage this hunk
        n - do not stage this hunk
        q - quit; do not stage this hunk or any of the remaining ones
        a - stage this hunk and all later hunks in the file
        d - do not stage this hunk or any of the later hunks in the file
        ");
    }

    #[test]
    fn options_track_position_and_decisions() {
        let splittable = change("@@ -1,3 +1,5 @@\n a\n+b\n c\n+d\n e");
        let plain = change("@@ -9 +11,2 @@\n x\n+y");
        let mut hunks = vec![plain.clone(), splittable, plain];

        assert_eq!(options(&hunks, 0), ",J,j,g,/,G,A,S,e");
        assert_eq!(options(&hunks, 1), ",K,J,k,j,g,/,G,A,s,S,e");

        hunks[0].decision = Decision::Accept;
        assert_eq!(options(&hunks, 2), ",K,k,g,/,G,A,S,e");

        let single = vec![change("@@ -1 +1 @@\n-a\n+b")];
        assert_eq!(options(&single, 0), ",G,A,S,e");
    }

    #[test]
    fn options_omit_edit_for_pseudo_hunks() {
        let mut hunk = change("@@ -1 +1 @@\n-a\n+b");
        hunk.kind = HunkKind::Addition;
        assert_eq!(options(&[hunk], 0), ",G,A,S");
    }

    #[test]
    fn status_markers() {
        assert_eq!(status(0, 3, None, false), "(1/3)");
        assert_eq!(
            status(1, 4, Some("foo"), true),
            "(2/4) [filter: foo] [auto-split]"
        );
    }

    #[test]
    fn listing_shows_first_change() {
        let hunks = vec![
            change("@@ -1,2 +1,3 @@\n a\n+added\n b"),
            change("@@ -10 +11 @@\n-old\n+new"),
        ];
        assert_eq!(
            listing(&hunks),
            vec![
                "  1: @@ -1,2 +1,3 @@ +added".to_string(),
                "  2: @@ -10 +11 @@ -old".to_string(),
            ]
        );
    }
}
