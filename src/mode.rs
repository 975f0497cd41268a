//! The fixed table of patch modes and how CLI flags pick one.
//!
//! A mode bundles the git plumbing used to produce the diff, to apply the
//! selected hunks and to dry-run an edited hunk, plus the wording shown at
//! the prompt.

use clap::ValueEnum;

/// Which side of the status a mode lists files from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Files with unstaged changes
    FileOnly,
    /// Files with staged changes
    IndexOnly,
}

/// One of the nine patch modes.
#[derive(Debug, PartialEq, Eq)]
pub struct PatchMode {
    pub name: &'static str,
    /// Diff plumbing command and its flags
    pub diff: &'static [&'static str],
    pub apply: &'static [&'static str],
    /// Same as `apply` with `--check`
    pub check: &'static [&'static str],
    pub filter: Option<StatusFilter>,
    /// Patch is applied with `-R`
    pub reverse: bool,
    /// Capitalized action word for prompts
    pub verb: &'static str,
    /// Where the action lands, e.g. `" to index"`
    pub target: &'static str,
}

pub static MODES: [PatchMode; 9] = [
    PatchMode {
        name: "stage",
        diff: &["diff-files", "-p"],
        apply: &["apply", "--cached"],
        check: &["apply", "--cached", "--check"],
        filter: Some(StatusFilter::FileOnly),
        reverse: false,
        verb: "Stage",
        target: "",
    },
    PatchMode {
        name: "stash",
        diff: &["diff-index", "-p", "HEAD"],
        apply: &["apply", "--cached"],
        check: &["apply", "--cached", "--check"],
        filter: None,
        reverse: false,
        verb: "Stash",
        target: "",
    },
    PatchMode {
        name: "reset_head",
        diff: &["diff-index", "-p", "--cached"],
        apply: &["apply", "-R", "--cached"],
        check: &["apply", "-R", "--cached", "--check"],
        filter: Some(StatusFilter::IndexOnly),
        reverse: true,
        verb: "Unstage",
        target: "",
    },
    PatchMode {
        name: "reset_nothead",
        diff: &["diff-index", "-R", "-p", "--cached"],
        apply: &["apply", "--cached"],
        check: &["apply", "--cached", "--check"],
        filter: Some(StatusFilter::IndexOnly),
        reverse: false,
        verb: "Apply",
        target: " to index",
    },
    PatchMode {
        name: "checkout_index",
        diff: &["diff-files", "-p"],
        apply: &["apply", "-R"],
        check: &["apply", "-R", "--check"],
        filter: Some(StatusFilter::FileOnly),
        reverse: true,
        verb: "Discard",
        target: " from worktree",
    },
    PatchMode {
        name: "checkout_head",
        diff: &["diff-index", "-p"],
        apply: &["apply", "-R"],
        check: &["apply", "-R", "--check"],
        filter: None,
        reverse: true,
        verb: "Discard",
        target: " from index and worktree",
    },
    PatchMode {
        name: "checkout_nothead",
        diff: &["diff-index", "-R", "-p"],
        apply: &["apply"],
        check: &["apply", "--check"],
        filter: None,
        reverse: false,
        verb: "Apply",
        target: " to index and worktree",
    },
    PatchMode {
        name: "worktree_head",
        diff: &["diff-index", "-p"],
        apply: &["apply", "-R"],
        check: &["apply", "-R", "--check"],
        filter: None,
        reverse: true,
        verb: "Discard",
        target: " from worktree",
    },
    PatchMode {
        name: "worktree_nothead",
        diff: &["diff-index", "-R", "-p"],
        apply: &["apply"],
        check: &["apply", "--check"],
        filter: None,
        reverse: false,
        verb: "Apply",
        target: " to worktree",
    },
];

impl PatchMode {
    pub fn lookup(name: &str) -> Option<&'static PatchMode> {
        MODES.iter().find(|mode| mode.name == name)
    }
}

/// The user-facing command family a mode is picked from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Flavor {
    /// Stage worktree changes into the index
    #[default]
    Stage,
    /// Pick changes for a stash
    Stash,
    /// Unstage index changes
    Reset,
    /// Discard changes from the worktree (and index, against a revision)
    Checkout,
    /// Discard changes from the worktree only
    Worktree,
}

/// Pick the patch mode for a flavor and optional `--source` revision.
///
/// Returns the mode name together with the revision to diff against, if any.
pub fn resolve(flavor: Flavor, revision: Option<&str>) -> (&'static str, Option<String>) {
    let is_head = revision == Some("HEAD");
    match flavor {
        Flavor::Stage => ("stage", None),
        Flavor::Stash => ("stash", None),
        Flavor::Reset => match revision {
            None => ("reset_head", Some("HEAD".to_string())),
            Some(_) if is_head => ("reset_head", Some("HEAD".to_string())),
            Some(rev) => ("reset_nothead", Some(rev.to_string())),
        },
        Flavor::Checkout => match revision {
            None => ("checkout_index", None),
            Some(_) if is_head => ("checkout_head", Some("HEAD".to_string())),
            Some(rev) => ("checkout_nothead", Some(rev.to_string())),
        },
        Flavor::Worktree => match revision {
            None => ("checkout_index", None),
            Some(_) if is_head => ("worktree_head", Some("HEAD".to_string())),
            Some(rev) => ("worktree_nothead", Some(rev.to_string())),
        },
    }
}
