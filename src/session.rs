//! The interactive hunk loop.
//!
//! [`HunkSelector::run`] walks the candidate files of a patch mode, asks
//! about each hunk and applies the accepted ones file by file. State that
//! outlives a single file (the global filter and auto-split) lives in
//! [`Session`].

use crate::command::Command;
use crate::diff::{Decision, FileDiff, Hunk, HunkKind, auto_split, split_at};
use crate::editor::{self, Editor, MAX_EDIT_ATTEMPTS};
use crate::filter::{self, Filter};
use crate::mode::PatchMode;
use crate::parse::parse_hunk_number;
use crate::patch::reassemble;
use crate::prompt;
use crate::repo::Repository;
use crate::status::pathspec_matches;
use crate::term::Terminal;
use crate::AddpError;
use tracing::{debug, info, warn};

/// Settings that carry over from one file to the next within a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Set by `G`; every file opened afterwards is filtered by it
    pub global_filter: Option<String>,
    /// Set by `S`; never cleared during a run
    pub auto_split: bool,
}

impl Session {
    /// Borrow the session together with its collaborators.
    pub fn selector<'a, R: Repository, T: Terminal>(
        &'a mut self,
        repo: &'a R,
        term: &'a mut T,
        editor: &'a dyn Editor,
    ) -> HunkSelector<'a, R, T> {
        HunkSelector {
            repo,
            term,
            editor,
            session: self,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every candidate file was visited
    Completed,
    /// The user quit; remaining files were left alone
    Aborted,
}

/// How the prompt loop for one file ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Continue,
    Quit,
    AcceptAll,
}

struct Selection {
    outcome: FileOutcome,
    hunks: Vec<Hunk>,
}

/// Drives the prompt loop against a repository, terminal and editor.
pub struct HunkSelector<'a, R, T> {
    repo: &'a R,
    term: &'a mut T,
    editor: &'a dyn Editor,
    session: &'a mut Session,
}

/// Mark every undecided hunk from `from` on.
fn decide_rest(hunks: &mut [Hunk], from: usize, decision: Decision) {
    for hunk in hunks.iter_mut().skip(from) {
        if !hunk.decision.is_decided() {
            hunk.decision = decision;
        }
    }
}

impl<R: Repository, T: Terminal> HunkSelector<'_, R, T> {
    /// Select hunks for every changed file matching `pathspecs` (all files
    /// when empty) and apply them using the mode called `mode_name`.
    ///
    /// # Errors
    ///
    /// Returns [`AddpError`] for an unknown mode, a failing terminal, or git
    /// failing to list files or produce a diff. Failed applies and bad user
    /// input are reported on the terminal instead.
    pub fn run(
        &mut self,
        mode_name: &str,
        revision: Option<&str>,
        pathspecs: &[String],
    ) -> Result<RunOutcome, AddpError> {
        let mode = PatchMode::lookup(mode_name).ok_or_else(|| AddpError::UnknownMode {
            name: mode_name.to_string(),
        })?;

        let files: Vec<String> = self
            .repo
            .modified_files(mode.filter, revision)?
            .into_iter()
            .filter(|status| status.is_patchable())
            .filter(|status| {
                pathspecs.is_empty() || pathspecs.iter().any(|p| pathspec_matches(p, &status.path))
            })
            .map(|status| status.path)
            .collect();
        debug!(mode = mode.name, files = files.len(), "candidate files");

        if files.is_empty() {
            self.term.println("No changes.")?;
            return Ok(RunOutcome::Completed);
        }

        let mut accept_all = false;
        for path in &files {
            if accept_all {
                self.accept_file(path, mode, revision)?;
                continue;
            }
            match self.patch_file(path, mode, revision)? {
                FileOutcome::Continue => {}
                FileOutcome::Quit => return Ok(RunOutcome::Aborted),
                FileOutcome::AcceptAll => accept_all = true,
            }
        }
        Ok(RunOutcome::Completed)
    }

    /// Parse a file's diff; a malformed diff skips the file.
    fn load(
        &mut self,
        path: &str,
        mode: &PatchMode,
        revision: Option<&str>,
    ) -> Result<Option<FileDiff>, AddpError> {
        let text = self.repo.diff_text(path, mode, revision)?;
        match FileDiff::parse(&text.plain, &text.color) {
            Ok(diff) => Ok(diff),
            Err(e) => {
                warn!(path, "skipping file: {e}");
                self.term.error(&format!("Skipping {path}: {e}"))?;
                Ok(None)
            }
        }
    }

    /// Auto-split and filter a freshly parsed hunk list per session state.
    fn prepare(&mut self, hunks: &[Hunk], announce: bool) -> Result<Vec<Hunk>, AddpError> {
        let mut hunks = hunks.to_vec();

        if self.session.auto_split {
            let before = hunks.len();
            hunks = auto_split(&hunks);
            if announce {
                let message = if hunks.len() > before {
                    format!(
                        "Auto-split enabled: expanded {before} hunks into {} smaller hunks",
                        hunks.len()
                    )
                } else {
                    format!(
                        "Auto-split enabled: {} hunks (no further splitting possible)",
                        hunks.len()
                    )
                };
                self.term.println(&message)?;
            }
        }

        if let Some(pattern) = &self.session.global_filter {
            let total = hunks.len();
            hunks = filter::filter_hunks(&hunks, pattern);
            if announce && !hunks.is_empty() {
                self.term.println(&format!(
                    "Applied global filter '{pattern}': showing {} of {total} hunks",
                    hunks.len()
                ))?;
            }
        }

        Ok(hunks)
    }

    fn patch_file(
        &mut self,
        path: &str,
        mode: &PatchMode,
        revision: Option<&str>,
    ) -> Result<FileOutcome, AddpError> {
        let Some(diff) = self.load(path, mode, revision)? else {
            return Ok(FileOutcome::Continue);
        };

        for line in &diff.header.display {
            self.term.println(line)?;
        }

        let hunks = self.prepare(&diff.hunks, true)?;
        if hunks.is_empty() {
            let pattern = self.session.global_filter.as_deref().unwrap_or_default();
            self.term.println(&format!(
                "No hunks in this file match global filter: {pattern}"
            ))?;
            return Ok(FileOutcome::Continue);
        }

        let selection = self.select(&diff, hunks, mode)?;
        self.apply_selected(&diff.header, &selection.hunks, mode)?;
        self.term.println("")?;
        Ok(selection.outcome)
    }

    /// Accept every hunk that survives auto-split and the global filter.
    fn accept_file(
        &mut self,
        path: &str,
        mode: &PatchMode,
        revision: Option<&str>,
    ) -> Result<(), AddpError> {
        let Some(diff) = self.load(path, mode, revision)? else {
            return Ok(());
        };

        let mut hunks = self.prepare(&diff.hunks, false)?;
        if hunks.is_empty() {
            debug!(path, "no hunks left after filtering");
            return Ok(());
        }
        decide_rest(&mut hunks, 0, Decision::Accept);
        self.term
            .println(&format!("Accepting {} hunks in {path}", hunks.len()))?;
        self.apply_selected(&diff.header, &hunks, mode)
    }

    /// Apply the accepted hunks, if any. A failed apply is reported only.
    fn apply_selected(
        &mut self,
        header: &Hunk,
        hunks: &[Hunk],
        mode: &PatchMode,
    ) -> Result<(), AddpError> {
        let accepted: Vec<&Hunk> = hunks
            .iter()
            .filter(|h| h.decision == Decision::Accept)
            .collect();
        if accepted.is_empty() {
            return Ok(());
        }

        let count = accepted.len();
        let patch = reassemble(header, accepted);
        match self.repo.apply_patch(&patch, mode) {
            Ok(()) => {
                info!(mode = mode.name, hunks = count, "applied patch");
                self.repo.refresh_index();
            }
            Err(e) => {
                warn!(mode = mode.name, "apply failed: {e}");
                self.term.error(&format!("Failed to apply patch: {e}"))?;
            }
        }
        Ok(())
    }

    /// Read an argument typed after a sub-prompt; `None` on end of input.
    fn ask(&mut self, question: &str) -> Result<Option<String>, AddpError> {
        self.term.print(question)?;
        Ok(self.term.read_line()?.map(|line| line.trim().to_string()))
    }

    fn ask_yes_no(&mut self, question: &str) -> Result<bool, AddpError> {
        loop {
            let Some(answer) = self.ask(question)? else {
                return Ok(false);
            };
            match answer.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => {}
            }
        }
    }

    /// The per-hunk prompt loop for one file.
    fn select(
        &mut self,
        diff: &FileDiff,
        mut hunks: Vec<Hunk>,
        mode: &PatchMode,
    ) -> Result<Selection, AddpError> {
        // Decided hunks are never shown again; every move lands on the next
        // undecided hunk at or after the cursor
        let mut ix = 0;

        loop {
            if ix >= hunks.len() {
                return Ok(Selection {
                    outcome: FileOutcome::Continue,
                    hunks,
                });
            }
            if hunks[ix].decision.is_decided() {
                ix += 1;
                continue;
            }

            let hunk = &hunks[ix];
            let question = format!(
                "{} {}",
                prompt::status(
                    ix,
                    hunks.len(),
                    self.session.global_filter.as_deref(),
                    self.session.auto_split
                ),
                prompt::prompt(mode, hunk.kind, &prompt::options(&hunks, ix))
            );
            for line in &hunk.display {
                self.term.println(line)?;
            }
            self.term.print(&question)?;

            let Some(input) = self.term.read_line()? else {
                // End of input quits
                decide_rest(&mut hunks, ix, Decision::Reject);
                return Ok(Selection {
                    outcome: FileOutcome::Quit,
                    hunks,
                });
            };
            let Some(command) = Command::parse(&input) else {
                continue;
            };
            debug!(?command, ix, "prompt answer");

            match command {
                Command::Accept => {
                    hunks[ix].decision = Decision::Accept;
                    ix += 1;
                }
                Command::Reject => {
                    hunks[ix].decision = Decision::Reject;
                    ix += 1;
                }
                Command::Quit => {
                    decide_rest(&mut hunks, ix, Decision::Reject);
                    return Ok(Selection {
                        outcome: FileOutcome::Quit,
                        hunks,
                    });
                }
                Command::AcceptRest => {
                    decide_rest(&mut hunks, ix, Decision::Accept);
                    return Ok(Selection {
                        outcome: FileOutcome::Continue,
                        hunks,
                    });
                }
                Command::RejectRest => {
                    decide_rest(&mut hunks, ix, Decision::Reject);
                    return Ok(Selection {
                        outcome: FileOutcome::Continue,
                        hunks,
                    });
                }
                Command::AcceptAll => {
                    decide_rest(&mut hunks, 0, Decision::Accept);
                    return Ok(Selection {
                        outcome: FileOutcome::AcceptAll,
                        hunks,
                    });
                }
                Command::Split => match split_at(&hunks, ix) {
                    Some(split) => {
                        self.term.println(&format!(
                            "Split into {} hunks.",
                            split.len() - hunks.len() + 1
                        ))?;
                        hunks = split;
                    }
                    None => self.term.error("Sorry, cannot split this hunk")?,
                },
                Command::AutoSplit => {
                    self.session.auto_split = true;
                    let before = hunks.len();
                    hunks = auto_split(&hunks);
                    ix = 0;
                    self.term.println(&format!(
                        "Auto-split enabled globally: expanded {before} hunks into {} smaller hunks",
                        hunks.len()
                    ))?;
                }
                Command::Edit => {
                    if hunks[ix].kind != HunkKind::Change {
                        self.term.error("Sorry, cannot edit this hunk")?;
                    } else if let Some(edited) = self.edit(&diff.header, &hunks[ix], mode)? {
                        hunks[ix] = edited;
                    }
                }
                Command::NextUndecided => {
                    ix = (ix + 1..hunks.len())
                        .find(|&i| !hunks[i].decision.is_decided())
                        .unwrap_or(hunks.len());
                }
                Command::PrevUndecided => {
                    ix = (0..ix)
                        .rev()
                        .find(|&i| !hunks[i].decision.is_decided())
                        .unwrap_or(0);
                }
                Command::Next => {
                    if ix + 1 < hunks.len() {
                        ix += 1;
                    } else {
                        self.term.error("No next hunk")?;
                    }
                }
                Command::Prev => {
                    if ix > 0 {
                        ix = (0..ix)
                            .rev()
                            .find(|&i| !hunks[i].decision.is_decided())
                            .unwrap_or(ix - 1);
                    } else {
                        self.term.error("No previous hunk")?;
                    }
                }
                Command::Goto(arg) => {
                    if let Some(target) = self.goto(&hunks, arg)? {
                        ix = target;
                    }
                }
                Command::Search(arg) => {
                    let pattern = match arg {
                        Some(pattern) => pattern,
                        None => self.ask("search for which pattern? ")?.unwrap_or_default(),
                    };
                    if pattern.is_empty() {
                        continue;
                    }
                    match Filter::new(&pattern) {
                        Ok(filter) => match filter::search(&hunks, ix, &filter) {
                            Some(found) => {
                                ix = found;
                            }
                            None => self.term.error(&format!("Pattern not found: {pattern}"))?,
                        },
                        Err(e) => self.term.error(&e.to_string())?,
                    }
                }
                Command::GlobalFilter(arg) => {
                    let pattern = match arg {
                        Some(pattern) => pattern,
                        None => match self
                            .ask("search for which pattern (empty to clear global filter)? ")?
                        {
                            Some(pattern) => pattern,
                            None => continue,
                        },
                    };

                    if pattern.is_empty() {
                        self.session.global_filter = None;
                        hunks = if self.session.auto_split {
                            auto_split(&diff.hunks)
                        } else {
                            diff.hunks.clone()
                        };
                        ix = 0;
                        self.term.println("Global filter cleared")?;
                        continue;
                    }

                    match Filter::new(&pattern) {
                        Ok(filter) => {
                            hunks = filter.apply(&hunks);
                            ix = 0;
                            if hunks.is_empty() {
                                self.term.error(&format!(
                                    "No hunks in current file match pattern: {pattern}"
                                ))?;
                            } else {
                                self.term.println(&format!(
                                    "Global filter set to '{pattern}': showing {} hunks in current file",
                                    hunks.len()
                                ))?;
                            }
                            self.session.global_filter = Some(pattern);
                        }
                        Err(e) => self.term.error(&e.to_string())?,
                    }
                }
                Command::Help => self.term.println(&prompt::help(mode))?,
                Command::Unknown(_) => self.term.println(&prompt::mode_help(mode))?,
            }
        }
    }

    /// Handle `g`: list hunks, read a number, validate it.
    fn goto(&mut self, hunks: &[Hunk], arg: Option<String>) -> Result<Option<usize>, AddpError> {
        let answer = match arg {
            Some(answer) => answer,
            None => {
                for line in prompt::listing(hunks) {
                    self.term.println(&line)?;
                }
                match self.ask("go to which hunk? ")? {
                    Some(answer) if !answer.is_empty() => answer,
                    _ => return Ok(None),
                }
            }
        };

        match parse_hunk_number(&answer) {
            Ok(n) if n.get() <= hunks.len() => Ok(Some(n.get() - 1)),
            Ok(_) => {
                self.term.error(&format!(
                    "Sorry, only {} hunks available.",
                    hunks.len()
                ))?;
                Ok(None)
            }
            Err(e) => {
                self.term.error(&e.to_string())?;
                Ok(None)
            }
        }
    }

    /// Edit a hunk until it applies, the user gives up, or attempts run out.
    ///
    /// Returns the accepted replacement, or `None` to keep the original.
    fn edit(
        &mut self,
        header: &Hunk,
        hunk: &Hunk,
        mode: &PatchMode,
    ) -> Result<Option<Hunk>, AddpError> {
        let scratch = self.repo.scratch_dir();

        for attempt in 1..=MAX_EDIT_ATTEMPTS {
            let edited = match editor::edit_hunk(self.editor, &scratch, hunk, mode.reverse) {
                Ok(Some(edited)) => edited,
                Ok(None) => {
                    self.term.error("Edit was aborted.")?;
                    return Ok(None);
                }
                Err(e) => {
                    warn!("edit failed: {e}");
                    self.term.error(&format!("Error editing hunk: {e}"))?;
                    return Ok(None);
                }
            };

            match self.repo.check_patch(&reassemble(header, [&edited]), mode) {
                Ok(()) => return Ok(Some(edited)),
                Err(e) => {
                    debug!(attempt, "edited hunk does not apply: {e}");
                    let again = self.ask_yes_no(
                        "Your edited hunk does not apply. Edit again (saying \"no\" discards!) [y/n]? ",
                    )?;
                    if !again {
                        return Ok(None);
                    }
                }
            }
        }

        self.term
            .error("Too many failed edits, keeping the original hunk.")?;
        Ok(None)
    }
}
