//! Access to the repository: diff text, file status and patch application.

use crate::GitCommandError;
use crate::config::Config;
use crate::mode::{PatchMode, StatusFilter};
use crate::status::{self, FileStatus};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Plain diff lines plus their colored rendering, which may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffText {
    pub plain: Vec<String>,
    pub color: Vec<String>,
}

/// Operations the hunk loop needs from the repository.
pub trait Repository {
    /// Files with changes on the side `filter` selects, relative to `revision`
    /// (HEAD when `None`).
    fn modified_files(
        &self,
        filter: Option<StatusFilter>,
        revision: Option<&str>,
    ) -> Result<Vec<FileStatus>, GitCommandError>;

    /// The diff for one path as the mode produces it.
    fn diff_text(
        &self,
        path: &str,
        mode: &PatchMode,
        revision: Option<&str>,
    ) -> Result<DiffText, GitCommandError>;

    fn apply_patch(&self, patch: &[u8], mode: &PatchMode) -> Result<(), GitCommandError>;

    /// Dry-run of [`Repository::apply_patch`].
    fn check_patch(&self, patch: &[u8], mode: &PatchMode) -> Result<(), GitCommandError>;

    /// Refresh stat information in the index. Failures are ignored.
    fn refresh_index(&self);

    /// Directory for transient files such as the hunk edit buffer.
    fn scratch_dir(&self) -> PathBuf;
}

/// [`Repository`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitRepository {
    work_tree: PathBuf,
    git_dir: PathBuf,
    config: Config,
}

impl GitRepository {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GitCommandError`] if `path` is not inside a git work tree.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitCommandError> {
        let path = path.as_ref();
        let probe = |flag: &str| -> Result<PathBuf, GitCommandError> {
            let output = run_git(
                Command::new("git").arg("-C").arg(path),
                &["rev-parse", flag],
            )?;
            Ok(PathBuf::from(output.trim_end()))
        };

        let mut repo = GitRepository {
            work_tree: probe("--show-toplevel")?,
            git_dir: probe("--absolute-git-dir")?,
            config: Config::default(),
        };
        repo.config = Config::load(&repo);
        debug!(work_tree = %repo.work_tree.display(), config = ?repo.config, "opened repository");
        Ok(repo)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn command(&self) -> Command {
        let mut command = Command::new("git");
        command.arg("-C").arg(&self.work_tree);
        command
    }

    /// Run git with `args` and return its stdout.
    ///
    /// # Errors
    ///
    /// Returns [`GitCommandError`] if git cannot run or exits non-zero.
    pub fn git(&self, args: &[&str]) -> Result<String, GitCommandError> {
        run_git(&mut self.command(), args)
    }

    fn git_lines(&self, args: &[&str]) -> Result<Vec<String>, GitCommandError> {
        Ok(self.git(args)?.lines().map(str::to_string).collect())
    }

    /// Run git with `input` on stdin.
    fn git_with_stdin(&self, args: &[&str], input: &[u8]) -> Result<(), GitCommandError> {
        let name = args.first().copied().unwrap_or_default().to_string();

        let mut child = self
            .command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GitCommandError::SpawnFailed {
                command: name.clone(),
                message: e.to_string(),
            })?;

        child
            .stdin
            .take()
            .ok_or_else(|| GitCommandError::StdinFailed {
                command: name.clone(),
            })?
            .write_all(input)
            .map_err(|e| GitCommandError::WriteFailed {
                command: name.clone(),
                message: e.to_string(),
            })?;

        let output = child
            .wait_with_output()
            .map_err(|e| GitCommandError::WaitFailed {
                command: name.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GitCommandError::ExitError {
                command: name,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        Ok(())
    }

    fn is_unborn(&self) -> bool {
        self.git(&["rev-parse", "--verify", "--quiet", "HEAD"]).is_err()
    }

    /// What to diff against for `revision`; `HEAD` of an unborn branch is the
    /// empty tree.
    fn reference(&self, revision: &str) -> Result<String, GitCommandError> {
        if revision == "HEAD" && self.is_unborn() {
            let tree = self.git(&["hash-object", "-t", "tree", "/dev/null"])?;
            return Ok(tree.trim().to_string());
        }
        Ok(revision.to_string())
    }
}

fn run_git(command: &mut Command, args: &[&str]) -> Result<String, GitCommandError> {
    let name = args.first().copied().unwrap_or_default().to_string();

    let output = command
        .args(args)
        .output()
        .map_err(|e| GitCommandError::SpawnFailed {
            command: name.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(GitCommandError::ExitError {
            command: name,
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| GitCommandError::InvalidUtf8 {
        command: name,
        message: e.to_string(),
    })
}

/// Arguments for producing one path's diff in `mode`.
///
/// `--diff-algorithm` goes right after the plumbing subcommand, the
/// reference after the mode's own flags.
pub fn diff_args(
    mode: &PatchMode,
    algorithm: Option<&str>,
    reference: Option<&str>,
    color: bool,
    path: &str,
) -> Vec<String> {
    let mut args: Vec<String> = Vec::with_capacity(mode.diff.len() + 5);
    let (subcommand, flags) = mode.diff.split_first().unwrap_or((&"diff-files", &[]));
    args.push((*subcommand).to_string());
    if let Some(algorithm) = algorithm {
        args.push(format!("--diff-algorithm={algorithm}"));
    }
    args.extend(flags.iter().map(|f| (*f).to_string()));
    if let Some(reference) = reference {
        args.push(reference.to_string());
    }
    args.push(if color { "--color" } else { "--no-color" }.to_string());
    args.push("--".to_string());
    args.push(path.to_string());
    args
}

/// Apply/check arguments; hunks may overlap after splitting.
fn apply_args(base: &[&'static str]) -> Vec<&'static str> {
    let mut args = base.to_vec();
    args.push("--allow-overlap");
    args
}

impl Repository for GitRepository {
    fn modified_files(
        &self,
        filter: Option<StatusFilter>,
        revision: Option<&str>,
    ) -> Result<Vec<FileStatus>, GitCommandError> {
        // Stat-only changes would otherwise show up as modified files
        self.refresh_index();

        let index_lines = if filter == Some(StatusFilter::FileOnly) {
            Vec::new()
        } else {
            let reference = self.reference(revision.unwrap_or("HEAD"))?;
            self.git_lines(&["diff-index", "--cached", "--numstat", reference.as_str(), "--"])?
        };

        let file_lines = if filter == Some(StatusFilter::IndexOnly) {
            Vec::new()
        } else {
            self.git_lines(&[
                "diff-files",
                "--ignore-submodules=dirty",
                "--numstat",
                "--raw",
                "--",
            ])?
        };

        Ok(status::collect(&index_lines, &file_lines, filter))
    }

    fn diff_text(
        &self,
        path: &str,
        mode: &PatchMode,
        revision: Option<&str>,
    ) -> Result<DiffText, GitCommandError> {
        let reference = revision.map(|rev| self.reference(rev)).transpose()?;
        let algorithm = self.config.diff_algorithm.as_deref();

        let plain_args = diff_args(mode, algorithm, reference.as_deref(), false, path);
        let plain = self.git_lines(&plain_args.iter().map(String::as_str).collect::<Vec<_>>())?;

        let color = if self.config.color_diff {
            let color_args = diff_args(mode, algorithm, reference.as_deref(), true, path);
            self.git_lines(&color_args.iter().map(String::as_str).collect::<Vec<_>>())
                .unwrap_or_else(|e| {
                    debug!("colored diff unavailable: {e}");
                    Vec::new()
                })
        } else {
            Vec::new()
        };

        Ok(DiffText { plain, color })
    }

    fn apply_patch(&self, patch: &[u8], mode: &PatchMode) -> Result<(), GitCommandError> {
        info!(mode = mode.name, bytes = patch.len(), "applying patch");
        self.git_with_stdin(&apply_args(mode.apply), patch)
    }

    fn check_patch(&self, patch: &[u8], mode: &PatchMode) -> Result<(), GitCommandError> {
        debug!(mode = mode.name, bytes = patch.len(), "checking patch");
        self.git_with_stdin(&apply_args(mode.check), patch)
    }

    fn refresh_index(&self) {
        if let Err(e) = self.git(&["update-index", "-q", "--refresh"]) {
            warn!("index refresh failed: {e}");
        }
    }

    fn scratch_dir(&self) -> PathBuf {
        self.git_dir.clone()
    }
}
