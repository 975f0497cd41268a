//! Manual hunk editing through an external editor.
//!
//! The hunk is written to a scratch file under the repository's git dir,
//! surrounded by `#` comments, and read back once the editor exits. The
//! scratch file is removed when the edit finishes, whatever the outcome.

use crate::diff::{Decision, Hunk};
use crate::parse::parse_hunk_header;
use error_set::error_set;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// How many times an edit that does not apply may be retried.
pub const MAX_EDIT_ATTEMPTS: usize = 5;

error_set! {
    /// Errors from the manual edit flow
    EditError := {
        #[display("Failed to prepare edit buffer: {message}")]
        ScratchFile { message: String },
        #[display("Editor '{command}' failed: {message}")]
        EditorFailed { command: String, message: String },
        #[display("No editor configured")]
        NoEditor,
    }
}

/// Something that lets the user change a file in place.
pub trait Editor {
    /// Block until the user is done editing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] if the editor cannot be started or fails.
    fn edit(&self, path: &Path) -> Result<(), EditError>;
}

/// Runs an editor command line, split shell-style, with the file appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEditor {
    pub command: String,
}

impl CommandEditor {
    /// Resolve the editor following git's cascade:
    /// `$GIT_EDITOR` > configured editor > `$VISUAL` > `$EDITOR` > `vi`.
    pub fn resolve(configured: Option<&str>) -> Self {
        let env = |name: &str| std::env::var(name).ok();
        let command = pick_editor([
            env("GIT_EDITOR"),
            configured.map(str::to_string),
            env("VISUAL"),
            env("EDITOR"),
        ]);
        debug!(%command, "resolved editor");
        CommandEditor { command }
    }
}

/// First non-blank candidate, or `vi`.
pub fn pick_editor(candidates: impl IntoIterator<Item = Option<String>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

impl Editor for CommandEditor {
    fn edit(&self, path: &Path) -> Result<(), EditError> {
        let words = shlex::split(&self.command).ok_or_else(|| EditError::EditorFailed {
            command: self.command.clone(),
            message: "unbalanced quotes".to_string(),
        })?;
        let (program, args) = words.split_first().ok_or(EditError::NoEditor)?;

        let status = Command::new(program)
            .args(args)
            .arg(path)
            .status()
            .map_err(|e| EditError::EditorFailed {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(EditError::EditorFailed {
                command: self.command.clone(),
                message: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Text written to the scratch file.
pub fn edit_buffer(hunk: &Hunk, reverse: bool) -> String {
    let (minus, plus) = if reverse { ('+', '-') } else { ('-', '+') };

    let mut buffer = String::from("# Manual hunk edit mode -- see bottom for a quick guide.\n");
    for line in &hunk.lines {
        buffer.push_str(line);
        buffer.push('\n');
    }
    buffer.push_str("# ---\n");
    buffer.push_str(&format!(
        "# To remove '{minus}' lines, make them ' ' lines (context).\n"
    ));
    buffer.push_str(&format!("# To remove '{plus}' lines, delete them.\n"));
    buffer.push_str("# Lines starting with # will be removed.\n");
    buffer
}

/// Turn edited buffer text back into a hunk.
///
/// Comment and empty lines are dropped. A missing `@@` header is taken from
/// `original`, and the counts are recomputed from the edited body while the
/// start lines are kept. Returns `None` when nothing is left.
pub fn parse_edited(original: &Hunk, text: &str) -> Option<Hunk> {
    let kept: Vec<String> = text
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    let first = kept.first()?;
    let (header, body) = match parse_hunk_header(first) {
        Ok(header) => (header, &kept[1..]),
        Err(_) => (original.header, kept.as_slice()),
    };

    let mut hunk = Hunk::from_body(
        original.kind,
        header.old_start,
        header.new_start,
        body,
        body,
    );
    hunk.decision = Decision::Accept;
    hunk.edited = true;
    Some(hunk)
}

/// Let the user edit `hunk` once.
///
/// The scratch file is created in `dir`. Returns `Ok(None)` when the user
/// emptied the buffer.
///
/// # Errors
///
/// Returns [`EditError`] if the scratch file cannot be written or read, or
/// the editor fails.
pub fn edit_hunk(
    editor: &dyn Editor,
    dir: &Path,
    hunk: &Hunk,
    reverse: bool,
) -> Result<Option<Hunk>, EditError> {
    let scratch_err = |e: std::io::Error| EditError::ScratchFile {
        message: e.to_string(),
    };

    let mut scratch = tempfile::Builder::new()
        .prefix("addp-hunk-edit")
        .suffix(".diff")
        .tempfile_in(dir)
        .map_err(scratch_err)?;
    scratch
        .write_all(edit_buffer(hunk, reverse).as_bytes())
        .map_err(scratch_err)?;
    scratch.flush().map_err(scratch_err)?;

    info!(path = %scratch.path().display(), "editing hunk");
    editor.edit(scratch.path())?;

    let text = std::fs::read_to_string(scratch.path()).map_err(scratch_err)?;
    Ok(parse_edited(hunk, &text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::HunkKind;
    use crate::diff::hunk::tests::{change, lines};
    use similar_asserts::assert_eq;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Replaces the buffer with fixed text and remembers the path it saw
    struct Rewrite {
        text: String,
        seen: RefCell<Option<PathBuf>>,
    }

    impl Rewrite {
        fn new(text: &str) -> Self {
            Rewrite {
                text: text.to_string(),
                seen: RefCell::new(None),
            }
        }
    }

    impl Editor for Rewrite {
        fn edit(&self, path: &Path) -> Result<(), EditError> {
            *self.seen.borrow_mut() = Some(path.to_path_buf());
            std::fs::write(path, &self.text).map_err(|e| EditError::ScratchFile {
                message: e.to_string(),
            })
        }
    }

    struct Failing;

    impl Editor for Failing {
        fn edit(&self, _path: &Path) -> Result<(), EditError> {
            Err(EditError::EditorFailed {
                command: "false".to_string(),
                message: "exit status: 1".to_string(),
            })
        }
    }

    fn sample() -> Hunk {
        change("@@ -3,3 +3,4 @@ fn f()\n a\n+b\n+c\n d")
    }

    #[test]
    fn buffer_layout() {
        insta::assert_snapshot!(edit_buffer(&sample(), false), @r"
        # Manual hunk edit mode -- see bottom for a quick guide.
        @@ -3,3 +3,4 @@ fn f()
         a
        +b
        +c
         d
        # ---
        # To remove '-' lines, make them ' ' lines (context).
        # To remove '+' lines, delete them.
        # Lines starting with # will be removed.
        ");
    }

    #[test]
    fn buffer_swaps_signs_when_reversed() {
        let buffer = edit_buffer(&sample(), true);
        assert!(buffer.contains("# To remove '+' lines, make them ' ' lines (context).\n"));
        assert!(buffer.contains("# To remove '-' lines, delete them.\n"));
    }

    #[test]
    fn parse_recounts_edited_body() {
        let edited = parse_edited(&sample(), "# comment\n@@ -3,3 +3,4 @@\n a\n+b\n d\n").unwrap();
        assert_eq!(edited.lines, lines("@@ -3,2 +3,3 @@\n a\n+b\n d"));
        assert_eq!(edited.decision, Decision::Accept);
        assert!(edited.edited);
        assert_eq!(edited.kind, HunkKind::Change);
    }

    #[test]
    fn parse_restores_missing_header() {
        let edited = parse_edited(&sample(), " a\n+b\n+c\n+extra\n d\n\n").unwrap();
        assert_eq!(edited.lines[0], "@@ -3,2 +3,5 @@");
        assert_eq!(edited.body().len(), 5);
    }

    #[test]
    fn parse_keeps_user_starts() {
        let edited = parse_edited(&sample(), "@@ -4 +4,2 @@\n x\n+y\n").unwrap();
        assert_eq!(edited.header.old_start, 4);
        assert_eq!(edited.lines[0], "@@ -4 +4,2 @@");
    }

    #[test]
    fn parse_empty_buffer_cancels() {
        assert_eq!(parse_edited(&sample(), "# only comments\n\n"), None);
        assert_eq!(parse_edited(&sample(), ""), None);
    }

    #[test]
    fn edit_round_trip_removes_scratch_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let editor = Rewrite::new("@@ -3,3 +3,4 @@\n a\n+b\n d\n");

        let edited = edit_hunk(&editor, dir.path(), &sample(), false)
            .unwrap()
            .unwrap();
        assert_eq!(edited.header.new_count, 3);

        let seen = editor.seen.borrow().clone().unwrap();
        assert!(seen.starts_with(dir.path()));
        assert!(!seen.exists());
    }

    #[test]
    fn editor_failure_removes_scratch_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = edit_hunk(&Failing, dir.path(), &sample(), false);
        assert!(matches!(result, Err(EditError::EditorFailed { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn pick_editor_cascade() {
        assert_eq!(
            pick_editor([None, Some("nano".into()), Some("emacs".into())]),
            "nano"
        );
        assert_eq!(pick_editor([Some("  ".into()), Some("ed".into())]), "ed");
        assert_eq!(pick_editor([None, None]), "vi");
    }

    #[test]
    fn command_editor_runs_program() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("buffer");
        std::fs::write(&file, "x").unwrap();

        assert!(CommandEditor { command: "true".into() }.edit(&file).is_ok());
        assert!(matches!(
            CommandEditor { command: "false".into() }.edit(&file),
            Err(EditError::EditorFailed { .. })
        ));
        assert!(matches!(
            CommandEditor { command: String::new() }.edit(&file),
            Err(EditError::NoEditor)
        ));
    }
}
