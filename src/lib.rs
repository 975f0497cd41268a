//! Interactive hunk selection for git, in the manner of `git add -p`.
//!
//! A file's diff is parsed into hunks ([`diff`]), which the user accepts,
//! rejects, splits or edits one at a time ([`session`]). The accepted hunks
//! are reassembled into a patch ([`patch`]) and handed to `git apply` with
//! the flags of the active [`mode::PatchMode`].
//!
//! # Examples
//!
//! ```no_run
//! # use git_addp::{CommandEditor, GitRepository, Session, StdioTerminal};
//! let repo = GitRepository::open(".").unwrap();
//! let editor = CommandEditor::resolve(repo.config().editor.as_deref());
//! let mut terminal = StdioTerminal::new();
//! let mut session = Session::default();
//! let outcome = session
//!     .selector(&repo, &mut terminal, &editor)
//!     .run("stage", None, &[])
//!     .unwrap();
//! println!("{outcome:?}");
//! ```

use error_set::error_set;

pub mod command;
pub mod config;
pub mod diff;
pub mod editor;
pub mod filter;
pub mod mode;
pub mod parse;
pub mod patch;
pub mod prompt;
pub mod repo;
pub mod session;
pub mod status;
pub mod term;

pub use config::Config;
pub use editor::{CommandEditor, EditError, Editor};
pub use filter::FilterError;
pub use mode::{Flavor, PatchMode};
pub use parse::ParseError;
pub use repo::{GitRepository, Repository};
pub use session::{HunkSelector, RunOutcome, Session};
pub use term::{StdioTerminal, Terminal};

error_set! {
    /// Top-level error for a patch session
    AddpError := {
        #[display("Unknown patch mode: {name}")]
        UnknownMode { name: String },
        #[display("Terminal I/O failed: {message}")]
        Terminal { message: String },
    } || GitCommandError

    /// Errors from running git
    GitCommandError := {
        #[display("Failed to run git {command}: {message}")]
        SpawnFailed { command: String, message: String },
        #[display("Failed to get stdin handle for git {command}")]
        StdinFailed { command: String },
        #[display("Failed to write patch to git {command}: {message}")]
        WriteFailed { command: String, message: String },
        #[display("Failed to wait for git {command}: {message}")]
        WaitFailed { command: String, message: String },
        #[display("git {command} failed: {stderr}")]
        ExitError { command: String, stderr: String },
        #[display("Invalid UTF-8 in git {command} output: {message}")]
        InvalidUtf8 { command: String, message: String },
    }
}

impl From<std::io::Error> for AddpError {
    fn from(e: std::io::Error) -> Self {
        AddpError::Terminal {
            message: e.to_string(),
        }
    }
}
