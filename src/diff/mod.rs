//! Diff model: per-file parsing into hunks and hunk splitting.

pub mod file;
pub mod hunk;
pub mod split;

pub use file::{FileDiff, parse_hunks};
pub use hunk::{Decision, Hunk, HunkKind, LineKind};
pub use split::{auto_split, is_splittable, split, split_at};
