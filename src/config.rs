use crate::repo::GitRepository;

/// Settings read from the repository's git configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `diff.algorithm`, passed through as `--diff-algorithm`
    pub diff_algorithm: Option<String>,
    /// Whether `color.diff` asks for colored output on a terminal
    pub color_diff: bool,
    /// Editor from `git var GIT_EDITOR`
    pub editor: Option<String>,
}

impl Config {
    /// Read settings; anything git cannot report is left unset.
    pub fn load(repo: &GitRepository) -> Self {
        let value = |args: &[&str]| repo.git(args).ok().and_then(non_empty);

        Config {
            diff_algorithm: value(&["config", "diff.algorithm"]),
            color_diff: value(&["config", "--get-colorbool", "color.diff", "true"])
                .is_some_and(|v| is_true(&v)),
            editor: value(&["var", "GIT_EDITOR"]),
        }
    }
}

fn non_empty(output: String) -> Option<String> {
    let trimmed = output.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn is_true(value: &str) -> bool {
    matches!(value, "true" | "yes" | "on" | "1")
}
