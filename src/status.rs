//! Per-file status from `git diff-index`/`git diff-files` output, and
//! pathspec matching for the file list.

use crate::mode::StatusFilter;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static RAW_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^:[0-7]+ [0-7]+ [0-9a-f]{7,64} [0-9a-f]{7,64} ([A-Z])[0-9]*\t(.*)$").ok()
});

/// Line counts for one side of a file's status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Numstat {
    #[default]
    Unchanged,
    Binary,
    Lines { added: u32, deleted: u32 },
}

/// Status of a path on the index and worktree sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStatus {
    pub path: String,
    /// Staged changes, against the revision
    pub index: Numstat,
    /// Unstaged changes, against the index
    pub file: Numstat,
    pub binary: bool,
    pub unmerged: bool,
}

impl FileStatus {
    /// Whether the file can be offered hunk by hunk.
    pub fn is_patchable(&self) -> bool {
        !self.binary && !self.unmerged
    }
}

/// Parse a `--numstat` line: `ADDED\tDELETED\tPATH`, `-\t-\tPATH` for binary.
pub fn parse_numstat(line: &str) -> Option<(String, Numstat)> {
    let mut parts = line.splitn(3, '\t');
    let added = parts.next()?;
    let deleted = parts.next()?;
    let path = unquote_path(parts.next()?);

    let stat = if added == "-" && deleted == "-" {
        Numstat::Binary
    } else {
        Numstat::Lines {
            added: added.parse().ok()?,
            deleted: deleted.parse().ok()?,
        }
    };
    Some((path, stat))
}

/// Parse a `--raw` line into its path and status letter.
pub fn parse_raw(line: &str) -> Option<(String, char)> {
    let caps = RAW_LINE.as_ref()?.captures(line)?;
    let status = caps.get(1)?.as_str().chars().next()?;
    Some((unquote_path(caps.get(2)?.as_str()), status))
}

/// Merge index-side and worktree-side output into a sorted file list.
///
/// `index_lines` come from `diff-index --cached --numstat`, `file_lines` from
/// `diff-files --numstat --raw`. Files with nothing on the side the filter
/// asks for are dropped.
pub fn collect(
    index_lines: &[String],
    file_lines: &[String],
    filter: Option<StatusFilter>,
) -> Vec<FileStatus> {
    let mut map: BTreeMap<String, FileStatus> = BTreeMap::new();

    for line in index_lines {
        if let Some((path, stat)) = parse_numstat(line) {
            let status = entry(&mut map, path);
            status.binary |= stat == Numstat::Binary;
            status.index = stat;
        }
    }

    for line in file_lines {
        if let Some((path, stat)) = parse_numstat(line) {
            let status = entry(&mut map, path);
            status.binary |= stat == Numstat::Binary;
            status.file = stat;
        } else if let Some((path, kind)) = parse_raw(line) {
            entry(&mut map, path).unmerged |= kind == 'U';
        }
    }

    map.into_values()
        .filter(|status| match filter {
            Some(StatusFilter::IndexOnly) => status.index != Numstat::Unchanged,
            Some(StatusFilter::FileOnly) => status.file != Numstat::Unchanged,
            None => true,
        })
        .collect()
}

fn entry(map: &mut BTreeMap<String, FileStatus>, path: String) -> &mut FileStatus {
    map.entry(path.clone()).or_insert_with(|| FileStatus {
        path,
        ..FileStatus::default()
    })
}

/// Undo git's C-style quoting of unusual paths.
///
/// Paths not wrapped in double quotes come back unchanged.
pub fn unquote_path(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('v') => bytes.push(0x0b),
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => {
                let mut buf = [0; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Whether a git-style pathspec selects `target`.
///
/// Supports exact paths, a leading `./`, `:(magic)` prefixes whose magic is
/// ignored, and directory prefixes with or without a trailing slash.
pub fn pathspec_matches(pathspec: &str, target: &str) -> bool {
    if pathspec == target {
        return true;
    }

    let mut spec = pathspec;
    if spec.starts_with(":(") {
        if let Some(close) = spec.find(')') {
            spec = &spec[close + 1..];
        }
    }
    let spec = spec.strip_prefix("./").unwrap_or(spec);
    let spec = spec.trim_end_matches('/');

    if spec.is_empty() || spec == "." {
        return true;
    }
    target == spec
        || target
            .strip_prefix(spec)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn owned(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn numstat_lines() {
        assert_eq!(
            parse_numstat("3\t1\tsrc/lib.rs"),
            Some((
                "src/lib.rs".to_string(),
                Numstat::Lines {
                    added: 3,
                    deleted: 1
                }
            ))
        );
        assert_eq!(
            parse_numstat("-\t-\tlogo.png"),
            Some(("logo.png".to_string(), Numstat::Binary))
        );
        assert_eq!(parse_numstat(" create mode 100644 x"), None);
        assert_eq!(parse_numstat("x\ty\tz"), None);
    }

    #[test]
    fn raw_lines() {
        let line = ":100644 100644 1234567 89abcde M\tsrc/main.rs";
        assert_eq!(parse_raw(line), Some(("src/main.rs".to_string(), 'M')));

        let line = ":100644 100644 0000000000000000000000000000000000000000 \
                    0000000000000000000000000000000000000000 U\tconflict.txt";
        assert_eq!(parse_raw(line), Some(("conflict.txt".to_string(), 'U')));

        assert_eq!(parse_raw("1\t2\tfile"), None);
    }

    #[test]
    fn collect_merges_both_sides() {
        let index = owned("1\t0\tstaged.txt\n2\t2\tboth.txt");
        let files = owned(
            ":100644 100644 1111111 0000000 M\tboth.txt\n\
             :100644 100644 1111111 0000000 U\tmerge.txt\n\
             4\t1\tboth.txt\n\
             -\t-\timage.png\n\
             0\t0\tmerge.txt",
        );

        let all = collect(&index, &files, None);
        let paths: Vec<&str> = all.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["both.txt", "image.png", "merge.txt", "staged.txt"]);

        let both = &all[0];
        assert_eq!(
            both.index,
            Numstat::Lines {
                added: 2,
                deleted: 2
            }
        );
        assert_eq!(
            both.file,
            Numstat::Lines {
                added: 4,
                deleted: 1
            }
        );
        assert!(both.is_patchable());
        assert!(all[1].binary);
        assert!(all[2].unmerged);
        assert!(!all[2].is_patchable());
    }

    #[test]
    fn collect_applies_status_filter() {
        let index = owned("1\t0\tstaged.txt");
        let files = owned("3\t0\tworktree.txt");

        let file_only = collect(&index, &files, Some(StatusFilter::FileOnly));
        assert_eq!(file_only.len(), 1);
        assert_eq!(file_only[0].path, "worktree.txt");

        let index_only = collect(&index, &files, Some(StatusFilter::IndexOnly));
        assert_eq!(index_only.len(), 1);
        assert_eq!(index_only[0].path, "staged.txt");
    }

    #[test]
    fn unquote_handles_escapes() {
        assert_eq!(unquote_path("plain.txt"), "plain.txt");
        assert_eq!(unquote_path("\"with space.txt\""), "with space.txt");
        assert_eq!(unquote_path("\"tab\\there\""), "tab\there");
        assert_eq!(unquote_path("\"quote\\\"d\""), "quote\"d");
        assert_eq!(unquote_path("\"caf\\303\\251.txt\""), "café.txt");
        assert_eq!(unquote_path("\""), "\"");
    }

    #[test]
    fn pathspecs() {
        assert!(pathspec_matches("src/lib.rs", "src/lib.rs"));
        assert!(pathspec_matches("./src/lib.rs", "src/lib.rs"));
        assert!(pathspec_matches("src/", "src/lib.rs"));
        assert!(pathspec_matches("src", "src/diff/mod.rs"));
        assert!(pathspec_matches(":(,prefix:0)src/", "src/lib.rs"));
        assert!(pathspec_matches(":(top)README.md", "README.md"));
        assert!(pathspec_matches(".", "anything"));

        assert!(!pathspec_matches("src", "srcfoo/lib.rs"));
        assert!(!pathspec_matches("lib.rs", "src/lib.rs"));
        assert!(!pathspec_matches("tests/", "src/lib.rs"));
    }
}
