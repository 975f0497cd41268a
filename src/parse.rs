//! Parsing for unified-diff hunk headers and hunk numbers.
//!
//! A hunk header has the form `@@ -OLD[,OLDCNT] +NEW[,NEWCNT] @@`, optionally
//! followed by function context which is ignored here but kept verbatim in
//! the hunk's text. A missing count means a count of one.
//!
//! # Examples
//!
//! ```
//! use git_addp::parse::{parse_hunk_header, HunkHeader};
//!
//! let header = parse_hunk_header("@@ -10,2 +10,3 @@ fn main() {").unwrap();
//! assert_eq!(header, HunkHeader { old_start: 10, old_count: 2, new_start: 10, new_count: 3 });
//!
//! // Counts of one are implied when omitted
//! let header = parse_hunk_header("@@ -15 +14,0 @@").unwrap();
//! assert_eq!(header.old_count, 1);
//! assert_eq!(header.to_string(), "@@ -15 +14,0 @@");
//! ```

use error_set::error_set;
use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, u32 as decimal},
    combinator::opt,
    sequence::preceded,
};
use std::fmt;
use std::num::NonZeroUsize;

error_set! {
    /// Errors from parsing diff text and prompt input
    ParseError := {
        /// Line does not start with a well-formed `@@ -a,b +c,d @@` header
        #[display("Invalid hunk header '{line}'")]
        InvalidHunkHeader { line: String },
        /// Hunk number could not be parsed as a positive integer
        #[display("Invalid number: '{value}'")]
        InvalidHunkNumber { value: String },
    }
}

/// Line ranges from a hunk's `@@` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
}

impl fmt::Display for HunkHeader {
    /// Writes the header, omitting `,count` only when the count is exactly 1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@@ -{}", self.old_start)?;
        if self.old_count != 1 {
            write!(f, ",{}", self.old_count)?;
        }
        write!(f, " +{}", self.new_start)?;
        if self.new_count != 1 {
            write!(f, ",{}", self.new_count)?;
        }
        write!(f, " @@")
    }
}

/// Parse the header line of a hunk.
///
/// Anything after the closing `@@` is ignored.
///
/// # Errors
///
/// Returns [`ParseError::InvalidHunkHeader`] if the line does not start with a
/// valid header.
pub fn parse_hunk_header(line: &str) -> Result<HunkHeader, ParseError> {
    hunk_header(line)
        .map(|(_, header)| header)
        .map_err(|_| ParseError::InvalidHunkHeader {
            line: line.to_string(),
        })
}

fn hunk_header(input: &str) -> IResult<&str, HunkHeader> {
    let (rest, (_, (old_start, old_count), _, (new_start, new_count), _)) =
        (tag("@@ -"), range, tag(" +"), range, tag(" @@")).parse(input)?;

    Ok((
        rest,
        HunkHeader {
            old_start,
            old_count: old_count.unwrap_or(1),
            new_start,
            new_count: new_count.unwrap_or(1),
        },
    ))
}

/// `START[,COUNT]`
fn range(input: &str) -> IResult<&str, (u32, Option<u32>)> {
    (decimal, opt(preceded(char(','), decimal))).parse(input)
}

/// Parse a 1-based hunk number as typed at the `g` prompt.
///
/// # Errors
///
/// Returns [`ParseError::InvalidHunkNumber`] for anything that is not a
/// positive integer.
pub fn parse_hunk_number(input: &str) -> Result<NonZeroUsize, ParseError> {
    let trimmed = input.trim();
    trimmed
        .parse::<NonZeroUsize>()
        .map_err(|_| ParseError::InvalidHunkNumber {
            value: trimmed.to_string(),
        })
}
