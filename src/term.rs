//! Line-oriented terminal used by the hunk loop.

use std::io::{self, BufRead, Write};

/// Where prompts go and answers come from.
pub trait Terminal {
    /// Read one line of input without its line ending.
    ///
    /// `Ok(None)` means end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Write text as-is, flushing so prompts show before input is read.
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Write a diagnostic line.
    fn error(&mut self, text: &str) -> io::Result<()>;

    fn println(&mut self, line: &str) -> io::Result<()> {
        self.print(line)?;
        self.print("\n")
    }
}

/// Terminal over the process's stdin, stdout and stderr.
pub struct StdioTerminal<R> {
    input: R,
}

impl StdioTerminal<io::StdinLock<'static>> {
    pub fn new() -> Self {
        StdioTerminal {
            input: io::stdin().lock(),
        }
    }
}

impl Default for StdioTerminal<io::StdinLock<'static>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead> StdioTerminal<R> {
    pub fn with_input(input: R) -> Self {
        StdioTerminal { input }
    }
}

impl<R: BufRead> Terminal for StdioTerminal<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn error(&mut self, text: &str) -> io::Result<()> {
        let mut err = io::stderr().lock();
        writeln!(err, "{text}")?;
        err.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn read_lines_until_eof() {
        let mut term = StdioTerminal::with_input("y\r\n\nG foo\nlast".as_bytes());
        assert_eq!(term.read_line().unwrap(), Some("y".to_string()));
        assert_eq!(term.read_line().unwrap(), Some(String::new()));
        assert_eq!(term.read_line().unwrap(), Some("G foo".to_string()));
        assert_eq!(term.read_line().unwrap(), Some("last".to_string()));
        assert_eq!(term.read_line().unwrap(), None);
    }
}
