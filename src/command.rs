/// One answer typed at the hunk prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Accept,
    Reject,
    Quit,
    AcceptRest,
    RejectRest,
    Split,
    Edit,
    NextUndecided,
    PrevUndecided,
    Next,
    Prev,
    /// `g`, with the hunk number if given inline
    Goto(Option<String>),
    /// `/`, with the pattern if given inline
    Search(Option<String>),
    /// `G`, with the pattern if given inline
    GlobalFilter(Option<String>),
    AutoSplit,
    AcceptAll,
    Help,
    Unknown(String),
}

fn argument(rest: &str) -> Option<String> {
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

impl Command {
    /// Parse a line of input. Returns `None` for a blank line.
    ///
    /// Uppercase `S`, `A`, `G`, `J` and `K` are distinct commands; every
    /// other letter is case-insensitive.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim_end_matches(['\r', '\n']);
        let mut chars = input.chars();
        let first = chars.next()?;
        let rest = chars.as_str();

        let command = match first {
            'S' => Command::AutoSplit,
            'A' => Command::AcceptAll,
            'G' => Command::GlobalFilter(argument(rest)),
            'J' => Command::Next,
            'K' => Command::Prev,
            _ => match first.to_ascii_lowercase() {
                'y' => Command::Accept,
                'n' => Command::Reject,
                'q' => Command::Quit,
                'a' => Command::AcceptRest,
                'd' => Command::RejectRest,
                's' => Command::Split,
                'e' => Command::Edit,
                'j' => Command::NextUndecided,
                'k' => Command::PrevUndecided,
                'g' => Command::Goto(argument(rest)),
                '/' => Command::Search(argument(rest)),
                '?' => Command::Help,
                _ if first.is_whitespace() && input.trim().is_empty() => return None,
                _ => Command::Unknown(input.to_string()),
            },
        };
        Some(command)
    }
}
