//! Transport commands typed on stdin during `read`.

/// One line of reader input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderInput {
    Play,
    Pause,
    Skip,
    Stop,
    Status,
    Help,
    Quit,
}

impl ReaderInput {
    /// Parse a line. Case-insensitive; surrounding whitespace is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let command = match line.trim().to_ascii_lowercase().as_str() {
            "play" | "p" | "resume" => Self::Play,
            "pause" => Self::Pause,
            "skip" | "s" | "next" => Self::Skip,
            "stop" => Self::Stop,
            "status" => Self::Status,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Printed when `read` starts and on `help`.
pub const READER_HELP: &str = "Commands: play (p), pause, skip (s), stop, status, quit (q)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_forms() {
        assert_eq!(ReaderInput::parse("p"), Some(ReaderInput::Play));
        assert_eq!(ReaderInput::parse("s"), Some(ReaderInput::Skip));
        assert_eq!(ReaderInput::parse("q"), Some(ReaderInput::Quit));
    }

    #[test]
    fn whitespace_and_case_are_ignored() {
        assert_eq!(ReaderInput::parse("  PAUSE \n"), Some(ReaderInput::Pause));
        assert_eq!(ReaderInput::parse("Stop"), Some(ReaderInput::Stop));
    }

    #[test]
    fn unknown_input() {
        assert_eq!(ReaderInput::parse(""), None);
        assert_eq!(ReaderInput::parse("rewind"), None);
    }
}
