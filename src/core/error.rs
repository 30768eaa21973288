use std::fmt;

/// A syntax error found while reading a source file.
///
/// Carries the project-relative path and the 1-based line so the CLI can
/// point at the offending spot before aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}:{line}: {kind}")]
pub struct SyntaxError {
    pub path: String,
    pub line: usize,
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub fn new(path: impl Into<String>, line: usize, kind: SyntaxErrorKind) -> Self {
        Self {
            path: path.into(),
            line,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnterminatedString,
    UnclosedDelimiter(char),
    UnexpectedChar(char),
    UnexpectedEnd,
    MissingAssignment,
    InvalidEscape(String),
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            SyntaxErrorKind::UnclosedDelimiter(c) => write!(f, "unclosed '{}'", c),
            SyntaxErrorKind::UnexpectedChar(c) => write!(f, "unexpected character '{}'", c),
            SyntaxErrorKind::UnexpectedEnd => write!(f, "unexpected end of file"),
            SyntaxErrorKind::MissingAssignment => write!(f, "expected '=' after property name"),
            SyntaxErrorKind::InvalidEscape(seq) => write!(f, "invalid escape sequence '{}'", seq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let err = SyntaxError::new("ui/Menu.tscn", 12, SyntaxErrorKind::UnterminatedString);
        assert_eq!(
            err.to_string(),
            "ui/Menu.tscn:12: unterminated string literal"
        );
    }

    #[test]
    fn test_display_unclosed_delimiter() {
        let err = SyntaxError::new("a.tres", 3, SyntaxErrorKind::UnclosedDelimiter('['));
        assert_eq!(err.to_string(), "a.tres:3: unclosed '['");
    }
}
