use thiserror::Error;

/// The single error kind of the parser: a message, with a 1-based source line
/// number where one is known. The first violation aborts the whole parse.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("Syntax error on line {line}: {message}")]
    Line { line: usize, message: String },
    #[error("Syntax error: {message}")]
    Document { message: String },
}

impl ParseError {
    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self::Line {
            line,
            message: message.into(),
        }
    }

    pub fn new(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Line { line, .. } => Some(*line),
            Self::Document { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Line { message, .. } | Self::Document { message } => message,
        }
    }
}
