use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid status code: {0}")]
    InvalidStatusCode(String),

    #[error("Line {0} is not valid UTF-8")]
    InvalidUtf8(usize),
}

pub type Result<T> = std::result::Result<T, ParserError>;
