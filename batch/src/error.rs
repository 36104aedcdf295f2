use parser::ParserError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("Invalid batch content type: {0}")]
    InvalidContentType(String),

    #[error("Missing {0} header in batch section")]
    MissingHeader(&'static str),

    #[error("Unrecognized batch section content type: {0}")]
    UnknownSection(String),

    #[error("Unexpected end of batch while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("Malformed message in batch: {0}")]
    Message(#[from] ParserError),

    #[error("Cardinality mismatch for {what}: expected {expected}, found {found}")]
    CardinalityMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

impl BatchError {
    /// The byte stream does not follow the batch framing rules.
    pub fn is_framing(&self) -> bool {
        !self.is_cardinality()
    }

    /// The stream is well formed but holds a different number of sections than expected.
    pub fn is_cardinality(&self) -> bool {
        matches!(self, BatchError::CardinalityMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
