use crate::error::{BatchError, Result};

pub const MULTIPART_MIXED: &str = "multipart/mixed";
pub const APPLICATION_HTTP: &str = "application/http";

const BOUNDARY_PREFIX: &str = "multipart/mixed; boundary=";

/// Which boundary line was met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `--<token>`: another section follows.
    Delimiter,
    /// `--<token>--`: the multipart body is finished.
    Close,
}

/// A multipart boundary token with its two line forms precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    token: String,
    delimiter: String,
    close: String,
}

impl Boundary {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let delimiter = format!("--{token}");
        let close = format!("{delimiter}--");
        Self {
            token,
            delimiter,
            close,
        }
    }

    /// Extracts the boundary from `multipart/mixed; boundary=<token>`.
    ///
    /// The media type is compared without regard to ASCII case, the token is
    /// trimmed and may be wrapped in double quotes.
    pub fn from_content_type(content_type: &str) -> Result<Self> {
        let invalid = || BatchError::InvalidContentType(content_type.to_string());

        let prefix = content_type
            .get(..BOUNDARY_PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(BOUNDARY_PREFIX))
            .ok_or_else(invalid)?;

        let token = content_type[prefix.len()..].trim();
        let token = token
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(token);

        if token.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(token))
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn content_type(&self) -> String {
        format!("{BOUNDARY_PREFIX}{}", self.token)
    }

    /// Matches a line (without terminator) against both boundary forms.
    pub fn classify(&self, line: &[u8]) -> Option<Marker> {
        let line = line.trim_ascii_end();

        if line == self.delimiter.as_bytes() {
            Some(Marker::Delimiter)
        } else if line == self.close.as_bytes() {
            Some(Marker::Close)
        } else {
            None
        }
    }
}

pub(crate) fn has_media_type(content_type: &str, media_type: &str) -> bool {
    content_type
        .get(..media_type.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(media_type))
}
