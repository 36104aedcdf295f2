use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEnding::Crlf => f.write_str("crlf"),
            LineEnding::Lf => f.write_str("lf"),
        }
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crlf" => Ok(LineEnding::Crlf),
            "lf" => Ok(LineEnding::Lf),
            other => Err(format!("unknown line ending `{other}`, expected `crlf` or `lf`")),
        }
    }
}

/// Writer settings. The reader accepts either line ending regardless.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub line_ending: LineEnding,
    /// First value handed out when a changeset part has no content id of its own.
    pub first_content_id: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::Crlf,
            first_content_id: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ending_from_str() {
        assert_eq!("CRLF".parse::<LineEnding>(), Ok(LineEnding::Crlf));
        assert_eq!("lf".parse::<LineEnding>(), Ok(LineEnding::Lf));
        assert!("cr".parse::<LineEnding>().is_err());
    }

    #[test]
    fn test_config_deserializes_partial_json() {
        let config: BatchConfig = serde_json::from_str(r#"{"line_ending":"lf"}"#).unwrap();

        assert_eq!(config.line_ending, LineEnding::Lf);
        assert_eq!(config.first_content_id, 1);
    }
}
