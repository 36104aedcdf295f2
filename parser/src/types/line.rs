use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    grammar::{parse_request_line, parse_status_line},
};

pub const HTTP_1_1: &str = "HTTP/1.1";

fn default_version() -> String {
    HTTP_1_1.to_string()
}

/// Which kind of start line a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Request,
    Response,
}

/// First line of an HTTP message, either a request line or a status line.
pub trait StartLine: Clone + fmt::Debug + fmt::Display + Sized {
    const MODE: Mode;

    fn parse(line: &str) -> Result<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    #[serde(default = "default_version")]
    pub version: String,
}

impl RequestLine {
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            version: default_version(),
        }
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.target, self.version)
    }
}

impl StartLine for RequestLine {
    const MODE: Mode = Mode::Request;

    fn parse(line: &str) -> Result<Self> {
        parse_request_line(line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    #[serde(default = "default_version")]
    pub version: String,
    pub code: u16,
    #[serde(default)]
    pub reason: String,
}

impl StatusLine {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            code,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{} {}", self.version, self.code)
        } else {
            write!(f, "{} {} {}", self.version, self.code, self.reason)
        }
    }
}

impl StartLine for StatusLine {
    const MODE: Mode = Mode::Response;

    fn parse(line: &str) -> Result<Self> {
        parse_status_line(line)
    }
}
