use serde::{Deserialize, Serialize};

use super::{Headers, RequestLine, StatusLine};

/// A standalone HTTP message: start line, headers and raw body bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message<L> {
    pub start: L,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Vec<u8>,
}

pub type Request = Message<RequestLine>;
pub type Response = Message<StatusLine>;

impl<L> Message<L> {
    pub fn new(start: L) -> Self {
        Self {
            start,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}
