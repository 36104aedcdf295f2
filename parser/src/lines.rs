use crate::error::{ParserError, Result};

/// One line of input without its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub content: &'a [u8],
    /// Byte offset of the first byte of the line in the underlying input.
    pub start: usize,
}

impl<'a> Line<'a> {
    pub fn text(&self) -> Result<&'a str> {
        std::str::from_utf8(self.content).map_err(|_| ParserError::InvalidUtf8(self.start))
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim_ascii().is_empty()
    }
}

/// Splits a byte buffer into lines terminated by `\r\n` or `\n`.
///
/// A trailing fragment without terminator is returned as the last line.
#[derive(Debug, Clone)]
pub struct LineReader<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn rest(&self) -> &'a [u8] {
        &self.input[self.offset..]
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    pub fn next_line(&mut self) -> Option<Line<'a>> {
        if self.is_at_end() {
            return None;
        }

        let start = self.offset;
        let rest = &self.input[start..];

        let (content, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(newline) => {
                let content = &rest[..newline];
                let content = content.strip_suffix(b"\r").unwrap_or(content);
                (content, newline + 1)
            }
            None => (rest, rest.len()),
        };

        self.offset += consumed;
        Some(Line { content, start })
    }
}

impl<'a> Iterator for LineReader<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}
