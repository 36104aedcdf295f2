use parser::{HeadEnd, LineReader, StartLine, read_header_block};

use crate::{
    boundary::{Boundary, Marker},
    envelope::Part,
    error::{BatchError, Result},
};

pub(crate) const CONTENT_TYPE: &str = "Content-Type";
pub(crate) const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";
pub(crate) const CONTENT_ID: &str = "Content-Id";
pub(crate) const CONTENT_LENGTH: &str = "Content-Length";

/// Line-oriented output buffer.
pub(crate) struct Framer {
    out: Vec<u8>,
    eol: &'static str,
}

impl Framer {
    pub(crate) fn new(eol: &'static str) -> Self {
        Self {
            out: Vec::new(),
            eol,
        }
    }

    pub(crate) fn line(&mut self, text: &str) {
        self.out.extend_from_slice(text.as_bytes());
        self.blank();
    }

    pub(crate) fn header(&mut self, name: &str, value: &str) {
        self.line(&format!("{name}: {value}"));
    }

    pub(crate) fn blank(&mut self) {
        self.out.extend_from_slice(self.eol.as_bytes());
    }

    pub(crate) fn raw(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    pub(crate) fn len(&self) -> usize {
        self.out.len()
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.out
    }
}

/// Writes the embedded message of `part` followed by the line terminator that
/// separates it from the next boundary line.
pub(crate) fn write_part<L: StartLine>(framer: &mut Framer, part: &Part<L>) {
    framer.line(&part.start.to_string());
    for (name, value) in &part.headers {
        framer.header(name, value);
    }
    framer.blank();
    framer.raw(&part.body);
    framer.blank();
}

/// Reads one embedded message up to and including the next line that matches
/// `boundary`.
///
/// The body is every byte between the empty line ending the head and that
/// boundary line, less the single line terminator the writer places before a
/// boundary. Returns which boundary form ended the part.
pub(crate) fn read_part<L: StartLine>(
    lines: &mut LineReader<'_>,
    boundary: &Boundary,
) -> Result<(Part<L>, Marker)> {
    let start_line = lines
        .by_ref()
        .find(|line| !line.is_blank())
        .ok_or(BatchError::UnexpectedEof("part start line"))?;
    let start = L::parse(start_line.text()?)?;

    let (headers, end) = read_header_block(lines, |line| boundary.classify(line).is_some())?;
    let mut part = Part::new(start);
    part.headers = headers;

    match end {
        HeadEnd::Blank => {}
        HeadEnd::Stopped(line) => {
            let marker = boundary
                .classify(line.content)
                .ok_or(BatchError::UnexpectedEof("part headers"))?;
            return Ok((part, marker));
        }
        HeadEnd::Eof => return Err(BatchError::UnexpectedEof("part headers")),
    }

    let body_start = lines.offset();
    // The blank line closing the head shows which terminator the stream uses.
    let crlf = lines.input()[..body_start].ends_with(b"\r\n");
    while let Some(line) = lines.next_line() {
        if let Some(marker) = boundary.classify(line.content) {
            let body = &lines.input()[body_start..line.start];
            part.body = strip_line_terminator(body, crlf).to_vec();
            return Ok((part, marker));
        }
    }

    Err(BatchError::UnexpectedEof("part body"))
}

fn strip_line_terminator(body: &[u8], crlf: bool) -> &[u8] {
    let stripped = if crlf {
        body.strip_suffix(b"\r\n").or_else(|| body.strip_suffix(b"\n"))
    } else {
        body.strip_suffix(b"\n")
    };
    stripped.unwrap_or(body)
}
