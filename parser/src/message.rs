use crate::{
    error::{ParserError, Result},
    grammar::parse_header_line,
    lines::{Line, LineReader},
    types::{Headers, Message, Request, RequestLine, Response, StartLine, StatusLine},
};

/// How a header block ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadEnd<'a> {
    /// The empty line separating head and body was consumed.
    Blank,
    /// Input ran out before an empty line.
    Eof,
    /// `stop` accepted this line; it has been consumed and is handed back.
    Stopped(Line<'a>),
}

/// Reads `Name: value` lines until an empty line, end of input, or a line
/// accepted by `stop`.
pub fn read_header_block<'a, F>(
    lines: &mut LineReader<'a>,
    mut stop: F,
) -> Result<(Headers, HeadEnd<'a>)>
where
    F: FnMut(&[u8]) -> bool,
{
    let mut headers = Headers::new();

    while let Some(line) = lines.next_line() {
        if line.is_blank() {
            return Ok((headers, HeadEnd::Blank));
        }
        if stop(line.content) {
            return Ok((headers, HeadEnd::Stopped(line)));
        }

        let (name, value) = parse_header_line(line.text()?)?;
        tracing::trace!(header = %name, "header parsed");
        headers.insert(name, value);
    }

    Ok((headers, HeadEnd::Eof))
}

fn parse_message<L: StartLine>(input: &[u8]) -> Result<Message<L>> {
    let mut lines = LineReader::new(input);

    let start_line = lines
        .by_ref()
        .find(|line| !line.is_blank())
        .ok_or(ParserError::MissingField("start line"))?;
    let start = L::parse(start_line.text()?)?;

    let (headers, _) = read_header_block(&mut lines, |_| false)?;
    let body = lines.rest().to_vec();

    Ok(Message {
        start,
        headers,
        body,
    })
}

pub struct RequestParser;

impl RequestParser {
    pub fn parse_request(input: &[u8]) -> Result<Request> {
        parse_message::<RequestLine>(input)
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse_response(input: &[u8]) -> Result<Response> {
        parse_message::<StatusLine>(input)
    }
}
