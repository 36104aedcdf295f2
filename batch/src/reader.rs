use parser::{HeadEnd, Headers, LineReader, Mode, StartLine, read_header_block};
use tracing::{debug, trace, warn};

use crate::{
    boundary::{APPLICATION_HTTP, Boundary, MULTIPART_MIXED, Marker, has_media_type},
    codec::{CONTENT_ID, CONTENT_TYPE, read_part},
    envelope::{BatchEnvelope, BatchShape, Changeset, Part},
    error::{BatchError, Result},
};

/// Parses `multipart/mixed` batch bodies.
pub struct BatchReader;

impl BatchReader {
    /// Builds a new envelope from whatever sections the body contains.
    pub fn read<L: StartLine>(content_type: &str, body: &[u8]) -> Result<BatchEnvelope<L>> {
        EnvelopeParser::new(content_type, body, None)?.run()
    }

    /// Reads a body that answers a batch of the given shape.
    ///
    /// The result has exactly the cardinalities of `expected`, so it can be
    /// zipped with the sent envelope (see [`correlate`](crate::correlate)).
    /// A response changeset that stops early has its missing parts filled with
    /// the status line of its last parsed part; any other difference in section
    /// counts is a [`BatchError::CardinalityMismatch`].
    pub fn read_matching<L: StartLine>(
        content_type: &str,
        body: &[u8],
        expected: &BatchShape,
    ) -> Result<BatchEnvelope<L>> {
        EnvelopeParser::new(content_type, body, Some(expected))?.run()
    }
}

enum State<L> {
    Preamble,
    SectionDispatch,
    InChangesetParts {
        boundary: Boundary,
        changeset: Changeset<L>,
    },
    Done,
}

struct EnvelopeParser<'a, 'e, L> {
    lines: LineReader<'a>,
    boundary: Boundary,
    expected: Option<&'e BatchShape>,
    envelope: BatchEnvelope<L>,
}

impl<'a, 'e, L: StartLine> EnvelopeParser<'a, 'e, L> {
    fn new(content_type: &str, body: &'a [u8], expected: Option<&'e BatchShape>) -> Result<Self> {
        Ok(Self {
            lines: LineReader::new(body),
            boundary: Boundary::from_content_type(content_type)?,
            expected,
            envelope: BatchEnvelope::new(),
        })
    }

    fn run(mut self) -> Result<BatchEnvelope<L>> {
        let mut state = State::Preamble;

        loop {
            state = match state {
                State::Preamble => self.preamble()?,
                State::SectionDispatch => self.dispatch()?,
                State::InChangesetParts {
                    boundary,
                    changeset,
                } => self.changeset_part(boundary, changeset)?,
                State::Done => break,
            };
        }

        self.check_totals()?;

        debug!(
            component = "batch_reader",
            mode = ?L::MODE,
            parts = self.envelope.parts.len(),
            changesets = self.envelope.changesets.len(),
            "batch read"
        );
        Ok(self.envelope)
    }

    fn preamble(&mut self) -> Result<State<L>> {
        while let Some(line) = self.lines.next_line() {
            match self.boundary.classify(line.content) {
                Some(Marker::Delimiter) => return Ok(State::SectionDispatch),
                Some(Marker::Close) => {
                    debug!(component = "batch_reader", "batch has no sections");
                    return Ok(State::Done);
                }
                None => trace!(offset = line.start, "skipping preamble line"),
            }
        }

        Err(BatchError::UnexpectedEof("opening boundary"))
    }

    fn dispatch(&mut self) -> Result<State<L>> {
        let headers = self.section_headers()?;
        let content_type = headers
            .get(CONTENT_TYPE)
            .ok_or(BatchError::MissingHeader(CONTENT_TYPE))?;

        if has_media_type(content_type, MULTIPART_MIXED) {
            let nested = Boundary::from_content_type(content_type)?;
            self.begin_changeset()?;
            debug!(
                component = "batch_reader",
                section = "changeset",
                index = self.envelope.changesets.len(),
                boundary = nested.token()
            );
            self.seek_first_nested(nested)
        } else if has_media_type(content_type, APPLICATION_HTTP) {
            self.standalone_part()
        } else {
            Err(BatchError::UnknownSection(content_type.to_string()))
        }
    }

    fn standalone_part(&mut self) -> Result<State<L>> {
        let index = self.envelope.parts.len();
        if let Some(expected) = self.expected {
            if index >= expected.parts {
                return Err(BatchError::CardinalityMismatch {
                    what: "standalone parts",
                    expected: expected.parts,
                    found: index + 1,
                });
            }
        }

        let (part, marker) = read_part::<L>(&mut self.lines, &self.boundary)?;
        debug!(component = "batch_reader", section = "part", index, start = %part.start);
        self.envelope.parts.push(part);

        Ok(match marker {
            Marker::Delimiter => State::SectionDispatch,
            Marker::Close => State::Done,
        })
    }

    fn begin_changeset(&self) -> Result<()> {
        let index = self.envelope.changesets.len();
        match self.expected {
            Some(expected) if index >= expected.changesets.len() => {
                Err(BatchError::CardinalityMismatch {
                    what: "changesets",
                    expected: expected.changesets.len(),
                    found: index + 1,
                })
            }
            _ => Ok(()),
        }
    }

    /// A changeset section has no body of its own: skip to its first nested boundary.
    fn seek_first_nested(&mut self, boundary: Boundary) -> Result<State<L>> {
        while let Some(line) = self.lines.next_line() {
            match boundary.classify(line.content) {
                Some(Marker::Delimiter) => {
                    return Ok(State::InChangesetParts {
                        boundary,
                        changeset: Changeset::new(),
                    });
                }
                Some(Marker::Close) => break,
                None => {}
            }
        }

        self.finish_changeset(Changeset::new())?;
        Ok(self.seek_outer())
    }

    fn changeset_part(&mut self, boundary: Boundary, mut changeset: Changeset<L>) -> Result<State<L>> {
        let headers = self.section_headers()?;
        if let Some(content_type) = headers.get(CONTENT_TYPE) {
            if !has_media_type(content_type, APPLICATION_HTTP) {
                return Err(BatchError::UnknownSection(content_type.to_string()));
            }
        }

        if let Some(expected) = self.expected_changeset_len() {
            if changeset.len() >= expected {
                return Err(BatchError::CardinalityMismatch {
                    what: "changeset parts",
                    expected,
                    found: changeset.len() + 1,
                });
            }
        }

        let (mut part, marker) = read_part::<L>(&mut self.lines, &boundary)?;
        // Content ids only correlate requests; response echoes are not kept.
        if L::MODE == Mode::Request {
            part.content_id = headers.get(CONTENT_ID).map(str::to_string);
        }
        trace!(component = "batch_reader", start = %part.start, content_id = ?part.content_id);
        changeset.parts.push(part);

        match marker {
            Marker::Delimiter => Ok(State::InChangesetParts {
                boundary,
                changeset,
            }),
            Marker::Close => {
                self.finish_changeset(changeset)?;
                Ok(self.seek_outer())
            }
        }
    }

    fn expected_changeset_len(&self) -> Option<usize> {
        let index = self.envelope.changesets.len();
        self.expected
            .map(|expected| expected.changesets.get(index).copied().unwrap_or_default())
    }

    /// Applies failure propagation and the part count check, then stores the changeset.
    fn finish_changeset(&mut self, mut changeset: Changeset<L>) -> Result<()> {
        if let Some(expected) = self.expected_changeset_len() {
            let parsed = changeset.len();

            if parsed < expected && L::MODE == Mode::Response {
                if let Some(last) = changeset.parts.last() {
                    let start = last.start.clone();
                    warn!(
                        component = "batch_reader",
                        changeset = self.envelope.changesets.len(),
                        parsed,
                        expected,
                        status = %start,
                        "changeset aborted, propagating last status"
                    );
                    changeset
                        .parts
                        .extend((parsed..expected).map(|_| Part::new(start.clone())));
                }
            }

            if changeset.len() != expected {
                return Err(BatchError::CardinalityMismatch {
                    what: "changeset parts",
                    expected,
                    found: changeset.len(),
                });
            }
        }

        self.envelope.changesets.push(changeset);
        Ok(())
    }

    /// Scans past the end of a changeset to the next outer boundary.
    ///
    /// A server that aborts a changeset may cut the outer stream short, so
    /// running out of input here ends the batch.
    fn seek_outer(&mut self) -> State<L> {
        while let Some(line) = self.lines.next_line() {
            match self.boundary.classify(line.content) {
                Some(Marker::Delimiter) => return State::SectionDispatch,
                Some(Marker::Close) => return State::Done,
                None => trace!(offset = line.start, "skipping line after changeset"),
            }
        }

        debug!(
            component = "batch_reader",
            "batch ended after changeset without closing boundary"
        );
        State::Done
    }

    fn check_totals(&self) -> Result<()> {
        let Some(expected) = self.expected else {
            return Ok(());
        };

        if self.envelope.parts.len() != expected.parts {
            return Err(BatchError::CardinalityMismatch {
                what: "standalone parts",
                expected: expected.parts,
                found: self.envelope.parts.len(),
            });
        }
        if self.envelope.changesets.len() != expected.changesets.len() {
            return Err(BatchError::CardinalityMismatch {
                what: "changesets",
                expected: expected.changesets.len(),
                found: self.envelope.changesets.len(),
            });
        }

        Ok(())
    }

    fn section_headers(&mut self) -> Result<Headers> {
        match read_header_block(&mut self.lines, |_| false)? {
            (headers, HeadEnd::Blank) => Ok(headers),
            _ => Err(BatchError::UnexpectedEof("section headers")),
        }
    }
}

#[cfg(test)]
mod tests {
    use parser::{RequestLine, StatusLine};

    use super::*;

    const CONTENT_TYPE_VALUE: &str = "multipart/mixed; boundary=batch_1";

    fn shape(parts: usize, changesets: &[usize]) -> BatchShape {
        BatchShape {
            parts,
            changesets: changesets.to_vec(),
        }
    }

    #[test]
    fn test_read_skips_preamble() {
        let body = b"This is a preamble\r\n\
\r\n\
--batch_1\r\n\
Content-Type: application/http\r\n\
Content-Transfer-Encoding: binary\r\n\
\r\n\
GET /Customers HTTP/1.1\r\n\
Accept: application/json\r\n\
\r\n\
\r\n\
--batch_1--\r\n";

        let envelope = BatchReader::read::<RequestLine>(CONTENT_TYPE_VALUE, body).unwrap();

        assert_eq!(envelope.parts.len(), 1);
        assert_eq!(envelope.parts[0].start.target, "/Customers");
        assert_eq!(envelope.parts[0].headers.get("accept"), Some("application/json"));
        assert!(envelope.parts[0].body.is_empty());
    }

    #[test]
    fn test_read_accepts_bare_lf() {
        let body = b"--batch_1\n\
Content-Type: application/http\n\
\n\
HTTP/1.1 201 Created\n\
Location: /Customers(5)\n\
\n\
{}\n\
--batch_1--\n";

        let envelope = BatchReader::read::<StatusLine>(CONTENT_TYPE_VALUE, body).unwrap();

        assert_eq!(envelope.parts[0].start.code, 201);
        assert_eq!(envelope.parts[0].body, b"{}");
    }

    #[test]
    fn test_read_rejects_non_multipart_content_type() {
        let result = BatchReader::read::<StatusLine>("application/json", b"{}");

        let err = result.unwrap_err();
        assert!(err.is_framing());
        assert_eq!(err, BatchError::InvalidContentType("application/json".to_string()));
    }

    #[test]
    fn test_read_rejects_unknown_section() {
        let body = b"--batch_1\r\n\
Content-Type: text/plain\r\n\
\r\n\
hello\r\n\
--batch_1--\r\n";

        let result = BatchReader::read::<StatusLine>(CONTENT_TYPE_VALUE, body);

        assert_eq!(
            result.unwrap_err(),
            BatchError::UnknownSection("text/plain".to_string())
        );
    }

    #[test]
    fn test_read_requires_section_content_type() {
        let body = b"--batch_1\r\n\
Content-Transfer-Encoding: binary\r\n\
\r\n\
HTTP/1.1 200 OK\r\n\
--batch_1--\r\n";

        let result = BatchReader::read::<StatusLine>(CONTENT_TYPE_VALUE, body);

        assert_eq!(result.unwrap_err(), BatchError::MissingHeader("Content-Type"));
    }

    #[test]
    fn test_read_without_opening_boundary_is_eof() {
        let result = BatchReader::read::<StatusLine>(CONTENT_TYPE_VALUE, b"no boundary here\r\n");

        assert_eq!(
            result.unwrap_err(),
            BatchError::UnexpectedEof("opening boundary")
        );
    }

    #[test]
    fn test_request_changeset_reads_content_ids() {
        let body = b"--batch_1\r\n\
Content-Type: multipart/mixed; boundary=changeset_1\r\n\
\r\n\
--changeset_1\r\n\
Content-Type: application/http\r\n\
Content-Transfer-Encoding: binary\r\n\
content-id: 4\r\n\
\r\n\
POST /Orders HTTP/1.1\r\n\
\r\n\
{}\r\n\
--changeset_1--\r\n\
\r\n\
--batch_1--\r\n";

        let envelope = BatchReader::read::<RequestLine>(CONTENT_TYPE_VALUE, body).unwrap();

        assert_eq!(envelope.changesets.len(), 1);
        assert_eq!(envelope.changesets[0].parts[0].content_id.as_deref(), Some("4"));
        assert_eq!(envelope.changesets[0].parts[0].body, b"{}");
    }

    #[test]
    fn test_response_changeset_ignores_content_ids() {
        let body = b"--batch_1\r\n\
Content-Type: multipart/mixed; boundary=changeset_1\r\n\
\r\n\
--changeset_1\r\n\
Content-Type: application/http\r\n\
Content-Transfer-Encoding: binary\r\n\
Content-Id: 1\r\n\
\r\n\
HTTP/1.1 204 No Content\r\n\
\r\n\
\r\n\
--changeset_1--\r\n\
\r\n\
--batch_1--\r\n";

        let envelope = BatchReader::read::<StatusLine>(CONTENT_TYPE_VALUE, body).unwrap();

        assert_eq!(envelope.changesets[0].parts[0].status(), 204);
        assert!(envelope.changesets[0].parts[0].content_id.is_none());
    }

    #[test]
    fn test_failure_propagates_last_status() {
        let body = b"--batch_1\r\n\
Content-Type: multipart/mixed; boundary=changeset_1\r\n\
\r\n\
--changeset_1\r\n\
Content-Type: application/http\r\n\
Content-Transfer-Encoding: binary\r\n\
\r\n\
HTTP/1.1 409 Conflict\r\n\
Content-Type: application/json\r\n\
\r\n\
{\"error\":\"conflict\"}\r\n\
--changeset_1--\r\n\
\r\n\
--batch_1--\r\n";

        let envelope =
            BatchReader::read_matching::<StatusLine>(CONTENT_TYPE_VALUE, body, &shape(0, &[3]))
                .unwrap();

        let parts = &envelope.changesets[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].body, b"{\"error\":\"conflict\"}");
        assert_eq!(parts[1].status(), 409);
        assert_eq!(parts[2].status(), 409);
        assert_eq!(parts[2].start.reason, "Conflict");
        assert!(parts[2].headers.is_empty());
    }

    #[test]
    fn test_truncated_stream_after_changeset_ends_batch() {
        let body = b"--batch_1\r\n\
Content-Type: multipart/mixed; boundary=changeset_1\r\n\
\r\n\
--changeset_1\r\n\
Content-Type: application/http\r\n\
\r\n\
HTTP/1.1 400 Bad Request\r\n\
\r\n\
\r\n\
--changeset_1--\r\n";

        let envelope =
            BatchReader::read_matching::<StatusLine>(CONTENT_TYPE_VALUE, body, &shape(0, &[2]))
                .unwrap();

        assert_eq!(envelope.changesets[0].parts.len(), 2);
        assert_eq!(envelope.changesets[0].parts[1].status(), 400);
    }

    #[test]
    fn test_request_changeset_shortfall_is_cardinality_error() {
        let body = b"--batch_1\r\n\
Content-Type: multipart/mixed; boundary=changeset_1\r\n\
\r\n\
--changeset_1\r\n\
Content-Type: application/http\r\n\
\r\n\
DELETE /Orders(1) HTTP/1.1\r\n\
\r\n\
\r\n\
--changeset_1--\r\n\
--batch_1--\r\n";

        let result =
            BatchReader::read_matching::<RequestLine>(CONTENT_TYPE_VALUE, body, &shape(0, &[2]));

        assert_eq!(
            result.unwrap_err(),
            BatchError::CardinalityMismatch {
                what: "changeset parts",
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_extra_changeset_is_cardinality_error() {
        let body = b"--batch_1\r\n\
Content-Type: multipart/mixed; boundary=changeset_1\r\n\
\r\n\
--changeset_1--\r\n\
\r\n\
--batch_1--\r\n";

        let result =
            BatchReader::read_matching::<StatusLine>(CONTENT_TYPE_VALUE, body, &shape(0, &[]));

        let err = result.unwrap_err();
        assert!(err.is_cardinality());
        assert_eq!(
            err,
            BatchError::CardinalityMismatch {
                what: "changesets",
                expected: 0,
                found: 1,
            }
        );
    }

    #[test]
    fn test_empty_changeset_in_build_mode() {
        let body = b"--batch_1\r\n\
Content-Type: multipart/mixed; boundary=changeset_1\r\n\
\r\n\
--changeset_1--\r\n\
\r\n\
--batch_1--\r\n";

        let envelope = BatchReader::read::<StatusLine>(CONTENT_TYPE_VALUE, body).unwrap();

        assert_eq!(envelope.changesets.len(), 1);
        assert!(envelope.changesets[0].is_empty());
    }

    #[test]
    fn test_nested_multipart_in_changeset_is_rejected() {
        let body = b"--batch_1\r\n\
Content-Type: multipart/mixed; boundary=changeset_1\r\n\
\r\n\
--changeset_1\r\n\
Content-Type: multipart/mixed; boundary=deeper\r\n\
\r\n\
--deeper--\r\n\
--changeset_1--\r\n\
--batch_1--\r\n";

        let result = BatchReader::read::<StatusLine>(CONTENT_TYPE_VALUE, body);

        assert!(matches!(result, Err(BatchError::UnknownSection(_))));
    }
}
