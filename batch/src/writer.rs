use parser::StartLine;
use shared::{TokenSource, UuidTokens};

use crate::{
    boundary::{APPLICATION_HTTP, Boundary},
    codec::{CONTENT_ID, CONTENT_LENGTH, CONTENT_TRANSFER_ENCODING, CONTENT_TYPE, Framer, write_part},
    config::BatchConfig,
    envelope::{BatchEnvelope, Changeset, Part},
};

/// A serialized batch and the `Content-Type` value that names its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Serializes envelopes into `multipart/mixed` batch bodies.
///
/// Each call to [`write`](Self::write) draws fresh boundary tokens from the
/// writer's token source and restarts content id numbering.
pub struct BatchWriter<T = UuidTokens> {
    tokens: T,
    config: BatchConfig,
}

impl BatchWriter<UuidTokens> {
    pub fn new() -> Self {
        Self::with_tokens(UuidTokens)
    }
}

impl Default for BatchWriter<UuidTokens> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TokenSource> BatchWriter<T> {
    pub fn with_tokens(tokens: T) -> Self {
        Self {
            tokens,
            config: BatchConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn write<L: StartLine>(&mut self, envelope: &BatchEnvelope<L>) -> EncodedBatch {
        let boundary = Boundary::new(format!("batch_{}", self.tokens.next_token()));
        let eol = self.config.line_ending.as_str();
        let mut next_content_id = self.config.first_content_id;
        let mut framer = Framer::new(eol);

        for part in &envelope.parts {
            framer.line(boundary.delimiter());
            write_http_section_headers(&mut framer);
            framer.blank();
            write_part(&mut framer, part);
        }

        for changeset in &envelope.changesets {
            let nested = Boundary::new(format!("changeset_{}", self.tokens.next_token()));
            let section = self.write_changeset(changeset, &nested, &mut next_content_id);

            framer.line(boundary.delimiter());
            framer.header(CONTENT_TYPE, &nested.content_type());
            framer.header(CONTENT_LENGTH, &section.len().to_string());
            framer.blank();
            framer.raw(&section);
            framer.blank();
        }

        framer.line(boundary.close());

        tracing::debug!(
            component = "batch_writer",
            boundary = boundary.token(),
            parts = envelope.parts.len(),
            changesets = envelope.changesets.len(),
            bytes = framer.len(),
            "batch written"
        );

        EncodedBatch {
            content_type: boundary.content_type(),
            body: framer.into_bytes(),
        }
    }

    fn write_changeset<L: StartLine>(
        &self,
        changeset: &Changeset<L>,
        nested: &Boundary,
        next_content_id: &mut u64,
    ) -> Vec<u8> {
        let mut framer = Framer::new(self.config.line_ending.as_str());

        for part in &changeset.parts {
            framer.line(nested.delimiter());
            write_http_section_headers(&mut framer);
            framer.header(CONTENT_ID, &content_id(part, next_content_id));
            framer.blank();
            write_part(&mut framer, part);
        }
        framer.line(nested.close());

        framer.into_bytes()
    }
}

fn write_http_section_headers(framer: &mut Framer) {
    framer.header(CONTENT_TYPE, APPLICATION_HTTP);
    framer.header(CONTENT_TRANSFER_ENCODING, "binary");
}

/// The part's own id, else its `Content-ID` header, else the next counter value.
fn content_id<L>(part: &Part<L>, next: &mut u64) -> String {
    if let Some(id) = &part.content_id {
        return id.clone();
    }
    if let Some(id) = part.headers.get(CONTENT_ID) {
        return id.to_string();
    }

    let id = next.to_string();
    *next += 1;
    id
}

#[cfg(test)]
mod tests {
    use shared::SequentialTokens;

    use super::*;
    use crate::{
        config::LineEnding,
        envelope::{RequestBatch, RequestPart, ResponseBatch, ResponsePart},
    };

    fn writer() -> BatchWriter<SequentialTokens> {
        BatchWriter::with_tokens(SequentialTokens::new("t"))
    }

    #[test]
    fn test_empty_envelope_is_only_close_boundary() {
        let encoded = writer().write(&RequestBatch::new());

        assert_eq!(encoded.content_type, "multipart/mixed; boundary=batch_t0");
        assert_eq!(encoded.body, b"--batch_t0--\r\n");
    }

    #[test]
    fn test_standalone_part_layout() {
        let envelope = ResponseBatch::new().part(ResponsePart::response(200, "OK").body("hello"));

        let encoded = writer().write(&envelope);

        assert_eq!(
            String::from_utf8(encoded.body).unwrap(),
            "--batch_t0\r\n\
             Content-Type: application/http\r\n\
             Content-Transfer-Encoding: binary\r\n\
             \r\n\
             HTTP/1.1 200 OK\r\n\
             \r\n\
             hello\r\n\
             --batch_t0--\r\n"
        );
    }

    #[test]
    fn test_changeset_layout_and_length() {
        let envelope = RequestBatch::new().changeset(
            Changeset::new().part(RequestPart::request("DELETE", "/Orders(1)")),
        );

        let encoded = writer().write(&envelope);
        let text = String::from_utf8(encoded.body).unwrap();

        let nested = "--changeset_t1\r\n\
                      Content-Type: application/http\r\n\
                      Content-Transfer-Encoding: binary\r\n\
                      Content-Id: 1\r\n\
                      \r\n\
                      DELETE /Orders(1) HTTP/1.1\r\n\
                      \r\n\
                      \r\n\
                      --changeset_t1--\r\n";

        let expected = format!(
            "--batch_t0\r\n\
             Content-Type: multipart/mixed; boundary=changeset_t1\r\n\
             Content-Length: {}\r\n\
             \r\n\
             {nested}\
             \r\n\
             --batch_t0--\r\n",
            nested.len()
        );

        assert_eq!(text, expected);
    }

    #[test]
    fn test_content_ids_count_across_changesets() {
        let envelope = RequestBatch::new()
            .changeset(
                Changeset::new()
                    .part(RequestPart::request("POST", "/A"))
                    .part(RequestPart::request("POST", "/B")),
            )
            .changeset(Changeset::new().part(RequestPart::request("POST", "/C")));

        let text = String::from_utf8(writer().write(&envelope).body).unwrap();
        let ids: Vec<_> = text
            .lines()
            .filter_map(|line| line.strip_prefix("Content-Id: "))
            .collect();

        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_explicit_content_ids_are_kept() {
        let envelope = RequestBatch::new().changeset(
            Changeset::new()
                .part(RequestPart::request("POST", "/A").content_id("new-customer"))
                .part(RequestPart::request("POST", "/B").header("Content-ID", "7"))
                .part(RequestPart::request("POST", "/C")),
        );

        let text = String::from_utf8(writer().write(&envelope).body).unwrap();
        let ids: Vec<_> = text
            .lines()
            .filter_map(|line| line.strip_prefix("Content-Id: "))
            .collect();

        assert_eq!(ids, ["new-customer", "7", "1"]);
    }

    #[test]
    fn test_lf_line_endings_and_first_content_id() {
        let config = BatchConfig {
            line_ending: LineEnding::Lf,
            first_content_id: 10,
        };
        let envelope = RequestBatch::new()
            .changeset(Changeset::new().part(RequestPart::request("POST", "/A")));

        let text = String::from_utf8(writer().with_config(config).write(&envelope).body).unwrap();

        assert!(!text.contains('\r'));
        assert!(text.contains("\nContent-Id: 10\n"));
        assert!(text.ends_with("--batch_t0--\n"));
    }

    #[test]
    fn test_fresh_boundary_per_write() {
        let mut writer = writer();
        let first = writer.write(&RequestBatch::new());
        let second = writer.write(&RequestBatch::new());

        assert_ne!(first.content_type, second.content_type);
    }
}
