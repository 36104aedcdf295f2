//! Batch multipart codec
//!
//! Serializes groups of HTTP requests or responses into a single
//! `multipart/mixed` body following the OData `$batch` layout, and parses such
//! bodies back. Standalone messages become `application/http` sections;
//! changesets (atomic groups) become nested `multipart/mixed` sections whose
//! members carry a `Content-Id`.
//!
//! Whether a batch holds requests or responses is chosen by the start line
//! type: [`RequestBatch`] frames `<METHOD> <target> HTTP/1.1` lines,
//! [`ResponseBatch`] frames `HTTP/1.1 <code> <reason>` lines.
//!
//! # Examples
//!
//! ```
//! use batch::{
//!     BatchReader, BatchWriter, Changeset, RequestBatch, RequestLine, RequestPart,
//!     ResponseBatch, ResponsePart, StatusLine, correlate,
//! };
//!
//! // Client side: frame the requests.
//! let requests = RequestBatch::new()
//!     .part(RequestPart::request("GET", "/Customers('ALFKI')"))
//!     .changeset(
//!         Changeset::new()
//!             .part(
//!                 RequestPart::request("POST", "/Customers")
//!                     .header("Content-Type", "application/json")
//!                     .body(r#"{"CustomerID":"NEWCO"}"#),
//!             )
//!             .part(RequestPart::request("DELETE", "/Customers('OLDCO')")),
//!     );
//!
//! let encoded = BatchWriter::new().write(&requests);
//! assert!(encoded.content_type.starts_with("multipart/mixed; boundary=batch_"));
//!
//! // Server side: read them back. Changeset requests get sequential content ids.
//! let received = BatchReader::read::<RequestLine>(&encoded.content_type, &encoded.body).unwrap();
//! assert_eq!(received.parts.len(), 1);
//! assert_eq!(received.changesets[0].parts[1].content_id.as_deref(), Some("2"));
//!
//! // The server answers; its changeset failed after the first operation.
//! let responses = ResponseBatch::new()
//!     .part(ResponsePart::response(200, "OK").body("{}"))
//!     .changeset(Changeset::new().part(ResponsePart::response(409, "Conflict")));
//! let reply = BatchWriter::new().write(&responses);
//!
//! // Client side: match the reply against what was sent.
//! let outcome = BatchReader::read_matching::<StatusLine>(
//!     &reply.content_type,
//!     &reply.body,
//!     &requests.shape(),
//! )
//! .unwrap();
//!
//! let statuses: Vec<_> = correlate(&requests, &outcome)
//!     .map(|(request, response)| (request.start.method.as_str(), response.status()))
//!     .collect();
//! assert_eq!(statuses, [("GET", 200), ("POST", 409), ("DELETE", 409)]);
//! ```

pub mod body;
mod boundary;
mod codec;
mod config;
mod envelope;
mod error;
mod reader;
mod writer;

pub use boundary::{APPLICATION_HTTP, Boundary, MULTIPART_MIXED, Marker};
pub use config::{BatchConfig, LineEnding};
pub use envelope::{
    BatchEnvelope, BatchShape, Changeset, Part, RequestBatch, RequestPart, ResponseBatch,
    ResponsePart, correlate,
};
pub use error::{BatchError, Result};
pub use parser::{Headers, Mode, RequestLine, StartLine, StatusLine};
pub use reader::BatchReader;
pub use writer::{BatchWriter, EncodedBatch};
