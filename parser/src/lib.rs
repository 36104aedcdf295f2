//! HTTP/1.x message head parsing.
//!
//! Parses request lines, status lines and header blocks of HTTP messages, and
//! whole standalone messages whose body is everything after the head. The
//! header block reader is line driven so that framing layers (such as a
//! multipart reader) can stop it at their own delimiters.
//!
//! # Examples
//!
//! ```
//! use parser::{RequestParser, ResponseParser};
//!
//! let request = RequestParser::parse_request(
//!     b"POST /api/users HTTP/1.1\r\nHost: example.com\r\nContent-Type: application/json\r\n\r\n{\"name\":\"Alice\"}",
//! )
//! .unwrap();
//!
//! assert_eq!(request.start.method, "POST");
//! assert_eq!(request.start.target, "/api/users");
//! assert_eq!(request.headers.get("content-type"), Some("application/json"));
//! assert_eq!(request.body, b"{\"name\":\"Alice\"}");
//!
//! let response = ResponseParser::parse_response(b"HTTP/1.1 404 Not Found\r\n\r\n").unwrap();
//! assert_eq!(response.start.code, 404);
//! assert_eq!(response.start.reason, "Not Found");
//! ```

mod error;
mod grammar;
mod lines;
mod message;
mod types;

pub use error::{ParserError, Result};
pub use grammar::{parse_header_line, parse_request_line, parse_status_line};
pub use lines::{Line, LineReader};
pub use message::{HeadEnd, RequestParser, ResponseParser, read_header_block};
pub use types::{Headers, Message, Mode, Request, RequestLine, Response, StartLine, StatusLine};
