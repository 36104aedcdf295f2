mod headers;
mod line;
mod message;

pub use headers::Headers;
pub use line::{Mode, RequestLine, StartLine, StatusLine};
pub use message::{Message, Request, Response};
