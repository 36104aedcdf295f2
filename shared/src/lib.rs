mod logging;
mod tokens;

pub use logging::{init_logging, init_test_logging};
pub use tokens::{SequentialTokens, TokenSource, UuidTokens};
