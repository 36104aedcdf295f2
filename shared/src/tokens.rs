use uuid::Uuid;

/// Source of unique tokens used for multipart boundaries.
///
/// Every call must return a value never returned before by the same source.
pub trait TokenSource {
    fn next_token(&mut self) -> String;
}

/// Random v4 UUID tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokens;

impl TokenSource for UuidTokens {
    fn next_token(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Predictable tokens (`<prefix>0`, `<prefix>1`, ...) for tests and reproducible output.
#[derive(Debug, Clone)]
pub struct SequentialTokens {
    prefix: String,
    next: u64,
}

impl SequentialTokens {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialTokens {
    fn default() -> Self {
        Self::new("t")
    }
}

impl TokenSource for SequentialTokens {
    fn next_token(&mut self) -> String {
        let token = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        token
    }
}
