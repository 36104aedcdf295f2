use parser::{Headers, RequestLine, StartLine, StatusLine};
use serde::{Deserialize, Serialize};

/// One HTTP message embedded in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part<L> {
    pub start: L,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, with = "crate::body")]
    pub body: Vec<u8>,
    /// Correlates a changeset request with the id it was sent under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

pub type RequestPart = Part<RequestLine>;
pub type ResponsePart = Part<StatusLine>;

impl<L> Part<L> {
    pub fn new(start: L) -> Self {
        Self {
            start,
            headers: Headers::new(),
            body: Vec::new(),
            content_id: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }
}

impl RequestPart {
    pub fn request(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(RequestLine::new(method, target))
    }
}

impl ResponsePart {
    pub fn response(code: u16, reason: impl Into<String>) -> Self {
        Self::new(StatusLine::new(code, reason))
    }

    pub fn status(&self) -> u16 {
        self.start.code
    }
}

/// Parts that the server applies atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "L: Deserialize<'de>"))]
pub struct Changeset<L> {
    #[serde(default)]
    pub parts: Vec<Part<L>>,
}

impl<L> Changeset<L> {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    #[must_use]
    pub fn part(mut self, part: Part<L>) -> Self {
        self.parts.push(part);
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<L> Default for Changeset<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> FromIterator<Part<L>> for Changeset<L> {
    fn from_iter<I: IntoIterator<Item = Part<L>>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

/// Section counts of an envelope; the expected side when matching a response
/// against the request that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchShape {
    pub parts: usize,
    pub changesets: Vec<usize>,
}

/// Standalone parts and changesets of one batch.
///
/// Both collections keep their own order. The relative order of a standalone
/// part and a changeset is not recorded; the writer emits all standalone parts
/// before all changesets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "L: Deserialize<'de>"))]
pub struct BatchEnvelope<L> {
    #[serde(default)]
    pub parts: Vec<Part<L>>,
    #[serde(default)]
    pub changesets: Vec<Changeset<L>>,
}

pub type RequestBatch = BatchEnvelope<RequestLine>;
pub type ResponseBatch = BatchEnvelope<StatusLine>;

impl<L> BatchEnvelope<L> {
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            changesets: Vec::new(),
        }
    }

    #[must_use]
    pub fn part(mut self, part: Part<L>) -> Self {
        self.parts.push(part);
        self
    }

    #[must_use]
    pub fn changeset(mut self, changeset: Changeset<L>) -> Self {
        self.changesets.push(changeset);
        self
    }

    pub fn shape(&self) -> BatchShape {
        BatchShape {
            parts: self.parts.len(),
            changesets: self.changesets.iter().map(Changeset::len).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.changesets.is_empty()
    }
}

impl<L> Default for BatchEnvelope<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pairs each sent part with the part received at the same position.
///
/// Intended for a response envelope read with
/// [`BatchReader::read_matching`](crate::BatchReader::read_matching), whose
/// cardinalities equal those of `sent`.
pub fn correlate<'a, A, B>(
    sent: &'a BatchEnvelope<A>,
    received: &'a BatchEnvelope<B>,
) -> impl Iterator<Item = (&'a Part<A>, &'a Part<B>)>
where
    A: StartLine,
    B: StartLine,
{
    let standalone = sent.parts.iter().zip(&received.parts);
    let grouped = sent
        .changesets
        .iter()
        .zip(&received.changesets)
        .flat_map(|(sent, received)| sent.parts.iter().zip(&received.parts));

    standalone.chain(grouped)
}
