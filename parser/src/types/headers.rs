use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

/// Header map of an HTTP message.
///
/// Names are stored exactly as given; lookups ignore ASCII case. Iteration is
/// ordered by stored name so serialized output is reproducible.
///
/// Values read from the wire have surrounding whitespace removed, so `" v "`
/// comes back as `"v"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing any entry whose name matches case-insensitively.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let previous = self.remove(&name);
        self.0.insert(name, value.into());
        previous
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let key = self
            .0
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))?
            .clone();
        self.0.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "application/json");

        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert!(headers.contains("Content-type"));
    }

    #[test]
    fn test_insert_replaces_case_insensitive_match() {
        let mut headers = Headers::new();
        headers.insert("content-id", "1");
        let previous = headers.insert("Content-ID", "7");

        assert_eq!(previous.as_deref(), Some("1"));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.iter().next(), Some(("Content-ID", "7")));
    }

    #[test]
    fn test_remove_returns_value() {
        let mut headers: Headers = [("ETag", "W/\"1\""), ("Location", "/x")].into_iter().collect();

        assert_eq!(headers.remove("etag").as_deref(), Some("W/\"1\""));
        assert_eq!(headers.len(), 1);
        assert!(headers.remove("etag").is_none());
    }
}
