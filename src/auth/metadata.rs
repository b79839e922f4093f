//! Call metadata
//!
//! Ordered key/value pairs attached to a call by the transport, analogous to
//! HTTP/2 headers. Keys are case-insensitive and stored lowercase.

use crate::protocol::constants::{AUTHORIZATION_KEY, BEARER_PREFIX};

/// Transport-level metadata attached to a call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata carrying `authorization: Bearer <token>`
    pub fn bearer(token: &str) -> Self {
        let mut metadata = Self::new();
        metadata.insert(AUTHORIZATION_KEY, format!("{}{}", BEARER_PREFIX, token));
        metadata
    }

    /// Append an entry. Repeated keys are kept in insertion order.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .push((key.as_ref().to_ascii_lowercase(), value.into()));
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The `authorization` value, if any
    pub fn authorization(&self) -> Option<&str> {
        self.get(AUTHORIZATION_KEY)
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut md = Metadata::new();
        md.insert("Authorization", "Bearer x");

        assert_eq!(md.get("authorization"), Some("Bearer x"));
        assert_eq!(md.get("AUTHORIZATION"), Some("Bearer x"));
        assert_eq!(md.iter().next(), Some(("authorization", "Bearer x")));
    }

    #[test]
    fn test_repeated_keys_keep_order() {
        let mut md = Metadata::new();
        md.insert("x-tag", "a");
        md.insert("x-tag", "b");

        assert_eq!(md.get("x-tag"), Some("a"));
        assert_eq!(
            md.iter().map(|(_, v)| v).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(md.len(), 2);
    }

    #[test]
    fn test_bearer() {
        let md = Metadata::bearer("secret");
        assert_eq!(md.authorization(), Some("Bearer secret"));
    }
}
