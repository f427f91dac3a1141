//! Query String Parsing
//!
//! Turns a raw query string into a flat mapping. Parsing never fails:
//! undecodable escapes are kept as written.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Value bound to a query key
///
/// A key seen once holds `One`; repeated keys collapse into `Many` in the
/// order they were encountered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// First value for the key
    pub fn first(&self) -> &str {
        match self {
            QueryValue::One(v) => v,
            QueryValue::Many(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values for the key, in encounter order
    pub fn all(&self) -> Vec<&str> {
        match self {
            QueryValue::One(v) => vec![v.as_str()],
            QueryValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = QueryValue::Many(vec![first, value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }
}

/// Flat mapping from query key to value(s)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryMap(HashMap<String, QueryValue>);

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string (`?a=1&b=2&a=3`, leading `?` optional)
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut map = QueryMap::new();

        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            map.append(decode_component(key), decode_component(value));
        }

        map
    }

    /// Add a value, collapsing repeated keys into a sequence
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.0.entry(key.into()) {
            Entry::Occupied(mut slot) => slot.get_mut().push(value),
            Entry::Vacant(slot) => {
                slot.insert(QueryValue::One(value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryValue)> {
        self.0.iter()
    }

    /// Render back to a query string without the leading `?`
    ///
    /// Keys are emitted in sorted order so the output is deterministic.
    pub fn to_query_string(&self) -> String {
        let mut keys: Vec<&String> = self.0.keys().collect();
        keys.sort();

        let mut parts = Vec::new();
        for key in keys {
            for value in self.0[key].all() {
                parts.push(format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                ));
            }
        }
        parts.join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = QueryMap::new();
        for (k, v) in iter {
            map.append(k, v);
        }
        map
    }
}

/// Parse a raw query string into a [`QueryMap`]
pub fn parse_query(raw: &str) -> QueryMap {
    QueryMap::parse(raw)
}

/// `+` means space in form encoding; then percent-decode
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let query = parse_query("?sort=asc&page=2");
        assert_eq!(query.len(), 2);
        assert_eq!(query.get("sort"), Some(&QueryValue::One("asc".to_string())));
        assert_eq!(query.get("page").unwrap().first(), "2");
    }

    #[test]
    fn test_repeated_keys_collapse_in_order() {
        let query = parse_query("tag=rock&x=1&tag=jazz&tag=blues");
        assert_eq!(
            query.get("tag"),
            Some(&QueryValue::Many(vec![
                "rock".to_string(),
                "jazz".to_string(),
                "blues".to_string(),
            ]))
        );
        assert_eq!(query.get("x"), Some(&QueryValue::One("1".to_string())));
    }

    #[test]
    fn test_empty_and_bare_keys() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("?").is_empty());

        let query = parse_query("&&flag&q=");
        assert_eq!(query.len(), 2);
        assert_eq!(query.get("flag").unwrap().first(), "");
        assert_eq!(query.get("q").unwrap().first(), "");
    }

    #[test]
    fn test_decoding() {
        let query = parse_query("q=hello+world&name=J%C3%BCrgen&bad=%zz");
        assert_eq!(query.get("q").unwrap().first(), "hello world");
        assert_eq!(query.get("name").unwrap().first(), "Jürgen");
        assert_eq!(query.get("bad").unwrap().first(), "%zz");
    }

    #[test]
    fn test_to_query_string_is_sorted_and_encoded() {
        let query: QueryMap = vec![("b", "2"), ("a", "x y"), ("b", "3")].into_iter().collect();
        assert_eq!(query.to_query_string(), "a=x%20y&b=2&b=3");
    }
}
