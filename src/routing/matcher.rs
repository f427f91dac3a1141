//! Path Matcher
//!
//! Maps a location onto the first route whose segments line up with it.
//!
//! # Rules
//! - One trailing slash is trimmed (`/` itself is kept); nothing else is
//!   normalised
//! - Paths must be absolute: empty or relative paths never match
//! - Segment counts must be equal
//! - Literal segments compare exactly (case-sensitive)
//! - Parameter segments accept any non-empty segment and bind its
//!   percent-decoded value
//! - First match in table order wins; no match yields `NotFound`
//!
//! Query parsing is independent of the path and never affects the match.

use std::collections::HashMap;

use super::pattern::{RoutePattern, Segment};
use super::query::QueryMap;
use super::table::RouteTable;
use super::types::{MatchResult, Resolution};

/// Match a path and raw query string against the table
pub fn match_path(table: &RouteTable, path: &str, raw_query: &str) -> Resolution {
    match_with_query(table, path, QueryMap::parse(raw_query))
}

/// Match with an already parsed query
pub fn match_with_query(table: &RouteTable, path: &str, query: QueryMap) -> Resolution {
    let normalized = normalize_path(path);
    if !normalized.starts_with('/') {
        return Resolution::NotFound {
            path: normalized,
            query,
        };
    }

    let segments = split_segments(&normalized);

    for route in table.iter() {
        if let Some(params) = match_segments(route.pattern(), &segments) {
            return Resolution::Matched(MatchResult {
                route: route.clone(),
                params,
                query,
                path: normalized,
            });
        }
    }

    Resolution::NotFound {
        path: normalized,
        query,
    }
}

/// Split `path?query#fragment` into path and raw query; the fragment is dropped
pub fn split_location(location: &str) -> (&str, &str) {
    let location = location.split_once('#').map_or(location, |(head, _)| head);
    location.split_once('?').unwrap_or((location, ""))
}

/// Drop one trailing slash; `/` itself is kept
pub fn normalize_path(path: &str) -> String {
    match path.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => path.to_string(),
    }
}

fn split_segments(normalized: &str) -> Vec<&str> {
    let body = &normalized[1..];
    if body.is_empty() {
        Vec::new()
    } else {
        body.split('/').collect()
    }
}

fn match_segments(pattern: &RoutePattern, segments: &[&str]) -> Option<HashMap<String, String>> {
    let expected = pattern.segments();
    if expected.len() != segments.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (segment, actual) in expected.iter().zip(segments) {
        match segment {
            Segment::Literal(text) => {
                if text.as_str() != *actual {
                    return None;
                }
            }
            Segment::Param(name) => {
                if actual.is_empty() {
                    return None;
                }
                params.insert(name.clone(), decode_param(actual));
            }
        }
    }
    Some(params)
}

fn decode_param(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
