//! Route Pattern Parser
//!
//! Parses path templates into literal and parameter segments.
//!
//! # Supported Syntax
//!
//! ```text
//! /                       root
//! /users                  literal segment
//! /users/:id              named parameter (colon form)
//! /users/{id}/posts       named parameter (brace form)
//! ```
//!
//! A parameter always spans a whole segment. Names start with a letter or
//! underscore and continue with letters, digits or underscores.

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, satisfy},
    combinator::{all_consuming, map, recognize},
    sequence::{delimited, pair, preceded},
    IResult,
};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::error::{ConfigurationError, ConfigurationResult, UnresolvableRouteError};

/// One `/`-delimited component of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Must equal the path segment exactly
    Literal(String),
    /// Binds any non-empty path segment under this name
    Param(String),
}

/// A parsed path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a template such as `/users/:id`
    pub fn parse(source: &str) -> ConfigurationResult<Self> {
        let malformed = |reason: &str| ConfigurationError::MalformedPattern {
            pattern: source.to_string(),
            reason: reason.to_string(),
        };

        if source.is_empty() {
            return Err(malformed("pattern is empty"));
        }
        let body = source
            .strip_prefix('/')
            .ok_or_else(|| malformed("pattern must start with '/'"))?;
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut segments = Vec::new();
        let mut seen = HashSet::new();

        if !body.is_empty() {
            for raw in body.split('/') {
                let segment = parse_raw_segment(raw).map_err(|reason| malformed(&reason))?;
                if let Segment::Param(name) = &segment {
                    if !seen.insert(name.clone()) {
                        return Err(malformed(&format!("parameter '{}' appears twice", name)));
                    }
                }
                segments.push(segment);
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template as written in configuration
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of all parameters, in segment order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.param_names().any(|p| p == name)
    }

    /// Canonical colon-form rendering (`/users/{id}/` becomes `/users/:id`)
    pub fn canonical(&self) -> String {
        self.render(|name| format!(":{}", name))
    }

    /// Rendering with parameter names erased
    ///
    /// Two patterns with the same shape can never both be reachable, so this
    /// is the identity used to detect ambiguous tables.
    pub fn shape(&self) -> String {
        self.render(|_| ":".to_string())
    }

    /// Substitute parameter values into the template
    ///
    /// Values are percent-encoded so that any string survives a trip through
    /// the matcher. `route` is only used to label errors.
    pub fn interpolate(
        &self,
        route: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, UnresolvableRouteError> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Param(name) => {
                    let value =
                        params
                            .get(name)
                            .ok_or_else(|| UnresolvableRouteError::MissingParameter {
                                route: route.to_string(),
                                param: name.clone(),
                            })?;
                    if value.is_empty() {
                        return Err(UnresolvableRouteError::EmptyParameter {
                            route: route.to_string(),
                            param: name.clone(),
                        });
                    }
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }
        Ok(path)
    }

    fn render(&self, param: impl Fn(&str) -> String) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => format!("/{}", text),
                Segment::Param(name) => format!("/{}", param(name)),
            })
            .collect()
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Validate one raw segment and parse it
fn parse_raw_segment(raw: &str) -> Result<Segment, String> {
    if raw.is_empty() {
        return Err("empty path segment".to_string());
    }
    if !braces_balanced(raw) {
        return Err(format!("unbalanced parameter delimiters in '{}'", raw));
    }

    match all_consuming(parse_segment)(raw) {
        Ok((_, segment)) => Ok(segment),
        Err(_) if raw.starts_with(':') || raw.starts_with('{') => {
            Err(format!("invalid parameter name in '{}'", raw))
        }
        Err(_) => Err(format!("parameter braces must wrap the whole segment '{}'", raw)),
    }
}

fn braces_balanced(raw: &str) -> bool {
    let mut depth = 0i32;
    for c in raw.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Parse a single segment
fn parse_segment(input: &str) -> IResult<&str, Segment> {
    alt((
        map(preceded(char(':'), parse_param_name), |name: &str| {
            Segment::Param(name.to_string())
        }),
        map(
            delimited(char('{'), parse_param_name, char('}')),
            |name: &str| Segment::Param(name.to_string()),
        ),
        map(
            recognize(pair(
                satisfy(|c| is_literal_char(c) && c != ':'),
                take_while(is_literal_char),
            )),
            |text: &str| Segment::Literal(text.to_string()),
        ),
    ))(input)
}

/// Parse a parameter name: `[A-Za-z_][A-Za-z0-9_]*`
fn parse_param_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn is_literal_char(c: char) -> bool {
    c != '/' && c != '{' && c != '}'
}
