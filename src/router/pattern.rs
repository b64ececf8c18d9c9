//! Route pattern compilation.
//!
//! A pattern is a `/`-separated list of segments:
//!
//! | Token   | Segment                | Weight |
//! |---------|------------------------|--------|
//! | `users` | `Literal("users")`     | 3      |
//! | `:id`   | `Param("id")`          | 2      |
//! | `*rest` | `Wildcard("rest")`     | 1      |
//!
//! The specificity score of a pattern is the sum of its segment weights.

use crate::error::PatternError;
use smallvec::SmallVec;
use std::sync::Arc;

use super::core::ParamVec;

/// Path segments of a request, borrowed from the decoded path.
pub type PathSegments<'a> = SmallVec<[&'a str; 16]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Binds exactly one non-empty path segment
    Param(Arc<str>),
    /// Binds the rest of the path joined by `/`; only valid as the last segment
    Wildcard(Arc<str>),
}

impl Segment {
    #[must_use]
    pub fn weight(&self) -> u32 {
        match self {
            Segment::Literal(_) => 3,
            Segment::Param(_) => 2,
            Segment::Wildcard(_) => 1,
        }
    }
}

/// A compiled, immutable route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
    score: u32,
}

impl RoutePattern {
    /// Compile `pattern`. Anything after `?` is ignored.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let path = pattern.split('?').next().unwrap_or_default();
        let tokens = split_path(path);
        let last = tokens.len().saturating_sub(1);

        let mut segments = Vec::with_capacity(tokens.len());
        for (index, token) in tokens.iter().enumerate() {
            let segment = if let Some(name) = token.strip_prefix('*') {
                if name.is_empty() {
                    return Err(PatternError::EmptyName {
                        pattern: pattern.to_string(),
                        index,
                    });
                }
                if index != last {
                    return Err(PatternError::WildcardNotLast {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
                Segment::Wildcard(Arc::from(name))
            } else if let Some(name) = token.strip_prefix(':') {
                if name.is_empty() {
                    return Err(PatternError::EmptyName {
                        pattern: pattern.to_string(),
                        index,
                    });
                }
                Segment::Param(Arc::from(name))
            } else {
                Segment::Literal((*token).to_string())
            };
            segments.push(segment);
        }

        let score = segments.iter().map(Segment::weight).sum();
        Ok(Self {
            source: pattern.to_string(),
            segments,
            score,
        })
    }

    /// Pattern text as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Match already-split path segments, returning bindings in segment order.
    #[must_use]
    pub fn match_segments(&self, path: &[&str]) -> Option<ParamVec> {
        let mut params = ParamVec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => {
                    if path.get(i) != Some(&text.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = path.get(i)?;
                    params.push((Arc::clone(name), (*value).to_string()));
                }
                Segment::Wildcard(name) => {
                    let rest = path.get(i..)?;
                    params.push((Arc::clone(name), rest.join("/")));
                    return Some(params);
                }
            }
        }
        (path.len() == self.segments.len()).then_some(params)
    }
}

/// Split a path on `/`, ignoring the single leading slash.
///
/// `/` yields no segments; a trailing slash yields a trailing empty segment, so
/// `/users/` and `/users` are distinct paths.
#[must_use]
pub fn split_path(path: &str) -> PathSegments<'_> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return PathSegments::new();
    }
    trimmed.split('/').collect()
}
