use crate::router::ParamVec;
use http::Method;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Per-request identifier backed by ULID, sortable by arrival time.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RequestId(ulid::Ulid::from_string(s)?))
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A dispatched request as handlers see it.
///
/// `path` is percent-decoded and has the query string removed; `uri` is the raw
/// request target as received.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: RequestId,
    pub method: Method,
    pub uri: String,
    pub path: String,
    /// Route bindings in segment order; empty for static requests
    pub path_params: ParamVec,
    pub query_params: ParamVec,
}

impl Request {
    /// Build a request from a raw target and its decoded path.
    #[must_use]
    pub fn new(method: Method, uri: &str, path: String) -> Self {
        Self {
            id: RequestId::new(),
            method,
            uri: uri.to_string(),
            path,
            path_params: ParamVec::new(),
            query_params: parse_query_params(uri),
        }
    }

    /// Raw query string without the `?`, if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.split_once('?').map(|(_, q)| q)
    }

    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics when a name is bound twice.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        find_last(&self.path_params, name)
    }

    /// Get a query parameter by name (last occurrence wins).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        find_last(&self.query_params, name)
    }
}

fn find_last<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

/// Parse query string parameters from a request target
///
/// Extracts everything after the `?` and decodes names and values as
/// `application/x-www-form-urlencoded`, preserving order and repeats.
#[must_use]
pub fn parse_query_params(uri: &str) -> ParamVec {
    let Some((_, query)) = uri.split_once('?') else {
        return ParamVec::new();
    };
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}
