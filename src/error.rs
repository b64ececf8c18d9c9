//! Error types shared by the router, the static resolver and the response path.
//!
//! Every failure is mapped to an HTTP status at the layer that detects it. The only
//! error that never reaches a client is [`PatternError`], which is raised while routes
//! are being registered.

use http::StatusCode;
use std::io;
use thiserror::Error;

/// A route pattern could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `:` or `*` token without a name, e.g. `/users/:` or `/files/*`.
    #[error("pattern '{pattern}': segment {index} has an empty parameter name")]
    EmptyName { pattern: String, index: usize },
    /// A `*name` token followed by more segments.
    #[error("pattern '{pattern}': wildcard '*{name}' must be the last segment")]
    WildcardNotLast { pattern: String, name: String },
}

/// The request path contained an invalid percent escape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated percent escape at byte {0}")]
    Truncated(usize),
    #[error("invalid hex digit in percent escape at byte {0}")]
    InvalidHex(usize),
    #[error("decoded path is not valid UTF-8")]
    InvalidUtf8,
}

/// Parallel asset arrays handed to [`crate::static_files::MemoryTable::from_parallel`]
/// do not line up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetTableError {
    #[error("paths ({paths}), data ({data}) and sizes ({sizes}) must have the same length")]
    LengthMismatch {
        paths: usize,
        data: usize,
        sizes: usize,
    },
    #[error("entry '{path}' declares {size} bytes but only {available} are present")]
    SizeOutOfBounds {
        path: String,
        size: usize,
        available: usize,
    },
}

/// Failure while producing a response.
#[derive(Debug, Error)]
pub enum ServeError {
    /// No static asset and no dynamic route, or the asset does not exist.
    #[error("not found")]
    NotFound,
    /// The request path could not be decoded.
    #[error("bad request path: {0}")]
    Decode(#[from] DecodeError),
    /// Storage open/read failure while resolving or streaming an asset.
    #[error("asset source error for '{path}': {source}")]
    Source {
        path: String,
        #[source]
        source: io::Error,
    },
    /// The output sink rejected a write.
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),
    /// The response API was used out of order (e.g. a chunk before `begin_chunked`).
    #[error("invalid response state: {0}")]
    InvalidState(&'static str),
}

impl ServeError {
    /// Status code a client should see for this error, provided nothing was sent yet.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::NotFound => StatusCode::NOT_FOUND,
            ServeError::Decode(_) => StatusCode::BAD_REQUEST,
            ServeError::Source { .. }
            | ServeError::Transport(_)
            | ServeError::InvalidState(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn storage(path: impl Into<String>, source: io::Error) -> Self {
        ServeError::Source {
            path: path.into(),
            source,
        }
    }
}
