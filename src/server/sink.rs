//! Output sinks: the transport-facing side of a response.
//!
//! The crate never touches sockets. A transport adapter implements [`ResponseSink`]
//! and receives a status line with headers, then either a whole body or a sequence of
//! chunks closed by a zero-length chunk.

use http::StatusCode;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::io::{self, Write};
use tracing::debug;

/// Maximum inline extra headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 8;

/// Extra response headers (name, value). Names are usually static.
pub type HeaderVec = SmallVec<[(Cow<'static, str>, String); MAX_INLINE_HEADERS]>;

/// Status, content type and extra headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub content_type: Cow<'static, str>,
    pub headers: HeaderVec,
}

impl ResponseHead {
    pub fn new(status: StatusCode, content_type: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            headers: HeaderVec::new(),
        }
    }

    /// Reason phrase for the status line
    #[must_use]
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Receives body chunks. A zero-length chunk terminates the body.
pub trait ChunkSink {
    fn send_chunk(&mut self, data: &[u8]) -> io::Result<()>;
}

/// A transport connection as seen by one response.
pub trait ResponseSink: ChunkSink {
    /// Send a complete response with a fixed-length body.
    fn send_response(&mut self, head: &ResponseHead, body: &[u8]) -> io::Result<()>;

    /// Start a chunked response; the body follows through [`ChunkSink::send_chunk`].
    fn send_head(&mut self, head: &ResponseHead) -> io::Result<()>;

    /// Called when a response fails after bytes were committed. Transports should
    /// close the connection; the client cannot be told anything else.
    fn abort(&mut self) {}
}

/// In-memory sink that records everything a response produced.
///
/// Used by tests and tools; [`RecordingSink::failing_after`] simulates a connection
/// that drops after a number of body chunks.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub head: Option<ResponseHead>,
    pub body: Vec<u8>,
    /// Sizes of the non-empty chunks received, in order
    pub chunks: Vec<usize>,
    pub chunked: bool,
    /// A complete response was delivered (fixed body or terminator chunk)
    pub finished: bool,
    pub aborted: bool,
    fail_after: Option<usize>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `chunks` non-empty chunks, then fail every further write.
    #[must_use]
    pub fn failing_after(chunks: usize) -> Self {
        Self {
            fail_after: Some(chunks),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.head.as_ref().map(|h| h.status)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.head.as_ref().map(|h| h.content_type.as_ref())
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.as_ref().and_then(|h| h.get_header(name))
    }

    /// Body as UTF-8 (lossy).
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn check_open(&self) -> io::Result<()> {
        match self.fail_after {
            Some(limit) if self.chunks.len() >= limit => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "recording sink closed",
            )),
            _ => Ok(()),
        }
    }
}

impl ChunkSink for RecordingSink {
    fn send_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.check_open()?;
        if data.is_empty() {
            self.finished = true;
        } else {
            self.chunks.push(data.len());
            self.body.extend_from_slice(data);
        }
        Ok(())
    }
}

impl ResponseSink for RecordingSink {
    fn send_response(&mut self, head: &ResponseHead, body: &[u8]) -> io::Result<()> {
        self.head = Some(head.clone());
        self.body.extend_from_slice(body);
        self.finished = true;
        Ok(())
    }

    fn send_head(&mut self, head: &ResponseHead) -> io::Result<()> {
        self.head = Some(head.clone());
        self.chunked = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

/// Writes body bytes to any [`Write`], discarding the head. Used to render to stdout.
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ChunkSink for WriteSink<W> {
    fn send_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        if data.is_empty() {
            self.inner.flush()
        } else {
            self.inner.write_all(data)
        }
    }
}

impl<W: Write> ResponseSink for WriteSink<W> {
    fn send_response(&mut self, head: &ResponseHead, body: &[u8]) -> io::Result<()> {
        debug!(status = %head.status, content_type = %head.content_type, "Writing response body");
        self.inner.write_all(body)?;
        self.inner.flush()
    }

    fn send_head(&mut self, head: &ResponseHead) -> io::Result<()> {
        debug!(status = %head.status, content_type = %head.content_type, "Writing chunked body");
        Ok(())
    }
}
