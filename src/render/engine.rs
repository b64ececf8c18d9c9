//! Streaming renderer: placeholder substitution, head injection and chunked output.

use crate::byte_source::ByteSource;
use crate::config::ServerConfig;
use crate::error::ServeError;
use crate::server::ChunkSink;
use std::collections::HashMap;
use std::io;
use thiserror::Error;
use tracing::debug;

use super::escape::escape_byte;
use super::head::HeadInjector;
use super::template::{finish, step, Action, TemplateState};

/// Supplies placeholder values.
///
/// Write the value for `key` into `out` and return `true`, or return `false` to leave
/// the placeholder in the output unchanged. Called once per placeholder occurrence;
/// the same key must produce the same value within one render.
pub trait TemplateResolver: Send + Sync {
    fn resolve(&self, key: &str, out: &mut dyn io::Write) -> bool;
}

impl<F> TemplateResolver for F
where
    F: Fn(&str, &mut dyn io::Write) -> bool + Send + Sync,
{
    fn resolve(&self, key: &str, out: &mut dyn io::Write) -> bool {
        self(key, out)
    }
}

impl TemplateResolver for HashMap<String, String> {
    fn resolve(&self, key: &str, out: &mut dyn io::Write) -> bool {
        match self.get(key) {
            Some(value) => out.write_all(value.as_bytes()).is_ok(),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Output byte budget per chunk
    pub chunk_size: usize,
    pub max_placeholder_len: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            max_placeholder_len: 256,
        }
    }
}

impl From<&ServerConfig> for RenderOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            chunk_size: config.render_chunk_size.max(1),
            max_placeholder_len: config.max_placeholder_len,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    /// Reading the template failed.
    #[error("template read failed: {0}")]
    Source(#[source] io::Error),
    /// The sink rejected a chunk; the render stopped at that point.
    #[error("chunk write failed: {0}")]
    Transport(#[source] io::Error),
}

impl RenderError {
    /// Attach the asset path for the response layer.
    #[must_use]
    pub fn into_serve_error(self, path: &str) -> ServeError {
        match self {
            RenderError::Source(source) => ServeError::storage(path, source),
            RenderError::Transport(err) => ServeError::Transport(err),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub bytes_written: usize,
    pub chunks: usize,
    pub substitutions: usize,
    pub unresolved: usize,
    pub injected: bool,
}

/// Accumulates output and flushes it to a sink in chunks of at most `budget` bytes.
pub struct ChunkWriter<'s, S: ChunkSink + ?Sized> {
    sink: &'s mut S,
    buf: Vec<u8>,
    budget: usize,
    written: usize,
    chunks: usize,
}

impl<'s, S: ChunkSink + ?Sized> ChunkWriter<'s, S> {
    pub fn new(sink: &'s mut S, budget: usize) -> Self {
        let budget = budget.max(1);
        Self {
            sink,
            buf: Vec::with_capacity(budget),
            budget,
            written: 0,
            chunks: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, byte: u8) -> io::Result<()> {
        // A failed flush leaves a full buffer behind
        if self.buf.len() >= self.budget {
            self.flush()?;
        }
        self.buf.push(byte);
        if self.buf.len() >= self.budget {
            self.flush()?;
        }
        Ok(())
    }

    pub fn push_slice(&mut self, mut bytes: &[u8]) -> io::Result<()> {
        while !bytes.is_empty() {
            let room = self.budget.saturating_sub(self.buf.len());
            if room == 0 {
                self.flush()?;
                continue;
            }
            let (now, rest) = bytes.split_at(room.min(bytes.len()));
            self.buf.extend_from_slice(now);
            bytes = rest;
            if self.buf.len() >= self.budget {
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Send buffered bytes, if any, as one chunk.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.sink.send_chunk(&self.buf)?;
        self.written += self.buf.len();
        self.chunks += 1;
        self.buf.clear();
        Ok(())
    }

    /// Flush the remainder and send the zero-length terminator.
    pub fn finish(mut self) -> io::Result<(usize, usize)> {
        self.flush()?;
        self.sink.send_chunk(&[])?;
        Ok((self.written, self.chunks))
    }
}

/// Output stage: every emitted byte goes through the head matcher, then the writer.
struct Output<'s, 'r, S: ChunkSink + ?Sized> {
    writer: ChunkWriter<'s, S>,
    injector: Option<(HeadInjector, &'r [u8])>,
    injected: bool,
}

impl<S: ChunkSink + ?Sized> Output<'_, '_, S> {
    #[inline]
    fn emit(&mut self, byte: u8) -> io::Result<()> {
        self.writer.push(byte)?;
        if let Some((injector, snippet)) = &mut self.injector {
            if injector.feed(byte) {
                let snippet = *snippet;
                self.writer.push_slice(snippet)?;
                self.injected = true;
                self.injector = None;
            }
        }
        Ok(())
    }

    fn emit_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.injector.is_none() {
            return self.writer.push_slice(bytes);
        }
        bytes.iter().try_for_each(|&b| self.emit(b))
    }
}

/// Renders a byte stream into a [`ChunkSink`].
///
/// Without a resolver the input passes through untouched (braces included); without a
/// snippet no head matching is done. Memory use is bounded by the chunk budget, the
/// placeholder limit and the longest resolved value.
///
/// ```rust
/// use embedroute::render::{RenderOptions, Renderer};
/// use embedroute::server::RecordingSink;
/// use std::collections::HashMap;
///
/// let vars = HashMap::from([("title".to_string(), "A & B".to_string())]);
/// let renderer = Renderer::new(RenderOptions::default())
///     .with_resolver(&vars)
///     .with_head_injection("<!--X-->");
///
/// let mut sink = RecordingSink::new();
/// let mut input: &[u8] = b"<head><title>{{title}}</title></head>";
/// renderer.render(&mut input, &mut sink).unwrap();
/// assert_eq!(sink.body_string(), "<head><!--X--><title>A &amp; B</title></head>");
/// ```
#[derive(Clone, Copy)]
pub struct Renderer<'r> {
    resolver: Option<&'r dyn TemplateResolver>,
    snippet: Option<&'r [u8]>,
    options: RenderOptions,
}

impl<'r> Renderer<'r> {
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self {
            resolver: None,
            snippet: None,
            options,
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: &'r dyn TemplateResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// An empty snippet disables injection.
    #[must_use]
    pub fn with_head_injection(mut self, snippet: &'r str) -> Self {
        self.snippet = (!snippet.is_empty()).then_some(snippet.as_bytes());
        self
    }

    /// Render all of `source` into `sink`, ending with the zero-length chunk.
    ///
    /// Stops at the first failed write; whatever was already sent stays sent.
    pub fn render<B, S>(&self, source: &mut B, sink: &mut S) -> Result<RenderStats, RenderError>
    where
        B: ByteSource + ?Sized,
        S: ChunkSink + ?Sized,
    {
        let mut out = Output {
            writer: ChunkWriter::new(sink, self.options.chunk_size),
            injector: self.snippet.map(|s| (HeadInjector::new(), s)),
            injected: false,
        };
        let mut stats = RenderStats::default();
        let mut state = TemplateState::Normal;
        let mut scratch = Vec::new();

        while let Some(byte) = source.read_byte().map_err(RenderError::Source)? {
            let Some(resolver) = self.resolver else {
                out.emit(byte).map_err(RenderError::Transport)?;
                continue;
            };
            let (next, actions) = step(
                std::mem::take(&mut state),
                byte,
                self.options.max_placeholder_len,
            );
            state = next;
            for action in actions {
                apply(action, resolver, &mut scratch, &mut out, &mut stats)
                    .map_err(RenderError::Transport)?;
            }
        }

        if let Some(rest) = finish(state) {
            out.emit_all(&rest).map_err(RenderError::Transport)?;
        }
        stats.injected = out.injected;
        let (bytes_written, chunks) = out.writer.finish().map_err(RenderError::Transport)?;
        stats.bytes_written = bytes_written;
        stats.chunks = chunks;

        debug!(
            bytes_written = stats.bytes_written,
            chunks = stats.chunks,
            substitutions = stats.substitutions,
            unresolved = stats.unresolved,
            injected = stats.injected,
            "Render complete"
        );
        Ok(stats)
    }
}

fn apply<S: ChunkSink + ?Sized>(
    action: Action,
    resolver: &dyn TemplateResolver,
    scratch: &mut Vec<u8>,
    out: &mut Output<'_, '_, S>,
    stats: &mut RenderStats,
) -> io::Result<()> {
    match action {
        Action::Emit(byte) => out.emit(byte),
        Action::Literal(bytes) => out.emit_all(&bytes),
        Action::Resolve { key, raw, literal } => {
            scratch.clear();
            if !resolver.resolve(&key, scratch) {
                stats.unresolved += 1;
                return out.emit_all(&literal);
            }
            stats.substitutions += 1;
            if raw {
                return out.emit_all(scratch);
            }
            for &byte in scratch.iter() {
                match escape_byte(byte) {
                    Some(entity) => out.emit_all(entity)?,
                    None => out.emit(byte)?,
                }
            }
            Ok(())
        }
    }
}
