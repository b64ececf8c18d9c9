use crate::byte_source::AssetStream;
use crate::config::ServerConfig;
use crate::error::ServeError;
use crate::render::{RenderOptions, Renderer, TemplateResolver};
use crate::static_files::{resolve, AssetSource, StaticInfo};
use http::StatusCode;
use serde_json::Value;
use std::borrow::Cow;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::debug;

use super::sink::{ChunkSink, HeaderVec, ResponseHead, ResponseSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyState {
    Idle,
    Chunked,
    Finished,
}

/// Response facade handed to handlers.
///
/// Tracks what has reached the sink. A chunked response does not write its head until
/// the first chunk, so a failure before any body byte can still become an error
/// status. Once [`Response::is_committed`] is true the status can no longer change.
pub struct Response<'s> {
    sink: &'s mut dyn ResponseSink,
    config: &'s ServerConfig,
    state: BodyState,
    pending_head: Option<ResponseHead>,
    committed: bool,
    status: Option<StatusCode>,
    headers: HeaderVec,
    template: Option<Arc<dyn TemplateResolver>>,
    head_injection: Option<Arc<str>>,
    static_ctx: Option<(StaticInfo, &'s AssetSource)>,
}

impl<'s> Response<'s> {
    pub fn new(sink: &'s mut dyn ResponseSink, config: &'s ServerConfig) -> Self {
        Self {
            sink,
            config,
            state: BodyState::Idle,
            pending_head: None,
            committed: false,
            status: None,
            headers: HeaderVec::new(),
            template: None,
            head_injection: None,
            static_ctx: None,
        }
    }

    /// Attach the asset a static mount resolved, for [`Response::send_static`].
    #[must_use]
    pub fn with_static(mut self, info: StaticInfo, source: &'s AssetSource) -> Self {
        self.static_ctx = Some((info, source));
        self
    }

    #[must_use]
    pub fn static_info(&self) -> Option<&StaticInfo> {
        self.static_ctx.as_ref().map(|(info, _)| info)
    }

    /// Bytes (or a head) have reached the sink.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Nothing has been sent and no chunked response was started.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == BodyState::Idle
    }

    /// Status of the response started so far.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[must_use]
    pub fn is_chunked(&self) -> bool {
        self.state == BodyState::Chunked
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == BodyState::Finished
    }

    /// Add a header to the next head written.
    pub fn set_header(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn set_template_handler(&mut self, resolver: impl TemplateResolver + 'static) {
        self.template = Some(Arc::new(resolver));
    }

    /// Share one resolver between many responses.
    pub fn set_template_arc(&mut self, resolver: Arc<dyn TemplateResolver>) {
        self.template = Some(resolver);
    }

    pub fn clear_template_handler(&mut self) {
        self.template = None;
    }

    /// Snippet inserted after the first `<head>` tag of rendered HTML. Empty disables.
    pub fn set_head_injection(&mut self, snippet: impl Into<Arc<str>>) {
        let snippet = snippet.into();
        self.head_injection = (!snippet.is_empty()).then_some(snippet);
    }

    pub fn clear_head_injection(&mut self) {
        self.head_injection = None;
    }

    fn make_head(&mut self, status: StatusCode, content_type: Cow<'static, str>) -> ResponseHead {
        self.status = Some(status);
        ResponseHead {
            status,
            content_type,
            headers: std::mem::take(&mut self.headers),
        }
    }

    fn ensure_idle(&self) -> Result<(), ServeError> {
        match self.state {
            BodyState::Idle => Ok(()),
            BodyState::Chunked => Err(ServeError::InvalidState("a chunked response is in progress")),
            BodyState::Finished => Err(ServeError::InvalidState("response already sent")),
        }
    }

    /// Send a complete response with a fixed-length body.
    pub fn send(
        &mut self,
        status: StatusCode,
        content_type: impl Into<Cow<'static, str>>,
        body: &[u8],
    ) -> Result<(), ServeError> {
        self.ensure_idle()?;
        let head = self.make_head(status, content_type.into());
        debug!(status = %status, reason = head.reason(), body_len = body.len(), "Sending response");
        self.committed = true;
        self.state = BodyState::Finished;
        self.sink
            .send_response(&head, body)
            .map_err(ServeError::Transport)
    }

    pub fn send_text(
        &mut self,
        status: StatusCode,
        content_type: impl Into<Cow<'static, str>>,
        text: &str,
    ) -> Result<(), ServeError> {
        self.send(status, content_type, text.as_bytes())
    }

    pub fn send_json(&mut self, status: StatusCode, body: &Value) -> Result<(), ServeError> {
        self.send(status, "application/json", body.to_string().as_bytes())
    }

    /// Start a chunked response. The head is written with the first chunk.
    pub fn begin_chunked(
        &mut self,
        status: StatusCode,
        content_type: impl Into<Cow<'static, str>>,
    ) -> Result<(), ServeError> {
        self.ensure_idle()?;
        let head = self.make_head(status, content_type.into());
        self.pending_head = Some(head);
        self.state = BodyState::Chunked;
        Ok(())
    }

    /// Send one body chunk. An empty chunk ends the response.
    pub fn send_chunk(&mut self, data: &[u8]) -> Result<(), ServeError> {
        if self.state != BodyState::Chunked {
            return Err(ServeError::InvalidState("send_chunk outside a chunked response"));
        }
        self.write_chunk(data).map_err(ServeError::Transport)
    }

    /// Write the zero-length terminator.
    pub fn end_chunked(&mut self) -> Result<(), ServeError> {
        self.send_chunk(&[])
    }

    fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        if let Some(head) = self.pending_head.take() {
            self.committed = true;
            self.sink.send_head(&head)?;
        }
        if data.is_empty() {
            self.state = BodyState::Finished;
        }
        self.sink.send_chunk(data)
    }

    /// Redirect with `302 Found`.
    pub fn redirect(&mut self, location: &str) -> Result<(), ServeError> {
        self.redirect_with(location, StatusCode::FOUND)
    }

    pub fn redirect_with(&mut self, location: &str, status: StatusCode) -> Result<(), ServeError> {
        self.set_header("location", location);
        self.send(status, "text/plain", &[])
    }

    /// Send the asset the static mount resolved for this request.
    pub fn send_static(&mut self) -> Result<(), ServeError> {
        let Some((info, source)) = self.static_ctx.clone() else {
            return Err(ServeError::InvalidState("no static asset for this response"));
        };
        self.send_asset(&info, source)
    }

    /// Resolve `path` on `source` and send it like a static asset.
    pub fn send_file(&mut self, source: &AssetSource, path: &str) -> Result<(), ServeError> {
        let info = resolve(source, path, self.config);
        self.send_asset(&info, source)
    }

    fn send_asset(&mut self, info: &StaticInfo, source: &AssetSource) -> Result<(), ServeError> {
        self.ensure_idle()?;
        if !info.exists {
            return Err(ServeError::NotFound);
        }
        let stream = source.open_asset(info)?;
        let content_type = info.content_type();
        if info.is_gzip {
            self.set_header("content-encoding", "gzip");
        }

        let render = info.is_renderable() && (self.template.is_some() || self.head_injection.is_some());
        debug!(
            storage_path = %info.storage_path,
            content_type = content_type,
            gzip = info.is_gzip,
            render = render,
            "Serving static asset"
        );

        if render {
            return self.render_asset(info, stream, content_type);
        }
        if let Some(data) = stream.as_slice() {
            return self.send(StatusCode::OK, content_type, data);
        }
        self.stream_asset(info, stream, content_type)
    }

    fn render_asset(
        &mut self,
        info: &StaticInfo,
        mut stream: AssetStream<'_>,
        content_type: &'static str,
    ) -> Result<(), ServeError> {
        let template = self.template.clone();
        let snippet = self.head_injection.clone();
        let mut renderer = Renderer::new(RenderOptions::from(self.config));
        if let Some(resolver) = template.as_deref() {
            renderer = renderer.with_resolver(resolver);
        }
        if let Some(snippet) = snippet.as_deref() {
            renderer = renderer.with_head_injection(snippet);
        }

        self.begin_chunked(StatusCode::OK, content_type)?;
        renderer
            .render(&mut stream, &mut ChunkedBody { res: self })
            .map(|_| ())
            .map_err(|e| e.into_serve_error(&info.storage_path))
    }

    fn stream_asset(
        &mut self,
        info: &StaticInfo,
        mut stream: AssetStream<'_>,
        content_type: &'static str,
    ) -> Result<(), ServeError> {
        self.begin_chunked(StatusCode::OK, content_type)?;
        let mut buf = vec![0u8; self.config.render_chunk_size.max(1)];
        loop {
            let n = match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ServeError::storage(info.storage_path.as_str(), e)),
            };
            self.write_chunk(&buf[..n]).map_err(ServeError::Transport)?;
        }
        self.write_chunk(&[]).map_err(ServeError::Transport)
    }

    /// Drop a chunked response whose head never reached the sink, so an error status
    /// can still be sent. Returns `false` once anything was committed.
    pub(crate) fn discard_pending(&mut self) -> bool {
        if self.committed {
            return false;
        }
        self.pending_head = None;
        self.headers.clear();
        self.status = None;
        self.state = BodyState::Idle;
        true
    }

    /// Give up on a committed response; the transport should drop the connection.
    pub(crate) fn abort(&mut self) {
        self.state = BodyState::Finished;
        self.sink.abort();
    }
}

/// Routes render output through the response so the head is committed lazily.
struct ChunkedBody<'a, 's> {
    res: &'a mut Response<'s>,
}

impl ChunkSink for ChunkedBody<'_, '_> {
    fn send_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.res.write_chunk(data)
    }
}

/// Send a small JSON error document, e.g. `{"error": "Not Found", "method": "GET", "path": "/x"}`.
pub fn write_json_error(res: &mut Response<'_>, status: StatusCode, body: Value) -> Result<(), ServeError> {
    res.send_json(status, &body)
}
