//! Dispatcher core - static mounts, route table and response finishing.

use crate::config::ServerConfig;
use crate::error::{PatternError, ServeError};
use crate::handler::{RouteHandler, StaticHandler};
use crate::router::Router;
use crate::server::{write_json_error, Request, Response, ResponseSink};
use crate::static_files::{resolve, AssetSource, StaticInfo};
use http::{Method, StatusCode};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};

use super::decode::decode_path;

/// How a dispatch ended. The response itself has already gone to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A static mount served the request
    Static,
    /// A dynamic route handler served the request
    Route,
    /// 404, from the default body or the not-found handler
    NotFound,
    /// The path could not be decoded; 400 was sent
    BadRequest,
    /// A handler failed before committing; this status was sent instead
    Failed(StatusCode),
    /// A handler failed after committing; the sink was told to abort
    Aborted,
}

struct StaticMount {
    /// Normalised prefix: empty for the root, otherwise `/x` without a trailing slash
    prefix: String,
    source: AssetSource,
    handler: Arc<dyn StaticHandler>,
}

impl StaticMount {
    /// Path below the mount, or `None` when the mount does not cover `path`.
    fn relative<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Routes requests to static mounts and dynamic handlers.
///
/// Built single-threaded at start-up, then shared read-only (`&Dispatcher` is `Sync`).
/// For `GET` requests the static mounts are tried first, in registration order; the
/// first mount whose source holds the asset serves it. Everything else goes to the
/// route table.
pub struct Dispatcher {
    router: Router<Arc<dyn RouteHandler>>,
    mounts: Vec<StaticMount>,
    not_found: Option<Arc<dyn RouteHandler>>,
    config: ServerConfig,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            router: Router::new(),
            mounts: Vec::new(),
            not_found: None,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[must_use]
    pub fn router(&self) -> &Router<Arc<dyn RouteHandler>> {
        &self.router
    }

    /// Register a dynamic route.
    pub fn on<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<(), PatternError>
    where
        F: Fn(&Request, &mut Response<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.on_handler(method, pattern, Arc::new(handler))
    }

    pub fn on_handler(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Arc<dyn RouteHandler>,
    ) -> Result<(), PatternError> {
        self.router.register(method, pattern, handler)
    }

    /// Mount `source` under `prefix` (`""` or `"/"` for the root).
    pub fn serve_static<F>(&mut self, prefix: &str, source: AssetSource, handler: F)
    where
        F: Fn(&StaticInfo, &Request, &mut Response<'_>) -> Result<(), ServeError>
            + Send
            + Sync
            + 'static,
    {
        self.serve_static_handler(prefix, source, Arc::new(handler));
    }

    pub fn serve_static_handler(&mut self, prefix: &str, source: AssetSource, handler: Arc<dyn StaticHandler>) {
        let prefix = normalize_prefix(prefix);
        info!(prefix = %prefix, mounts_count = self.mounts.len() + 1, "Static source mounted");
        self.mounts.push(StaticMount {
            prefix,
            source,
            handler,
        });
    }

    /// Handler for requests nothing else matched. It should send a 404 itself.
    pub fn set_not_found<F>(&mut self, handler: F)
    where
        F: Fn(&Request, &mut Response<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(handler));
    }

    /// Serve one request. `raw` is the request target, query string included.
    pub fn dispatch(&self, method: &Method, raw: &str, sink: &mut dyn ResponseSink) -> DispatchOutcome {
        let start = Instant::now();
        let raw_path = raw.split_once('?').map_or(raw, |(path, _)| path);
        let span = info_span!("request", method = %method, path = %raw_path, request_id = tracing::field::Empty);
        let _enter = span.enter();

        let path = match decode_path(raw_path) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Malformed request path");
                let mut res = Response::new(sink, &self.config);
                let body = json!({
                    "error": "Bad Request",
                    "method": method.as_str(),
                    "path": raw_path,
                    "details": e.to_string(),
                });
                if write_json_error(&mut res, StatusCode::BAD_REQUEST, body).is_err() {
                    res.abort();
                    return DispatchOutcome::Aborted;
                }
                return DispatchOutcome::BadRequest;
            }
        };
        let mut req = Request::new(method.clone(), raw, path);
        span.record("request_id", tracing::field::display(req.id));

        let outcome = self
            .dispatch_static(&req, sink)
            .or_else(|| self.dispatch_route(&mut req, sink))
            .unwrap_or_else(|| self.dispatch_not_found(&req, sink));

        info!(
            outcome = ?outcome,
            latency_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
        outcome
    }

    fn dispatch_static(&self, req: &Request, sink: &mut dyn ResponseSink) -> Option<DispatchOutcome> {
        if req.method != Method::GET {
            return None;
        }
        for mount in &self.mounts {
            let Some(rel) = mount.relative(&req.path) else {
                continue;
            };
            let info = resolve(&mount.source, rel, &self.config).with_uri(req.uri.as_str());
            if !info.exists {
                debug!(prefix = %mount.prefix, rel_path = %rel, "Mount has no such asset");
                continue;
            }
            debug!(
                prefix = %mount.prefix,
                storage_path = %info.storage_path,
                gzip = info.is_gzip,
                "Static asset matched"
            );
            let mut res = Response::new(sink, &self.config).with_static(info.clone(), &mount.source);
            let result = mount.handler.invoke(&info, req, &mut res);
            return Some(self.finish(result, req, &mut res, DispatchOutcome::Static));
        }
        None
    }

    fn dispatch_route(&self, req: &mut Request, sink: &mut dyn ResponseSink) -> Option<DispatchOutcome> {
        let route_match = self.router.route_path(&req.method, &req.path)?;
        info!(
            route_pattern = %route_match.route.pattern.as_str(),
            path_params = ?route_match.path_params,
            "Request dispatched to handler"
        );
        req.path_params = route_match.path_params;
        let mut res = Response::new(sink, &self.config);
        let result = route_match.route.handler.invoke(req, &mut res);
        Some(self.finish(result, req, &mut res, DispatchOutcome::Route))
    }

    fn dispatch_not_found(&self, req: &Request, sink: &mut dyn ResponseSink) -> DispatchOutcome {
        let mut res = Response::new(sink, &self.config);
        match &self.not_found {
            Some(handler) => {
                let result = handler.invoke(req, &mut res);
                self.finish(result, req, &mut res, DispatchOutcome::NotFound)
            }
            None => self.send_error(req, &mut res, StatusCode::NOT_FOUND),
        }
    }

    /// Settle a handler result against what the response already sent.
    fn finish(
        &self,
        result: Result<(), ServeError>,
        req: &Request,
        res: &mut Response<'_>,
        served: DispatchOutcome,
    ) -> DispatchOutcome {
        match result {
            Ok(()) if res.is_finished() => served,
            Ok(()) if res.is_chunked() => match res.end_chunked() {
                Ok(()) => served,
                Err(e) => {
                    warn!(error = %e, "Failed to terminate chunked response");
                    res.abort();
                    DispatchOutcome::Aborted
                }
            },
            Ok(()) => {
                error!("Handler returned without sending a response");
                self.send_error(req, res, StatusCode::INTERNAL_SERVER_ERROR)
            }
            Err(e) if res.discard_pending() => {
                let status = e.status();
                if status.is_server_error() {
                    error!(error = %e, status = %status, "Handler failed");
                } else {
                    debug!(error = %e, status = %status, "Handler returned error status");
                }
                self.send_error(req, res, status)
            }
            Err(e) if res.is_finished() && !matches!(e, ServeError::Transport(_)) => {
                warn!(error = %e, status = ?res.status(), "Handler failed after completing its response");
                served
            }
            Err(e) => {
                error!(error = %e, status = ?res.status(), "Response failed after commit, aborting connection");
                res.abort();
                DispatchOutcome::Aborted
            }
        }
    }

    fn send_error(&self, req: &Request, res: &mut Response<'_>, status: StatusCode) -> DispatchOutcome {
        let body = json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "method": req.method.as_str(),
            "path": req.path,
        });
        if let Err(e) = write_json_error(res, status, body) {
            warn!(error = %e, "Failed to send error response");
            res.abort();
            return DispatchOutcome::Aborted;
        }
        match status {
            StatusCode::NOT_FOUND => DispatchOutcome::NotFound,
            StatusCode::BAD_REQUEST => DispatchOutcome::BadRequest,
            _ => DispatchOutcome::Failed(status),
        }
    }
}
