//! # embedroute
//!
//! **embedroute** is the routing core of a small embeddable HTTP server: a route table
//! with specificity ranking, a static asset resolver over filesystem or in-memory
//! sources, and a streaming template engine that renders HTML in bounded memory.
//!
//! ## Overview
//!
//! The crate owns no sockets. A transport parses requests, implements
//! [`server::ResponseSink`] for its connection and calls
//! [`dispatcher::Dispatcher::dispatch`]. Everything else happens here:
//!
//! - **[`router`]** - `:param` / `*wildcard` patterns, most specific match wins
//! - **[`static_files`]** - asset resolution with gzip variants and directory indexes
//! - **[`render`]** - `{{key}}` / `{{{key}}}` substitution and `<head>` injection,
//!   streamed in fixed-size chunks
//! - **[`dispatcher`]** - static mounts first, then routes, then 404
//! - **[`server`]** - `Request` / `Response` facades and the sink traits
//! - **[`handler`]** - handler traits, implemented by plain closures
//! - **[`config`]** / **[`logging`]** - explicit configuration and `tracing` setup
//!
//! ## Quick Start
//!
//! ```rust
//! use embedroute::dispatcher::{DispatchOutcome, Dispatcher};
//! use embedroute::server::RecordingSink;
//! use embedroute::static_files::{AssetSource, MemoryTable};
//! use http::Method;
//!
//! let mut table = MemoryTable::new();
//! table.insert("/index.html", &b"<html><head></head><h1>{{title}}</h1></html>"[..]);
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.serve_static("/", AssetSource::memory(table), |_info, _req, res| {
//!     res.set_template_handler(|key: &str, out: &mut dyn std::io::Write| {
//!         key == "title" && out.write_all(b"Welcome").is_ok()
//!     });
//!     res.set_head_injection("<script src=\"/reload.js\"></script>");
//!     res.send_static()
//! });
//!
//! let mut sink = RecordingSink::new();
//! assert_eq!(dispatcher.dispatch(&Method::GET, "/", &mut sink), DispatchOutcome::Static);
//! assert_eq!(
//!     sink.body_string(),
//!     "<html><head><script src=\"/reload.js\"></script></head><h1>Welcome</h1></html>"
//! );
//! ```
//!
//! ## Concurrency
//!
//! Registration happens once at start-up. Afterwards the dispatcher is only read, and
//! every per-request value (parameters, asset descriptor, template state) is created
//! per call, so one `&Dispatcher` can serve any number of worker threads.

pub mod byte_source;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod logging;
pub mod render;
pub mod router;
pub mod server;
pub mod static_files;

pub use config::ServerConfig;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{AssetTableError, DecodeError, PatternError, ServeError};
pub use handler::{RouteHandler, SendStatic, StaticHandler};
pub use router::Router;
