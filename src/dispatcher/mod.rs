//! # Dispatcher Module
//!
//! Turns a method and raw request target into exactly one response on a
//! [`ResponseSink`](crate::server::ResponseSink).
//!
//! ## Request Flow
//!
//! 1. Strip the query string and percent-decode the path (malformed escapes → 400)
//! 2. For `GET`, try each static mount in registration order; the first whose source
//!    holds the asset runs its [`StaticHandler`](crate::handler::StaticHandler)
//! 3. Otherwise match the route table and run the winning
//!    [`RouteHandler`](crate::handler::RouteHandler)
//! 4. Otherwise run the not-found handler, or send a JSON 404
//!
//! ## Error Handling
//!
//! - A handler that returns `Ok(())` without responding gets a 500
//! - A handler error becomes its status while nothing has been committed
//! - After commit the status cannot change; the sink is told to abort instead
//!
//! ## Example
//!
//! ```rust
//! use embedroute::dispatcher::{DispatchOutcome, Dispatcher};
//! use embedroute::server::RecordingSink;
//! use http::{Method, StatusCode};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher
//!     .on(Method::GET, "/hello/:name", |req, res| {
//!         let name = req.get_path_param("name").unwrap_or("world");
//!         res.send_text(StatusCode::OK, "text/plain", &format!("hello {name}"))
//!     })
//!     .unwrap();
//!
//! let mut sink = RecordingSink::new();
//! let outcome = dispatcher.dispatch(&Method::GET, "/hello/ann", &mut sink);
//! assert_eq!(outcome, DispatchOutcome::Route);
//! assert_eq!(sink.body_string(), "hello ann");
//! ```

mod core;
pub mod decode;

pub use self::core::{DispatchOutcome, Dispatcher};
pub use decode::decode_path;
