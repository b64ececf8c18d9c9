//! # Static Files Module
//!
//! Resolves request paths against a storage backend and describes what should be sent.
//!
//! ## Backends
//!
//! [`AssetSource`] is either a directory on the filesystem or a [`MemoryTable`] of
//! compiled-in assets. Both are probed through the same operations, so the resolver
//! never branches on where bytes live.
//!
//! ## Resolution
//!
//! [`resolve`] turns a mount-relative path into a [`StaticInfo`]:
//!
//! - `GET /app.js` with `app.js.gz` present selects the compressed file and keeps
//!   `/app.js` as the logical path (MIME type, render eligibility)
//! - `GET /app.js.gz` matches only the literal `.gz` entry
//! - directories fall back to `index.html`, then `index.htm` (gzip variants first)
//!
//! ## Example
//!
//! ```rust
//! use embedroute::config::ServerConfig;
//! use embedroute::static_files::{resolve, AssetSource, MemoryTable};
//!
//! let mut table = MemoryTable::new();
//! table.insert("/docs/index.html.gz", &b"\x1f\x8b"[..]);
//! let source = AssetSource::memory(table);
//!
//! let info = resolve(&source, "/docs/", &ServerConfig::default());
//! assert!(info.exists && info.is_gzip);
//! assert_eq!(info.logical_path, "/docs/index.html");
//! ```

pub mod mime;
mod resolve;
mod source;

pub use resolve::{resolve, StaticInfo};
pub use source::{AssetSource, MemoryAsset, MemoryTable};
