//! # CLI Module
//!
//! Command-line tools behind the `embedroute` binary.
//!
//! ## Commands
//!
//! ### `resolve`
//!
//! Resolve a path against a directory the way a static mount would:
//!
//! ```bash
//! embedroute resolve --root ./public /docs/
//! ```
//!
//! Prints the asset descriptor (`exists`, `storage_path`, `is_gzip`, `logical_path`,
//! ...) and the MIME type as JSON.
//!
//! ### `render`
//!
//! Stream a template to stdout:
//!
//! ```bash
//! embedroute render ./public/index.html --var title="A & B" --inject '<script src="/live.js"></script>'
//! ```
//!
//! ### `match`
//!
//! Check which pattern wins for a path:
//!
//! ```bash
//! embedroute match --route "GET /users/:id" --route "GET /users/new" GET /users/new
//! ```
//!
//! All commands accept `--config <FILE>` (or `EMBEDROUTE_CONFIG`) and honour the
//! `EMBEDROUTE_*` environment overrides.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{load_config, run_cli, run_command, Cli, Commands};
