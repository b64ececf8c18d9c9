//! # Configuration Module
//!
//! Explicit configuration handed to [`crate::dispatcher::Dispatcher::with_config`].
//! Nothing in the crate reads process-wide state while dispatching; everything tunable
//! lives in [`ServerConfig`].
//!
//! ## Sources
//!
//! 1. Built-in defaults ([`ServerConfig::default`])
//! 2. An optional TOML file ([`ServerConfig::from_file`])
//! 3. Environment overrides ([`ServerConfig::apply_env`])
//!
//! ## Environment Variables
//!
//! ### `EMBEDROUTE_CHUNK_SIZE`
//!
//! Output byte budget of the render engine and read size for raw file streaming.
//! Accepts decimal (`512`) or hexadecimal (`0x200`). Default: `512`.
//!
//! ### `EMBEDROUTE_MAX_PLACEHOLDER`
//!
//! Longest placeholder key (in bytes) buffered between `{{` and `}}`. Default: `256`.
//!
//! ### `EMBEDROUTE_MEMORY_DIR_HINT`
//!
//! `true`/`false`. Whether the memory backend infers directories from keys sharing a
//! `<path>/` prefix. Default: `true`.
//!
//! ## Example
//!
//! ```toml
//! render_chunk_size = 1024
//! max_placeholder_len = 64
//! memory_directory_hint = false
//! index_files = ["index.html"]
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_CHUNK_SIZE: usize = 512;
pub const DEFAULT_MAX_PLACEHOLDER_LEN: usize = 256;

/// Server-wide settings, immutable once the dispatcher is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bytes accumulated before the render engine flushes a chunk (minimum 1)
    pub render_chunk_size: usize,
    /// Longest placeholder key text held in memory before it is flushed verbatim
    pub max_placeholder_len: usize,
    /// Infer memory-table directories from keys sharing a `<path>/` prefix
    pub memory_directory_hint: bool,
    /// Index documents probed, in order, when a request resolves to a directory
    pub index_files: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            render_chunk_size: DEFAULT_CHUNK_SIZE,
            max_placeholder_len: DEFAULT_MAX_PLACEHOLDER_LEN,
            memory_directory_hint: true,
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        let config: ServerConfig =
            toml::from_str(source).context("invalid embedroute configuration")?;
        Ok(config.normalized())
    }

    /// Load a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&source)
    }

    /// Defaults overridden by the `EMBEDROUTE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Apply `EMBEDROUTE_*` overrides on top of `self`. Unparseable values are logged
    /// and ignored.
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if let Ok(val) = env::var("EMBEDROUTE_CHUNK_SIZE") {
            match parse_size(&val) {
                Some(size) => self.render_chunk_size = size,
                None => warn!(value = %val, "Ignoring invalid EMBEDROUTE_CHUNK_SIZE"),
            }
        }
        if let Ok(val) = env::var("EMBEDROUTE_MAX_PLACEHOLDER") {
            match parse_size(&val) {
                Some(size) => self.max_placeholder_len = size,
                None => warn!(value = %val, "Ignoring invalid EMBEDROUTE_MAX_PLACEHOLDER"),
            }
        }
        if let Ok(val) = env::var("EMBEDROUTE_MEMORY_DIR_HINT") {
            match val.trim().parse::<bool>() {
                Ok(flag) => self.memory_directory_hint = flag,
                Err(_) => warn!(value = %val, "Ignoring invalid EMBEDROUTE_MEMORY_DIR_HINT"),
            }
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.render_chunk_size = self.render_chunk_size.max(1);
        self
    }
}

/// Parse a byte count written in decimal or `0x`-prefixed hexadecimal.
fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}
