use super::mime;
use super::source::{AssetSource, EntryKind};
use crate::config::ServerConfig;
use serde::Serialize;
use tracing::debug;

/// Result of resolving one request path against an [`AssetSource`].
///
/// Built fresh for every request and consumed by the response that sends it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StaticInfo {
    /// Request URI as received (before prefix stripping)
    pub uri: String,
    /// Path relative to the mount, always starting with `/`
    pub rel_path: String,
    /// Storage key of the selected entry (may be a `.gz` variant or an index document)
    pub storage_path: String,
    pub exists: bool,
    /// The request named a directory
    pub is_dir: bool,
    /// The selected entry is gzip-compressed
    pub is_gzip: bool,
    /// Decompressed name, used for the MIME type and render eligibility
    pub logical_path: String,
}

impl StaticInfo {
    fn missing(rel_path: &str) -> Self {
        Self {
            uri: rel_path.to_string(),
            rel_path: rel_path.to_string(),
            logical_path: rel_path.to_string(),
            ..Self::default()
        }
    }

    /// Attach the original request URI.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        mime::content_type(&self.logical_path)
    }

    /// Plain (uncompressed) HTML, which the render engine can rewrite.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        !self.is_gzip && mime::is_html(&self.logical_path)
    }
}

struct Selected {
    storage_path: String,
    is_gzip: bool,
    logical_path: String,
}

/// Resolve `rel_path` against `source`.
///
/// Never fails: the returned descriptor always carries a definitive `exists` flag and
/// turning `exists == false` into a 404 is the caller's job.
///
/// Selection order:
/// 1. a path already ending in `.gz` only ever matches that literal entry;
/// 2. otherwise `<path>.gz` wins over `<path>`;
/// 3. a directory (trailing `/`, a filesystem directory, or a memory key prefix when
///    `memory_directory_hint` is on) probes each of `index_files`, gzip variant first.
#[must_use]
pub fn resolve(source: &AssetSource, rel_path: &str, config: &ServerConfig) -> StaticInfo {
    let mut info = StaticInfo::missing(rel_path);

    if let Some(stripped) = rel_path.strip_suffix(".gz") {
        if source.probe(rel_path) == EntryKind::File {
            info.apply(Selected {
                storage_path: rel_path.to_string(),
                is_gzip: true,
                logical_path: stripped.to_string(),
            });
        }
        debug!(rel_path = %rel_path, exists = info.exists, "Resolved literal gzip asset");
        return info;
    }

    if !rel_path.ends_with('/') {
        if let Some(selected) = probe_variants(source, rel_path) {
            info.apply(selected);
            debug!(rel_path = %rel_path, storage_path = %info.storage_path, gzip = info.is_gzip, "Resolved static asset");
            return info;
        }
        if !source.is_directory(rel_path, config.memory_directory_hint) {
            debug!(rel_path = %rel_path, "Static asset not found");
            return info;
        }
        info.is_dir = true;
    }

    let dir = rel_path.trim_end_matches('/');
    for index in &config.index_files {
        let candidate = format!("{dir}/{index}");
        if let Some(selected) = probe_variants(source, &candidate) {
            info.is_dir = true;
            info.apply(selected);
            debug!(rel_path = %rel_path, storage_path = %info.storage_path, gzip = info.is_gzip, "Resolved directory index");
            return info;
        }
    }

    if !info.is_dir {
        info.is_dir = source.is_directory(rel_path, config.memory_directory_hint);
    }
    debug!(rel_path = %rel_path, is_dir = info.is_dir, "Directory has no index document");
    info
}

impl StaticInfo {
    fn apply(&mut self, selected: Selected) {
        self.exists = true;
        self.storage_path = selected.storage_path;
        self.is_gzip = selected.is_gzip;
        self.logical_path = selected.logical_path;
    }
}

fn probe_variants(source: &AssetSource, path: &str) -> Option<Selected> {
    let gz = format!("{path}.gz");
    if source.probe(&gz) == EntryKind::File {
        return Some(Selected {
            storage_path: gz,
            is_gzip: true,
            logical_path: path.to_string(),
        });
    }
    if source.probe(path) == EntryKind::File {
        return Some(Selected {
            storage_path: path.to_string(),
            is_gzip: false,
            logical_path: path.to_string(),
        });
    }
    None
}
