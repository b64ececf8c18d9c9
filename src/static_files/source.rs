use crate::byte_source::AssetStream;
use crate::error::{AssetTableError, ServeError};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use super::StaticInfo;

/// Storage backend a static mount resolves against.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// Files below `base_path` on the local filesystem
    FileSystem { base_path: PathBuf },
    /// Assets compiled into (or loaded into) memory
    Memory(MemoryTable),
}

/// What a storage key points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    File,
    Directory,
    Missing,
}

impl AssetSource {
    pub fn filesystem<P: Into<PathBuf>>(base: P) -> Self {
        AssetSource::FileSystem {
            base_path: base.into(),
        }
    }

    pub fn memory(table: MemoryTable) -> Self {
        AssetSource::Memory(table)
    }

    /// Classify `key` (always `/`-rooted). Keys escaping the base directory are `Missing`.
    pub(crate) fn probe(&self, key: &str) -> EntryKind {
        match self {
            AssetSource::FileSystem { base_path } => match map_path(base_path, key) {
                Some(path) => match fs::metadata(&path) {
                    Ok(meta) if meta.is_file() => EntryKind::File,
                    Ok(meta) if meta.is_dir() => EntryKind::Directory,
                    _ => EntryKind::Missing,
                },
                None => EntryKind::Missing,
            },
            AssetSource::Memory(table) => {
                if table.get(key).is_some() {
                    EntryKind::File
                } else {
                    EntryKind::Missing
                }
            }
        }
    }

    /// Whether `key` denotes a directory. The memory backend has no directory entries,
    /// so with `memory_hint` enabled any key below `<key>/` marks it as one.
    pub(crate) fn is_directory(&self, key: &str, memory_hint: bool) -> bool {
        match self {
            AssetSource::FileSystem { .. } => self.probe(key) == EntryKind::Directory,
            AssetSource::Memory(table) => memory_hint && table.has_children(key),
        }
    }

    /// Open the entry a resolved descriptor selected.
    pub fn open_asset(&self, info: &StaticInfo) -> Result<AssetStream<'_>, ServeError> {
        self.open(&info.storage_path)
    }

    /// Open the entry stored under `key` for reading.
    pub fn open(&self, key: &str) -> Result<AssetStream<'_>, ServeError> {
        match self {
            AssetSource::FileSystem { base_path } => {
                let path = map_path(base_path, key).ok_or_else(|| {
                    ServeError::storage(
                        key,
                        io::Error::new(io::ErrorKind::InvalidInput, "path escapes base directory"),
                    )
                })?;
                let file = File::open(&path).map_err(|e| ServeError::storage(key, e))?;
                Ok(AssetStream::File(BufReader::new(file)))
            }
            AssetSource::Memory(table) => table
                .get(key)
                .map(AssetStream::Memory)
                .ok_or_else(|| {
                    ServeError::storage(
                        key,
                        io::Error::new(io::ErrorKind::NotFound, "no such memory asset"),
                    )
                }),
        }
    }
}

/// Map a `/`-rooted key below `base`, rejecting anything but plain components.
fn map_path(base: &Path, key: &str) -> Option<PathBuf> {
    let mut pb = base.to_path_buf();
    for comp in Path::new(key.trim_start_matches('/')).components() {
        match comp {
            Component::Normal(s) => pb.push(s),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(pb)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryAsset {
    pub path: Cow<'static, str>,
    pub data: Cow<'static, [u8]>,
}

/// In-memory asset table, keyed by `/`-rooted path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTable {
    entries: Vec<MemoryAsset>,
}

impl MemoryTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the parallel `paths` / `data` / `sizes` arrays produced by asset
    /// bundlers. `sizes[i]` bytes of `data[i]` belong to `paths[i]`.
    pub fn from_parallel(
        paths: &[&'static str],
        data: &[&'static [u8]],
        sizes: &[usize],
    ) -> Result<Self, AssetTableError> {
        if paths.len() != data.len() || paths.len() != sizes.len() {
            return Err(AssetTableError::LengthMismatch {
                paths: paths.len(),
                data: data.len(),
                sizes: sizes.len(),
            });
        }
        let mut table = Self::new();
        for ((&path, &bytes), &size) in paths.iter().zip(data).zip(sizes) {
            let slice = bytes
                .get(..size)
                .ok_or_else(|| AssetTableError::SizeOutOfBounds {
                    path: path.to_string(),
                    size,
                    available: bytes.len(),
                })?;
            table.insert(path, slice);
        }
        Ok(table)
    }

    /// Add an asset. Keys without a leading `/` get one.
    pub fn insert(
        &mut self,
        path: impl Into<Cow<'static, str>>,
        data: impl Into<Cow<'static, [u8]>>,
    ) -> &mut Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            Cow::Owned(format!("/{path}"))
        };
        self.entries.push(MemoryAsset {
            path,
            data: data.into(),
        });
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.path == key)
            .map(|e| e.data.as_ref())
    }

    fn has_children(&self, key: &str) -> bool {
        let dir = key.trim_end_matches('/');
        self.entries.iter().any(|e| {
            e.path
                .strip_prefix(dir)
                .is_some_and(|rest| rest.len() > 1 && rest.starts_with('/'))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryAsset> {
        self.entries.iter()
    }
}
