use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::{info, trace};
use parking_lot::RwLock;

use crate::{CacheError, ImageSource};

type CacheFormat = HashMap<String, ImageSource>;

/// Advisory map from canonical identifier to the last reference thumbnail seen for it.
///
/// Shared by requests in the same batch. A miss only means the reference has to be
/// found again.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: RwLock<CacheFormat>,
}

fn cache_key(identifier: &str) -> String {
    identifier.trim().to_ascii_uppercase()
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<ImageSource> {
        self.entries.read().get(&cache_key(identifier)).cloned()
    }

    pub fn remember(&self, identifier: &str, reference: ImageSource) {
        trace!("remembering reference for {identifier}: {reference}");
        self.entries.write().insert(cache_key(identifier), reference);
    }

    pub fn forget(&self, identifier: &str) -> Option<ImageSource> {
        self.entries.write().remove(&cache_key(identifier))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Reads a snapshot written by [`ReferenceCache::save`]. A missing file gives an
    /// empty cache.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        if !path.exists() {
            info!("no reference cache at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let file = File::open(path).map_err(|src| CacheError::Io {
            path: path.to_path_buf(),
            src,
        })?;

        let entries: CacheFormat =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                CacheError::Deserialization {
                    path: path.to_path_buf(),
                    src: e.to_string(),
                }
            })?;

        trace!("loaded {} cached references from {}", entries.len(), path.display());
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Writes a snapshot to a uniquely named file next to `path` and renames it into
    /// place, so a crash mid-save leaves the previous snapshot intact.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let io_err = |src| CacheError::Io {
            path: path.to_path_buf(),
            src,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;

        let staged = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        let mut writer = BufWriter::new(staged);

        serde_json::to_writer(&mut writer, &*self.entries.read()).map_err(|e| {
            CacheError::Serialization {
                path: path.to_path_buf(),
                src: e.to_string(),
            }
        })?;
        writer.flush().map_err(io_err)?;

        let staged = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
        staged.as_file().sync_all().map_err(io_err)?;
        staged.persist(path).map_err(|e| io_err(e.error))?;

        info!("saved {} cached references to {}", self.len(), path.display());
        Ok(())
    }
}
