//! On-disk cache of raw directions responses.
//!
//! Entries are keyed by the SHA-256 of the request's canonical JSON and stored verbatim as
//! `directions.<hex>.json`. A cache hit never reaches the wrapped provider, so repeated
//! runs with identical parameters issue no duplicate queries. Only responses with an
//! `OK` status are written, and every write lands through a temporary file followed by a
//! rename so a crash cannot leave a partial entry behind.
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::directions::response::DirectionsResponse;
use crate::directions::{DirectionsProvider, DirectionsRequest};
use crate::error::{Error, Result};

const ENTRY_PREFIX: &str = "directions.";
const ENTRY_SUFFIX: &str = ".json";

/// Stable hex key for a request.
pub fn cache_key(request: &DirectionsRequest) -> Result<String> {
    let canonical = serde_json::to_vec(request)?;
    Ok(format!("{:x}", Sha256::digest(&canonical)))
}

/// Hit/miss counters for one cache instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub writes: usize,
}

/// A [`DirectionsProvider`] that consults a cache directory before the wrapped provider.
#[derive(Debug)]
pub struct CachedDirections<P> {
    inner: P,
    dir: PathBuf,
    stats: CacheStats,
}

impl<P: DirectionsProvider> CachedDirections<P> {
    /// Wrap `inner`, creating `dir` if needed.
    pub fn new(inner: P, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| Error::Cache {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            inner,
            dir,
            stats: CacheStats::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    /// Path of the entry for a request, whether or not it exists.
    pub fn entry_path(&self, request: &DirectionsRequest) -> Result<PathBuf> {
        let key = cache_key(request)?;
        Ok(self.dir.join(format!("{ENTRY_PREFIX}{key}{ENTRY_SUFFIX}")))
    }

    /// True if a response for the request is cached.
    pub fn contains(&self, request: &DirectionsRequest) -> Result<bool> {
        Ok(self.entry_path(request)?.is_file())
    }

    fn read_entry(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Cache {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn write_entry(path: &Path, raw: &str) -> Result<()> {
        let tmp = path.with_extension(format!("json.tmp-{}", std::process::id()));
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(raw.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, path)
        };
        write().map_err(|source| {
            let _ = fs::remove_file(&tmp);
            Error::Cache {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

impl<P: DirectionsProvider> DirectionsProvider for CachedDirections<P> {
    fn fetch(&mut self, request: &DirectionsRequest) -> Result<String> {
        let path = self.entry_path(request)?;

        if let Some(raw) = Self::read_entry(&path)? {
            self.stats.hits += 1;
            debug!("Using cached file {} for {:?}.", path.display(), request);
            return Ok(raw);
        }

        self.stats.misses += 1;
        info!(
            "Querying provider for {} -> {}.",
            request.origin, request.destination
        );
        let raw = self.inner.fetch(request)?;

        let cacheable = DirectionsResponse::parse(&raw)
            .map(|r| r.is_ok())
            .unwrap_or(false);
        if cacheable {
            Self::write_entry(&path, &raw)?;
            self.stats.writes += 1;
            debug!("Saved response to {}.", path.display());
        }

        Ok(raw)
    }
}
