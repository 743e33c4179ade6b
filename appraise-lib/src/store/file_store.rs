//! A result store backed by one JSON file per artifact.
//!
//! Each file holds the latest [`AnalyzerOutput`] for the artifact plus every successful
//! metric result, each stamped with the time it was computed so that it can expire
//! independently of the others.

use super::{ResultStore, StorageError};
use crate::artifacts::sanitize_path_component;
use crate::metrics::MetricResult;
use crate::pipeline::AnalyzerOutput;
use chrono::{DateTime, Utc};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "     store";

/// On-disk representation of a stored value.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct Envelope<T> {
    timestamp: DateTime<Utc>,
    payload: T,
}

/// Everything stored for one artifact.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct StoredArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<Envelope<AnalyzerOutput>>,

    #[serde(default)]
    results: BTreeMap<String, Envelope<MetricResult>>,
}

/// A TTL-aware, directory-backed JSON result store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    ttl: Duration,
    now: DateTime<Utc>,
    ignore_cached: bool,
}

impl FileStore {
    /// Create a store rooted at `dir`.
    ///
    /// Results older than `ttl` relative to `now` are ignored, as is everything when
    /// `ignore_cached` is set. Outputs are still written in either case.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration, now: DateTime<Utc>, ignore_cached: bool) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            now,
            ignore_cached,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, artifact_key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_path_component(artifact_key)))
    }

    fn load(&self, path: &Path) -> Result<Option<StoredArtifact>, StorageError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(stored) => Ok(Some(stored)),
            Err(e) => {
                // a corrupt entry is only a miss; it gets overwritten by the next save
                log::debug!(target: LOG_TARGET, "Ignoring unreadable store entry '{}': {e:#}", path.display());
                Ok(None)
            }
        }
    }

    fn is_fresh(&self, timestamp: DateTime<Utc>, what: &str) -> bool {
        let age = self.now.signed_duration_since(timestamp);

        // clock skew: treat future timestamps as fresh
        let Ok(age) = age.to_std() else {
            return true;
        };

        if age >= self.ttl {
            log::debug!(target: LOG_TARGET, "Stored {what} expired (age: {:.1} hours)", age.as_secs_f64() / 3600.0);
            return false;
        }

        true
    }

    fn save(&self, path: &Path, stored: &StoredArtifact) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);

        #[cfg(debug_assertions)]
        serde_json::to_writer_pretty(&mut writer, stored)?;
        #[cfg(not(debug_assertions))]
        serde_json::to_writer(&mut writer, stored)?;

        writer.flush().map_err(io_err)
    }
}

impl ResultStore for FileStore {
    fn cached_results(&self, artifact_key: &str) -> Result<BTreeMap<String, MetricResult>, StorageError> {
        if self.ignore_cached {
            return Ok(BTreeMap::new());
        }

        let Some(stored) = self.load(&self.path_for(artifact_key))? else {
            log::debug!(target: LOG_TARGET, "No stored results for '{artifact_key}'");
            return Ok(BTreeMap::new());
        };

        let fresh: BTreeMap<_, _> = stored
            .results
            .into_iter()
            .filter(|(metric, envelope)| self.is_fresh(envelope.timestamp, &format!("'{metric}' for '{artifact_key}'")))
            .map(|(metric, envelope)| (metric, envelope.payload))
            .collect();

        log::debug!(target: LOG_TARGET, "Found {} stored result(s) for '{artifact_key}'", fresh.len());
        Ok(fresh)
    }

    fn put_result(&self, artifact_key: &str, output: &AnalyzerOutput) -> Result<(), StorageError> {
        let path = self.path_for(artifact_key);
        let mut stored = self.load(&path)?.unwrap_or_default();

        for result in output.results() {
            if result.is_success() && !result.from_cache() {
                let _ = stored.results.insert(
                    result.name().to_string(),
                    Envelope {
                        timestamp: self.now,
                        payload: result.clone(),
                    },
                );
            }
        }

        stored.output = Some(Envelope {
            timestamp: self.now,
            payload: output.clone(),
        });

        self.save(&path, &stored)
    }
}
