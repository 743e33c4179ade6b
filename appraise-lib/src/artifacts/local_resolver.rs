use super::path_utils::mirror_name;
use super::{ArtifactCategory, ArtifactRef, LocalArtifactHandle, ResolutionError, Resolver, git};
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use futures::future::BoxFuture;

const LOG_TARGET: &str = "  resolver";

/// Resolves artifacts against the local filesystem.
///
/// Artifacts that carry a local path are used in place. Everything else is looked up
/// in a mirror directory laid out as `models/`, `datasets/` and `codebases/`. Code
/// repositories missing from the mirror can optionally be cloned into it.
#[derive(Debug, Clone)]
pub struct LocalResolver {
    mirror_dir: Option<Utf8PathBuf>,
    clone_missing: bool,
    clone_timeout: Duration,
}

impl LocalResolver {
    #[must_use]
    pub const fn new(mirror_dir: Option<Utf8PathBuf>) -> Self {
        Self {
            mirror_dir,
            clone_missing: false,
            clone_timeout: Duration::from_mins(5),
        }
    }

    /// Clone code repositories that are not yet mirrored.
    #[must_use]
    pub const fn with_cloning(mut self, clone_timeout: Duration) -> Self {
        self.clone_missing = true;
        self.clone_timeout = clone_timeout;
        self
    }

    /// Where an artifact lives (or would live) in the mirror.
    #[must_use]
    pub fn mirror_path(&self, artifact: &ArtifactRef) -> Option<Utf8PathBuf> {
        let name = mirror_name(artifact);
        if name.is_empty() {
            return None;
        }

        self.mirror_dir
            .as_ref()
            .map(|dir| dir.join(artifact.category().mirror_dir()).join(name))
    }

    async fn resolve_core(&self, artifact: &ArtifactRef) -> Result<LocalArtifactHandle, ResolutionError> {
        if let Some(path) = artifact.local_path() {
            return if path.is_dir() {
                Ok(LocalArtifactHandle::new(artifact.clone(), path))
            } else {
                Err(not_found(artifact))
            };
        }

        let Some(path) = self.mirror_path(artifact) else {
            return Err(not_found(artifact));
        };

        if path.is_dir() {
            log::debug!(target: LOG_TARGET, "Found '{artifact}' at '{path}'");
            return Ok(LocalArtifactHandle::new(artifact.clone(), path));
        }

        if self.clone_missing && artifact.category() == ArtifactCategory::Code {
            return self.clone_into(artifact, &path).await;
        }

        Err(not_found(artifact))
    }

    async fn clone_into(&self, artifact: &ArtifactRef, path: &Utf8Path) -> Result<LocalArtifactHandle, ResolutionError> {
        let Some(url) = artifact.url() else {
            return Err(not_found(artifact));
        };

        match git::clone_repo(&url, path, CLONE_DEPTH, self.clone_timeout).await {
            Ok(()) => Ok(LocalArtifactHandle::new(artifact.clone(), path)),
            Err(e) => {
                // a failed clone can leave a partial checkout behind
                let _ = tokio::fs::remove_dir_all(path).await;
                Err(ResolutionError::Unreachable {
                    artifact: artifact.to_string(),
                    reason: crate::metrics::error_chain(&e),
                })
            }
        }
    }
}

/// Enough history for contributor statistics without pulling the entire repository.
const CLONE_DEPTH: u32 = 1000;

impl Resolver for LocalResolver {
    fn resolve<'a>(&'a self, artifact: &'a ArtifactRef) -> BoxFuture<'a, Result<LocalArtifactHandle, ResolutionError>> {
        Box::pin(self.resolve_core(artifact))
    }
}

fn not_found(artifact: &ArtifactRef) -> ResolutionError {
    ResolutionError::NotFound {
        artifact: artifact.to_string(),
    }
}
