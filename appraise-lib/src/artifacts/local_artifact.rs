use super::{ArtifactCategory, ArtifactRef};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;

/// A code repository or dataset a model was built from.
///
/// `local` is set when the linked artifact could be resolved; metrics targeting it are
/// otherwise served from stored results only.
#[derive(Debug, Clone)]
pub struct LinkedArtifact {
    artifact: ArtifactRef,
    local: Option<Arc<LocalArtifactHandle>>,
}

impl LinkedArtifact {
    #[must_use]
    pub const fn new(artifact: ArtifactRef, local: Option<Arc<LocalArtifactHandle>>) -> Self {
        Self { artifact, local }
    }

    #[must_use]
    pub const fn artifact(&self) -> &ArtifactRef {
        &self.artifact
    }

    #[must_use]
    pub const fn local(&self) -> Option<&Arc<LocalArtifactHandle>> {
        self.local.as_ref()
    }
}

/// An artifact whose files are available in a local directory.
///
/// Produced by a [`Resolver`](super::Resolver); metrics only ever look at the files
/// under [`root`](Self::root). Models may carry links to their code and dataset.
#[derive(Debug, Clone)]
pub struct LocalArtifactHandle {
    artifact: ArtifactRef,
    root: Utf8PathBuf,
    code: Option<LinkedArtifact>,
    dataset: Option<LinkedArtifact>,
}

impl LocalArtifactHandle {
    #[must_use]
    pub fn new(artifact: ArtifactRef, root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            artifact,
            root: root.into(),
            code: None,
            dataset: None,
        }
    }

    #[must_use]
    pub fn with_code(self, code: Option<LinkedArtifact>) -> Self {
        Self { code, ..self }
    }

    #[must_use]
    pub fn with_dataset(self, dataset: Option<LinkedArtifact>) -> Self {
        Self { dataset, ..self }
    }

    /// The code repository linked to this artifact.
    #[must_use]
    pub const fn code(&self) -> Option<&LinkedArtifact> {
        self.code.as_ref()
    }

    /// The dataset linked to this artifact, given explicitly or inferred from its README.
    #[must_use]
    pub const fn dataset(&self) -> Option<&LinkedArtifact> {
        self.dataset.as_ref()
    }

    #[must_use]
    pub const fn artifact(&self) -> &ArtifactRef {
        &self.artifact
    }

    #[must_use]
    pub const fn category(&self) -> ArtifactCategory {
        self.artifact.category()
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Whether the local copy carries git history.
    #[must_use]
    pub fn has_git_history(&self) -> bool {
        self.root.join(".git").exists()
    }

    /// Find the first file in the root directory whose name matches one of `names`, ignoring case.
    #[must_use]
    pub fn find_file(&self, names: &[&str]) -> Option<Utf8PathBuf> {
        let entries = self.root.read_dir_utf8().ok()?;
        let mut found: Vec<_> = entries
            .filter_map(core::result::Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| {
                let rank = names.iter().position(|name| entry.file_name().eq_ignore_ascii_case(name))?;
                Some((rank, entry.into_path()))
            })
            .collect();

        found.sort();
        found.into_iter().next().map(|(_, path)| path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn find_file_honors_preference_order_and_case() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::write(root.join("license.txt"), "x").unwrap();
        fs::write(root.join("LICENSE.md"), "x").unwrap();
        fs::create_dir(root.join("LICENSE")).unwrap();

        let handle = LocalArtifactHandle::new(ArtifactRef::local(&root, ArtifactCategory::Code), &root);
        let found = handle.find_file(&["LICENSE", "LICENSE.md", "LICENSE.txt"]).unwrap();
        assert_eq!(found.file_name(), Some("LICENSE.md"));
        assert!(handle.find_file(&["COPYING"]).is_none());
        assert!(!handle.has_git_history());
    }
}
