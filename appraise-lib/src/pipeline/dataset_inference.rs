//! Finding the dataset behind a model through the links in its README.
//!
//! A model evaluated without an explicit dataset borrows the first dataset linked from
//! its README that already has stored results.

use crate::artifacts::{ArtifactCategory, ArtifactRef, LocalArtifactHandle};
use crate::metrics::builtin::readme::README_NAMES;
use crate::store::ResultStore;
use regex::Regex;
use std::sync::LazyLock;

const LOG_TARGET: &str = "  pipeline";

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]\(\s*<?([^)\s>]+)>?[^)]*\)").expect("invalid regex"));

/// Datasets linked from markdown text, in order of appearance and without repeats.
pub(super) fn dataset_links(text: &str) -> Vec<ArtifactRef> {
    let mut links: Vec<ArtifactRef> = Vec::new();

    for target in MARKDOWN_LINK.captures_iter(text).filter_map(|captures| captures.get(1)) {
        let Ok(artifact) = target.as_str().parse::<ArtifactRef>() else {
            continue;
        };

        if artifact.category() == ArtifactCategory::Dataset && !links.contains(&artifact) {
            links.push(artifact);
        }
    }

    links
}

/// The first dataset linked from the model's README with stored results. Blocks on the
/// filesystem and the store.
pub(super) fn infer_dataset(model: &LocalArtifactHandle, store: &dyn ResultStore) -> Option<ArtifactRef> {
    let path = model.find_file(README_NAMES)?;
    let text = match std::fs::read(&path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            log::debug!(target: LOG_TARGET, "Could not read '{path}' to look for datasets: {e}");
            return None;
        }
    };

    dataset_links(&text).into_iter().find(|dataset| match store.cached_results(&dataset.key()) {
        Ok(results) => !results.is_empty(),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Could not look up stored results for '{dataset}': {e:#}");
            false
        }
    })
}
