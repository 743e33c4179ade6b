//! Mapping of artifact sources onto mirror directory names.

use super::{ArtifactCategory, ArtifactRef};

/// Make a string safe to use as a single path component.
///
/// Traversal sequences and characters that are reserved on common filesystems are
/// replaced with underscores.
#[must_use]
pub fn sanitize_path_component(s: &str) -> String {
    let s = s.replace("..", "__");
    s.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
}

/// The directory name an artifact is stored under inside its category's mirror directory.
///
/// Models and datasets keep their owner (`org/name` becomes `org_name`); code
/// repositories are named after the repository alone, without a `.git` suffix.
#[must_use]
pub fn mirror_name(artifact: &ArtifactRef) -> String {
    let segments: Vec<String> = match artifact.url() {
        Some(url) => url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default(),
        None => artifact.source().split('/').filter(|s| !s.is_empty()).map(str::to_string).collect(),
    };

    let name = match artifact.category() {
        ArtifactCategory::Code => segments
            .get(1)
            .or_else(|| segments.last())
            .map(|repo| repo.trim_end_matches(".git").to_string())
            .unwrap_or_default(),
        ArtifactCategory::Dataset => match segments.split_first() {
            Some((first, rest)) if first == "datasets" => owner_and_name(rest),
            _ => owner_and_name(&segments),
        },
        ArtifactCategory::Model => owner_and_name(&segments),
    };

    sanitize_path_component(&name)
}

fn owner_and_name(segments: &[String]) -> String {
    match segments {
        [] => String::new(),
        [name] => name.clone(),
        [owner, name, ..] => format!("{owner}_{name}"),
    }
}
