use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The kind of artifact being appraised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    /// A published machine-learning model.
    Model,

    /// A published dataset.
    Dataset,

    /// A source code repository.
    Code,
}

impl ArtifactCategory {
    /// The directory name used for this category inside a mirror.
    #[must_use]
    pub const fn mirror_dir(self) -> &'static str {
        match self {
            Self::Model => "models",
            Self::Dataset => "datasets",
            Self::Code => "codebases",
        }
    }
}
