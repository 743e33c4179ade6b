//! Artifact identity and resolution.
//!
//! An [`ArtifactRef`] names what to appraise. Before any metric runs, a [`Resolver`]
//! turns it into a [`LocalArtifactHandle`] pointing at the artifact's files on disk.
//! Resolution failures are fatal for the artifact; nothing downstream runs.
//!
//! An [`ArtifactRequest`] may also name the code and dataset behind a model. Those are
//! resolved on a best-effort basis and attached to the model's handle as
//! [`LinkedArtifact`]s.

mod artifact_category;
mod artifact_ref;
mod artifact_request;
pub(crate) mod git;
mod local_artifact;
mod local_resolver;
mod path_utils;
mod resolver;

pub use artifact_category::ArtifactCategory;
pub use artifact_ref::ArtifactRef;
pub use artifact_request::ArtifactRequest;
pub use local_artifact::{LinkedArtifact, LocalArtifactHandle};
pub use local_resolver::LocalResolver;
pub use path_utils::{mirror_name, sanitize_path_component};
pub use resolver::{ResolutionError, Resolver};
