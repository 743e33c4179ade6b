use super::{ArtifactRef, LocalArtifactHandle};
use core::fmt::Debug;
use core::time::Duration;
use futures::future::BoxFuture;

/// Why an artifact could not be made available locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("'{artifact}' is unreachable: {reason}")]
    Unreachable { artifact: String, reason: String },

    #[error("'{artifact}' could not be found")]
    NotFound { artifact: String },

    #[error("rate limited while resolving '{artifact}'")]
    RateLimited {
        artifact: String,
        retry_after: Option<Duration>,
    },
}

/// Makes an artifact's files available locally before any metric looks at it.
pub trait Resolver: Send + Sync + Debug {
    fn resolve<'a>(&'a self, artifact: &'a ArtifactRef) -> BoxFuture<'a, Result<LocalArtifactHandle, ResolutionError>>;
}
