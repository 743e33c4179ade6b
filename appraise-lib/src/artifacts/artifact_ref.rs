use super::ArtifactCategory;
use camino::{Utf8Path, Utf8PathBuf};
use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use url::Url;

/// Identifies an artifact to appraise.
///
/// A reference is immutable once built. The `source` is the URL or identifier the
/// artifact was requested by; `local_path` is set when the caller already has the
/// artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef {
    source: String,
    category: ArtifactCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_path: Option<Utf8PathBuf>,
}

impl ArtifactRef {
    #[must_use]
    pub fn new(source: impl AsRef<str>, category: ArtifactCategory) -> Self {
        Self {
            source: source.as_ref().trim().trim_end_matches('/').to_string(),
            category,
            local_path: None,
        }
    }

    /// Create a reference to an artifact that already lives in a local directory.
    #[must_use]
    pub fn local(path: impl Into<Utf8PathBuf>, category: ArtifactCategory) -> Self {
        let path = path.into();
        Self {
            source: path.to_string(),
            category,
            local_path: Some(path),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn category(&self) -> ArtifactCategory {
        self.category
    }

    #[must_use]
    pub fn local_path(&self) -> Option<&Utf8Path> {
        self.local_path.as_deref()
    }

    /// The key under which results for this artifact are stored.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.category, self.source)
    }

    /// Parse `category:source`, taking `category` when the reference has no prefix.
    pub fn parse_as(s: &str, category: ArtifactCategory) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty artifact reference".to_string());
        }

        match split_category(s)? {
            Some((explicit, rest)) => Ok(from_source(rest, explicit)),
            None => Ok(from_source(s, category)),
        }
    }

    /// The source parsed as a URL, if it is one.
    #[must_use]
    pub fn url(&self) -> Option<Url> {
        Url::parse(&self.source).ok().filter(|url| url.has_host())
    }
}

impl Display for ArtifactRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.category, self.source)
    }
}

impl FromStr for ArtifactRef {
    type Err = String;

    /// Parse `category:source`, or a bare source whose category can be inferred.
    fn from_str(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty artifact reference".to_string());
        }

        if let Some((category, rest)) = split_category(s)? {
            return Ok(from_source(rest, category));
        }

        infer_category(s)
            .map(|category| from_source(s, category))
            .ok_or_else(|| format!("cannot infer the kind of artifact '{s}', prefix it with 'model:', 'dataset:' or 'code:'"))
    }
}

fn split_category(s: &str) -> Result<Option<(ArtifactCategory, &str)>, String> {
    let Some((prefix, rest)) = s.split_once(':') else {
        return Ok(None);
    };
    let Ok(category) = ArtifactCategory::from_str(prefix) else {
        return Ok(None);
    };

    if rest.is_empty() {
        return Err(format!("missing source in artifact reference '{s}'"));
    }
    Ok(Some((category, rest)))
}

fn from_source(source: &str, category: ArtifactCategory) -> ArtifactRef {
    let path = Utf8Path::new(source);
    if !source.contains("://") && path.is_dir() {
        ArtifactRef::local(path, category)
    } else {
        ArtifactRef::new(source, category)
    }
}

fn infer_category(source: &str) -> Option<ArtifactCategory> {
    if let Ok(url) = Url::parse(source)
        && let Some(host) = url.host_str()
    {
        let path = url.path();
        if host == "huggingface.co" || host.ends_with(".huggingface.co") {
            return Some(if path.starts_with("/datasets/") {
                ArtifactCategory::Dataset
            } else {
                ArtifactCategory::Model
            });
        }

        if host == "github.com" || host == "gitlab.com" || path.ends_with(".git") {
            return Some(ArtifactCategory::Code);
        }

        return None;
    }

    Utf8Path::new(source).is_dir().then_some(ArtifactCategory::Code)
}
