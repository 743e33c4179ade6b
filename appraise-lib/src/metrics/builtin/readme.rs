//! README loading shared by the documentation-driven metrics.

use crate::artifacts::LocalArtifactHandle;
use crate::metrics::MetricError;
use serde_yaml::{Mapping, Value};

pub(crate) const README_NAMES: &[&str] = &["README.md", "README", "README.txt", "README.rst", "README.markdown"];

/// A README split into its YAML front matter and lowercased body.
#[derive(Debug, Clone, Default)]
pub struct Readme {
    body: String,
    metadata: Mapping,
}

impl Readme {
    /// Load the artifact's README, if it has one.
    pub async fn load(artifact: &LocalArtifactHandle) -> Result<Option<Self>, MetricError> {
        let Some(path) = artifact.find_file(README_NAMES) else {
            return Ok(None);
        };

        let bytes = tokio::fs::read(&path).await?;
        Ok(Some(Self::parse(&String::from_utf8_lossy(&bytes))))
    }

    /// Load the artifact's README, reporting the metric as unavailable without one.
    pub async fn require(artifact: &LocalArtifactHandle) -> Result<Self, MetricError> {
        Self::load(artifact)
            .await?
            .ok_or_else(|| MetricError::Unavailable(format!("no README found in '{}'", artifact.root())))
    }

    #[must_use]
    pub fn parse(text: &str) -> Self {
        let (front_matter, body) = split_front_matter(text);

        // model cards in the wild often carry broken front matter; treat it as absent
        let metadata = front_matter
            .and_then(|yaml| serde_yaml::from_str::<Value>(yaml).ok())
            .and_then(|value| match value {
                Value::Mapping(mapping) => Some(mapping),
                _ => None,
            })
            .unwrap_or_default();

        Self {
            body: body.to_lowercase(),
            metadata,
        }
    }

    /// The body of the README, lowercased.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.body.contains(needle))
    }

    /// Whether a markdown heading mentions any of the keywords.
    #[must_use]
    pub fn has_heading(&self, keywords: &[&str]) -> bool {
        self.headings().any(|heading| keywords.iter().any(|k| heading.contains(k)))
    }

    /// The text under the first heading mentioning `keyword`, up to the next heading.
    #[must_use]
    pub fn section(&self, keyword: &str) -> Option<String> {
        let mut lines = self.body.lines().skip_while(|line| !(is_heading(line) && line.contains(keyword)));
        let _ = lines.next()?;
        Some(lines.take_while(|line| !is_heading(line)).collect::<Vec<_>>().join("\n"))
    }

    /// Strings stored under a front matter key, whether given as one string or a list.
    #[must_use]
    pub fn metadata_strings(&self, key: &str) -> Vec<String> {
        match self.metadata.get(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Sequence(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn has_metadata(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }

    fn headings(&self) -> impl Iterator<Item = &str> {
        self.body.lines().filter(|line| is_heading(line))
    }
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let text = text.trim_start_matches('\u{feff}');
    let Some(rest) = text.strip_prefix("---").and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))) else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let (yaml, tail) = rest.split_at(offset);
            return (Some(yaml), tail.get(line.len()..).unwrap_or_default());
        }
        offset += line.len();
    }

    (None, text)
}
