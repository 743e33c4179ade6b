use super::{ArtifactCategory, ArtifactRef};
use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::FromStr;

/// One unit of work: an artifact, plus the code and dataset behind it when known.
///
/// Parsed from either a single artifact reference or a `code,dataset,model` triple in
/// which the code and dataset fields may be left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRequest {
    artifact: ArtifactRef,
    code: Option<ArtifactRef>,
    dataset: Option<ArtifactRef>,
}

impl ArtifactRequest {
    #[must_use]
    pub const fn new(artifact: ArtifactRef) -> Self {
        Self {
            artifact,
            code: None,
            dataset: None,
        }
    }

    #[must_use]
    pub fn with_code(self, code: ArtifactRef) -> Self {
        Self { code: Some(code), ..self }
    }

    #[must_use]
    pub fn with_dataset(self, dataset: ArtifactRef) -> Self {
        Self {
            dataset: Some(dataset),
            ..self
        }
    }

    #[must_use]
    pub const fn artifact(&self) -> &ArtifactRef {
        &self.artifact
    }

    #[must_use]
    pub const fn code(&self) -> Option<&ArtifactRef> {
        self.code.as_ref()
    }

    #[must_use]
    pub const fn dataset(&self) -> Option<&ArtifactRef> {
        self.dataset.as_ref()
    }
}

impl From<ArtifactRef> for ArtifactRequest {
    fn from(artifact: ArtifactRef) -> Self {
        Self::new(artifact)
    }
}

impl Display for ArtifactRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.artifact)
    }
}

impl FromStr for ArtifactRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let fields: Vec<_> = s.split(',').map(str::trim).collect();

        match fields.as_slice() {
            [single] => Ok(Self::new(single.parse()?)),
            [code, dataset, model] => {
                if model.is_empty() {
                    return Err(format!("missing model in '{}'", s.trim()));
                }

                let mut request = Self::new(ArtifactRef::parse_as(model, ArtifactCategory::Model)?);
                if !code.is_empty() {
                    request = request.with_code(ArtifactRef::parse_as(code, ArtifactCategory::Code)?);
                }
                if !dataset.is_empty() {
                    request = request.with_dataset(ArtifactRef::parse_as(dataset, ArtifactCategory::Dataset)?);
                }
                Ok(request)
            }
            _ => Err(format!(
                "expected one artifact or 'code,dataset,model', found {} fields in '{}'",
                fields.len(),
                s.trim()
            )),
        }
    }
}
