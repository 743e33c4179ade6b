use super::readme::Readme;
use crate::artifacts::LocalArtifactHandle;
use crate::metrics::{Budget, Metric, MetricError, MetricValue};
use futures::future::BoxFuture;
use spdx::{Expression, LicenseItem, LicenseReq, ParseMode};

const LICENSE_FILES: &[&str] = &["LICENSE", "LICENSE.md", "LICENSE.txt", "LICENCE", "COPYING", "COPYING.md"];

/// Licenses that can be combined with LGPL-2.1 code.
const COMPATIBLE: &[&str] = &[
    "0BSD",
    "Apache-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "BSL-1.0",
    "CC0-1.0",
    "CC-BY-4.0",
    "ISC",
    "LGPL-2.1-only",
    "LGPL-2.1-or-later",
    "MIT",
    "MIT-0",
    "MPL-2.0",
    "Unlicense",
    "Zlib",
];

/// Identifiers recognized regardless of case, in their canonical spelling.
const KNOWN: &[&str] = &[
    "AGPL-3.0-only",
    "CC-BY-NC-4.0",
    "CC-BY-NC-SA-4.0",
    "CC-BY-ND-4.0",
    "CC-BY-SA-4.0",
    "GPL-2.0-only",
    "GPL-3.0-only",
    "LGPL-3.0-only",
];

/// Deprecated or shorthand identifiers commonly found in model cards.
const ALIASES: &[(&str, &str)] = &[
    ("agpl-3.0", "AGPL-3.0-only"),
    ("apache2", "Apache-2.0"),
    ("gpl-2.0", "GPL-2.0-only"),
    ("gpl-3.0", "GPL-3.0-only"),
    ("lgpl-2.1", "LGPL-2.1-only"),
    ("lgpl-3.0", "LGPL-3.0-only"),
    ("lgpl-lr", "LGPL-3.0-only"),
];

/// Phrases found in license texts, mapped to the identifier they denote.
///
/// More specific phrases come first.
const TEXT_MARKERS: &[(&str, &str)] = &[
    ("gnu lesser general public license", "LGPL-2.1"),
    ("gnu library general public license", "LGPL-2.1"),
    ("gnu affero general public license", "AGPL-3.0"),
    ("gnu general public license", "GPL-3.0"),
    ("apache license", "Apache-2.0"),
    ("mozilla public license", "MPL-2.0"),
    ("boost software license", "BSL-1.0"),
    ("this is free and unencumbered software", "Unlicense"),
    ("creative commons attribution-noncommercial", "CC-BY-NC-4.0"),
    ("creative commons zero", "CC0-1.0"),
    ("redistribution and use in source and binary forms", "BSD-3-Clause"),
    ("permission is hereby granted, free of charge", "MIT"),
    ("mit license", "MIT"),
    ("permission to use, copy, modify, and/or distribute", "ISC"),
];

/// Scores how freely the artifact's license lets it be reused alongside LGPL-2.1 code.
///
/// 1 for a compatible license, 0 for an incompatible or missing one and 0.5 for a
/// license that is declared but not recognized.
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseMetric;

impl LicenseMetric {
    async fn evaluate_core(artifact: &LocalArtifactHandle) -> Result<MetricValue, MetricError> {
        let readme = Readme::load(artifact).await?;

        if let Some(readme) = &readme {
            let declared = readme.metadata_strings("license");
            if !declared.is_empty() {
                return Ok(score_declared(&declared).into());
            }
        }

        if let Some(path) = artifact.find_file(LICENSE_FILES) {
            let bytes = tokio::fs::read(&path).await?;
            let text = String::from_utf8_lossy(&bytes).to_lowercase();
            return Ok(identify_text(&text).map_or(0.5, |id| score_declared(&[id])).into());
        }

        let section = readme.as_ref().and_then(|readme| readme.section("licen"));
        Ok(section.map_or(0.0, |text| identify_text(&text).map_or(0.5, |id| score_declared(&[id]))).into())
    }
}

impl Metric for LicenseMetric {
    fn name(&self) -> &'static str {
        "license"
    }

    fn applies(&self, _artifact: &LocalArtifactHandle) -> bool {
        true
    }

    fn evaluate<'a>(&'a self, artifact: &'a LocalArtifactHandle, _budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>> {
        Box::pin(Self::evaluate_core(artifact))
    }
}

/// Score the strongest of the declared license expressions.
fn score_declared(declared: &[impl AsRef<str>]) -> f64 {
    declared.iter().map(|id| score_expression(id.as_ref())).fold(0.0, f64::max)
}

fn score_expression(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    match Expression::parse_mode(&canonicalize(text), ParseMode::LAX) {
        Ok(expression) => {
            if expression.evaluate(is_compatible) {
                1.0
            } else {
                0.0
            }
        }
        Err(_) => 0.5,
    }
}

/// Rewrite identifiers and operators into the spelling SPDX expects.
fn canonicalize(text: &str) -> String {
    text.split_whitespace()
        .map(|token| {
            let bare = token.trim_matches(|c| c == '(' || c == ')');
            if bare.is_empty() {
                return token.to_string();
            }

            let lower = bare.to_ascii_lowercase();
            let canonical = match lower.as_str() {
                "and" => "AND",
                "or" => "OR",
                "with" => "WITH",
                _ => ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == lower)
                    .map(|(_, id)| *id)
                    .or_else(|| COMPATIBLE.iter().chain(KNOWN).find(|id| id.eq_ignore_ascii_case(bare)).copied())
                    .unwrap_or(bare),
            };

            token.replace(bare, canonical)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_compatible(req: &LicenseReq) -> bool {
    match &req.license {
        LicenseItem::Spdx { id, .. } => COMPATIBLE.iter().any(|name| name.eq_ignore_ascii_case(id.name)),
        _ => false,
    }
}

fn identify_text(lower: &str) -> Option<&'static str> {
    let (marker_pos, id) = TEXT_MARKERS
        .iter()
        .filter_map(|(marker, id)| lower.find(marker).map(|pos| (pos, *id)))
        .min_by_key(|(pos, _)| *pos)?;

    // GPL family texts name their version close to the title
    let window = lower.get(marker_pos..).unwrap_or_default();
    let window = window.get(..window.len().min(400)).unwrap_or(window);
    let id = match id {
        "LGPL-2.1" if window.contains("version 3") => "LGPL-3.0",
        "GPL-3.0" if window.contains("version 2") => "GPL-2.0",
        other => other,
    };

    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{ArtifactCategory, ArtifactRef};
    use camino::Utf8PathBuf;
    use core::time::Duration;
    use std::fs;

    fn handle(dir: &tempfile::TempDir) -> LocalArtifactHandle {
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        LocalArtifactHandle::new(ArtifactRef::local(&root, ArtifactCategory::Model), root)
    }

    async fn score(dir: &tempfile::TempDir) -> f64 {
        LicenseMetric
            .evaluate(&handle(dir), Budget::new(Duration::from_secs(5)))
            .await
            .unwrap()
            .score(None)
    }

    #[test]
    fn expressions() {
        assert!((score_expression("mit") - 1.0).abs() < f64::EPSILON);
        assert!((score_expression("apache-2.0") - 1.0).abs() < f64::EPSILON);
        assert!((score_expression("MIT OR GPL-3.0") - 1.0).abs() < f64::EPSILON);
        assert!((score_expression("lgpl-2.1") - 1.0).abs() < f64::EPSILON);
        assert!(score_expression("GPL-3.0").abs() < f64::EPSILON);
        assert!(score_expression("MIT AND GPL-3.0").abs() < f64::EPSILON);
        assert!((score_expression("llama-community-license") - 0.5).abs() < f64::EPSILON);
        assert!(score_expression("").abs() < f64::EPSILON);
    }

    #[test]
    fn canonical_spelling() {
        assert_eq!(canonicalize("mit or apache-2.0"), "MIT OR Apache-2.0");
        assert_eq!(canonicalize("(gpl-3.0 and bsd-3-clause)"), "(GPL-3.0-only AND BSD-3-Clause)");
        assert_eq!(canonicalize("other"), "other");
    }

    #[test]
    fn license_texts() {
        assert_eq!(identify_text("mit license\n\npermission is hereby granted, free of charge"), Some("MIT"));
        assert_eq!(identify_text("gnu lesser general public license\nversion 2.1, february 1999"), Some("LGPL-2.1"));
        assert_eq!(identify_text("gnu general public license\nversion 2, june 1991"), Some("GPL-2.0"));
        assert_eq!(identify_text("apache license\nversion 2.0, january 2004"), Some("Apache-2.0"));
        assert_eq!(identify_text("all rights reserved"), None);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn front_matter_wins() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("README.md"), "---\nlicense: apache-2.0\n---\n# Model\n").unwrap();
        fs::write(tmp.path().join("LICENSE"), "GNU GENERAL PUBLIC LICENSE\nVersion 3").unwrap();
        assert!((score(&tmp).await - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn license_file_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("LICENSE"), "GNU AFFERO GENERAL PUBLIC LICENSE\nVersion 3").unwrap();
        assert!(score(&tmp).await.abs() < f64::EPSILON);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn readme_section_is_a_last_resort() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("README.md"), "# Model\n\n## License\n\nReleased under the MIT License.\n").unwrap();
        assert!((score(&tmp).await - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn nothing_declared_scores_zero() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("README.md"), "# Model\n").unwrap();
        assert!(score(&tmp).await.abs() < f64::EPSILON);
    }
}
