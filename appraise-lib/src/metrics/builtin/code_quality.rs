use crate::artifacts::{ArtifactCategory, LocalArtifactHandle};
use crate::metrics::metric::run_blocking;
use crate::metrics::{Budget, Metric, MetricError, MetricValue};
use camino::Utf8Path;
use futures::future::BoxFuture;
use std::fs;
use walkdir::{DirEntry, WalkDir};

const SOURCE_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cs", "go", "h", "hpp", "java", "jl", "js", "kt", "py", "rb", "rs", "scala", "swift", "ts",
];

const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "target", "venv", ".venv", "__pycache__", "dist", "build"];

const CI_MARKERS: &[&str] = &[".gitlab-ci.yml", ".travis.yml", "azure-pipelines.yml", "Jenkinsfile", ".circleci"];

const LINT_MARKERS: &[&str] = &[
    ".pylintrc",
    "pylintrc",
    ".flake8",
    "setup.cfg",
    "pyproject.toml",
    "ruff.toml",
    ".pre-commit-config.yaml",
    ".editorconfig",
    "rustfmt.toml",
    ".rustfmt.toml",
    "clippy.toml",
    ".eslintrc",
    ".eslintrc.json",
    ".prettierrc",
    ".clang-format",
];

/// Source files larger than this are not scanned for comments.
const MAX_SCANNED_FILE: u64 = 1024 * 1024;

/// Comment density at which the comment component saturates.
const TARGET_COMMENT_RATIO: f64 = 0.1;

const TESTS_SCORE: f64 = 0.3;
const CI_SCORE: f64 = 0.2;
const LINT_SCORE: f64 = 0.2;
const README_SCORE: f64 = 0.1;
const COMMENTS_SCORE: f64 = 0.2;

/// Scores the engineering hygiene of the source files that come with an artifact.
///
/// An artifact without any source files scores 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeQualityMetric;

impl Metric for CodeQualityMetric {
    fn name(&self) -> &'static str {
        "code_quality"
    }

    fn applies(&self, artifact: &LocalArtifactHandle) -> bool {
        matches!(artifact.category(), ArtifactCategory::Code | ArtifactCategory::Model)
    }

    fn evaluate<'a>(&'a self, artifact: &'a LocalArtifactHandle, budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>> {
        let root = artifact.root().to_owned();
        Box::pin(async move {
            let survey = run_blocking(budget, move |budget| Survey::collect(&root, budget)).await?;
            Ok(survey.score().into())
        })
    }
}

#[derive(Debug, Default)]
struct Survey {
    source_files: usize,
    source_lines: usize,
    comment_lines: usize,
    has_tests: bool,
    has_ci: bool,
    has_lint_config: bool,
    has_readme: bool,
}

impl Survey {
    fn collect(root: &Utf8Path, budget: Budget) -> Result<Self, MetricError> {
        let mut survey = Self::default();
        let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| !is_skipped(entry));

        for entry in walker {
            budget.check()?;

            let entry = entry.map_err(|e| MetricError::Execution(format!("walking '{root}': {e}")))?;
            let name = entry.file_name().to_string_lossy();
            let path = entry.path();
            let depth = entry.depth();

            if entry.file_type().is_dir() {
                survey.has_tests |= name == "tests" || name == "test";
                survey.has_ci |= name == "workflows" && path.parent().and_then(|p| p.file_name()).is_some_and(|p| p == ".github");
                survey.has_ci |= CI_MARKERS.contains(&&*name);
                continue;
            }

            survey.has_ci |= CI_MARKERS.contains(&&*name);
            survey.has_lint_config |= LINT_MARKERS.contains(&&*name);
            survey.has_readme |= depth == 1 && name.to_ascii_lowercase().starts_with("readme");

            let is_source = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
            if !is_source {
                continue;
            }

            survey.source_files += 1;
            survey.has_tests |= name.starts_with("test_") || name.contains("_test.") || name.contains(".test.");

            if entry.metadata().is_ok_and(|m| m.len() <= MAX_SCANNED_FILE)
                && let Ok(text) = fs::read_to_string(path)
            {
                let (lines, comments) = count_lines(&text);
                survey.source_lines += lines;
                survey.comment_lines += comments;
            }
        }

        Ok(survey)
    }

    #[expect(clippy::cast_precision_loss, reason = "line counts are far below f64 precision")]
    fn score(&self) -> f64 {
        if self.source_files == 0 {
            return 0.0;
        }

        let flag = |present: bool, score: f64| if present { score } else { 0.0 };
        let comment_ratio = if self.source_lines == 0 {
            0.0
        } else {
            self.comment_lines as f64 / self.source_lines as f64
        };

        let score = flag(self.has_tests, TESTS_SCORE)
            + flag(self.has_ci, CI_SCORE)
            + flag(self.has_lint_config, LINT_SCORE)
            + flag(self.has_readme, README_SCORE)
            + COMMENTS_SCORE * (comment_ratio / TARGET_COMMENT_RATIO).min(1.0);

        score.min(1.0)
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Count non-blank lines and how many of them are comments.
fn count_lines(text: &str) -> (usize, usize) {
    let mut lines = 0;
    let mut comments = 0;
    let mut in_block = false;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        lines += 1;

        if in_block {
            comments += 1;
            in_block = !(line.contains("*/") || line.contains("\"\"\""));
            continue;
        }

        if line.starts_with("//") || line.starts_with('#') || line.starts_with('*') {
            comments += 1;
        } else if line.starts_with("/*") {
            comments += 1;
            in_block = !line.contains("*/");
        } else if line.starts_with("\"\"\"") {
            comments += 1;
            in_block = line.len() < 6 || !line.ends_with("\"\"\"");
        }
    }

    (lines, comments)
}
