use super::Host;
use super::common::{LogLevel, cache_dir, init_logging};
use super::config::Config;
use super::progress_reporter::ProgressReporter;
use crate::Result;
use crate::artifacts::{ArtifactRequest, LocalResolver, Resolver};
use crate::pipeline::{NullProgress, Pipeline, Progress};
use crate::reports::generate_record;
use crate::store::{FileStore, MemoryStore, ResultStore};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::Parser;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::fs::{self, File};
use std::io::{BufWriter, IsTerminal, Write};
use std::sync::Arc;

const LOG_TARGET: &str = "  evaluate";

#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Artifacts to evaluate (`model:<source>`, `dataset:<source>`, `code:<source>`, a URL or directory,
    /// or a `code,dataset,model` triple)
    #[arg(value_name = "ARTIFACT")]
    pub artifacts: Vec<ArtifactRequest>,

    /// Read additional artifacts from a file, one per line (`#` starts a comment)
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<Utf8PathBuf>,

    /// Path to configuration file (default is `appraise.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory where evaluation results are cached
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Directory holding local copies of artifacts (default is `mirror` inside the cache directory)
    #[arg(long, value_name = "PATH")]
    pub mirror_dir: Option<Utf8PathBuf>,

    /// Clone code repositories that are missing from the mirror directory
    #[arg(long)]
    pub clone: bool,

    /// Ignore cached results and evaluate every metric again
    #[arg(long)]
    pub ignore_cached: bool,

    /// Neither read nor write cached results
    #[arg(long, conflicts_with = "ignore_cached")]
    pub no_cache: bool,

    /// Write records to a file instead of to standard output
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Show a progress bar on standard error
    #[arg(long)]
    pub progress: bool,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LogLevel,
}

/// Evaluate every requested artifact and emit one record per line.
///
/// Artifacts that cannot be resolved are reported on the error stream and make the
/// command exit with status 1 once all other artifacts have been evaluated.
pub async fn evaluate_artifacts<H: Host>(host: &mut H, args: &EvaluateArgs) -> Result<()> {
    init_logging(args.log_level);

    let config = match Config::load(Utf8Path::new("."), args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Invalid configuration: {e:#}");
            host.exit(1);
            return Err(e);
        }
    };

    let mut artifacts: Vec<Result<ArtifactRequest, String>> = args.artifacts.iter().cloned().map(Ok).collect();
    if let Some(input) = &args.input {
        let text = fs::read_to_string(input).into_app_err_with(|| format!("reading artifact list '{input}'"))?;
        artifacts.extend(parse_artifact_list(&text));
    }

    if artifacts.is_empty() {
        bail!("no artifacts to evaluate, pass them as arguments or with --input");
    }

    let cache_dir = cache_dir(args.cache_dir.as_ref())?;
    let pipeline = build_pipeline(&config, args, &cache_dir)?;

    let progress: Arc<dyn Progress> = if args.progress {
        Arc::new(ProgressReporter::new(Duration::from_millis(300), std::io::stderr().is_terminal()))
    } else {
        Arc::new(NullProgress)
    };
    let pipeline = pipeline.with_progress(Arc::clone(&progress));

    let mut file = match &args.output {
        Some(path) => Some(BufWriter::new(
            File::create(path).into_app_err_with(|| format!("creating output file '{path}'"))?,
        )),
        None => None,
    };

    let mut failures = 0usize;
    for request in artifacts {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                failures += 1;
                let _ = writeln!(host.error(), "Could not evaluate artifact: {e}");
                continue;
            }
        };

        match pipeline.evaluate_request(&request).await {
            Ok(output) => {
                let mut line = String::new();
                generate_record(&output, &mut line)?;

                match &mut file {
                    Some(file) => writeln!(file, "{line}").into_app_err("writing evaluation record")?,
                    None => {
                        let _ = writeln!(host.output(), "{line}");
                    }
                }
            }
            Err(e) => {
                failures += 1;
                log::warn!(target: LOG_TARGET, "Could not evaluate '{request}': {e}");
                let _ = writeln!(host.error(), "Could not evaluate '{request}': {e}");
            }
        }
    }

    progress.done();

    if let Some(mut file) = file {
        file.flush().into_app_err("writing evaluation records")?;
    }

    if failures > 0 {
        host.exit(1);
        bail!("{failures} artifact(s) could not be evaluated");
    }

    Ok(())
}

fn build_pipeline(config: &Config, args: &EvaluateArgs, cache_dir: &Utf8Path) -> Result<Pipeline> {
    let store: Arc<dyn ResultStore> = if args.no_cache {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(
            cache_dir.join("results"),
            config.cache_ttl,
            Utc::now(),
            args.ignore_cached,
        ))
    };

    let mirror_dir = args.mirror_dir.clone().unwrap_or_else(|| cache_dir.join("mirror"));
    let mut resolver = LocalResolver::new(Some(mirror_dir));
    if args.clone {
        resolver = resolver.with_cloning(config.clone_timeout);
    }
    let resolver: Arc<dyn Resolver> = Arc::new(resolver);

    let catalog = config.catalog().into_app_err("building the metric catalog")?;
    Pipeline::new(config.settings(), catalog, resolver, store).into_app_err("configuring the evaluation pipeline")
}

/// Parse an artifact list: one reference or `code,dataset,model` triple per line, with
/// blank lines and `#` comments ignored.
fn parse_artifact_list(text: &str) -> Vec<Result<ArtifactRequest, String>> {
    text.lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect()
}
