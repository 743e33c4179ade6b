//! Thin wrappers over the `git` command line.

use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use std::collections::HashMap;
use std::process::{Output, Stdio};
use tokio::process::Command;
use url::Url;

const LOG_TARGET: &str = "       git";

/// Why a `git` invocation did not produce usable output.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("could not create directory '{path}'")]
    CreateDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not run '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command did not finish within its allowance and was killed.
    #[error("'{command}' timed out after {:.1} seconds", .timeout.as_secs_f64())]
    TimedOut { command: String, timeout: Duration },

    #[error("{operation} failed: {stderr}")]
    Failed { operation: String, stderr: String },
}

/// Shallow-clone a repository into `dest`.
pub async fn clone_repo(repo_url: &Url, dest: &Utf8Path, depth: u32, timeout: Duration) -> Result<(), GitError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|source| GitError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    log::info!(target: LOG_TARGET, "Cloning '{repo_url}' into '{dest}'");
    let start_time = std::time::Instant::now();

    let depth = depth.to_string();
    let output = run_git(&["clone", "--depth", &depth, "--single-branch", "--no-tags", repo_url.as_str(), dest.as_str()], timeout).await?;
    check_git_output(&output, "git clone")?;

    log::debug!(target: LOG_TARGET, "Cloned '{repo_url}' in {:.3}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Number of commits authored by each contributor, keyed by author email.
pub async fn commits_by_author(repo_path: &Utf8Path, timeout: Duration) -> Result<HashMap<String, u64>, GitError> {
    let output = run_git(&["-C", repo_path.as_str(), "log", "--all", "--format=%ae"], timeout).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // a repository without any commit yet
        if stderr.contains("does not have any commits") {
            return Ok(HashMap::new());
        }
    }
    check_git_output(&output, "git log")?;

    Ok(count_authors(&String::from_utf8_lossy(&output.stdout)))
}

fn count_authors(log: &str) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for email in log.lines().map(str::trim).filter(|line| !line.is_empty()) {
        *counts.entry(email.to_ascii_lowercase()).or_default() += 1;
    }
    counts
}

fn check_git_output(output: &Output, operation: &str) -> Result<(), GitError> {
    if output.status.success() {
        return Ok(());
    }

    Err(GitError::Failed {
        operation: operation.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

async fn run_git(args: &[&str], timeout: Duration) -> Result<Output, GitError> {
    let command = || format!("git {}", args.join(" "));

    // nothing is left to spend on the child
    if timeout.is_zero() {
        return Err(GitError::TimedOut { command: command(), timeout });
    }

    let child = Command::new("git")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| GitError::Spawn { command: command(), source })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(GitError::Spawn { command: command(), source }),
        Err(_) => Err(GitError::TimedOut { command: command(), timeout }),
    }
}
