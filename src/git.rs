//! Read-only local git helpers
//!
//! Used for operator-facing defaults (current revision, commit subjects,
//! repository detection). A missing git repository never breaks remote
//! operations; every helper degrades to `None` or empty.

use std::collections::HashSet;

use tokio::process::Command;
use tracing::debug;

async fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().await.ok()?;
    if !output.status.success() {
        debug!("git {:?} exited with {}", args, output.status);
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// SHA of the currently checked-out revision
pub async fn head_rev() -> Option<String> {
    git_output(&["rev-parse", "HEAD"]).await
}

/// Subject line of a commit
pub async fn commit_subject(git_ref: &str) -> Option<String> {
    git_output(&["log", "--format=%s", "-n1", git_ref]).await
}

/// Tags describing a ref
pub async fn commit_tags(git_ref: &str) -> Vec<String> {
    git_output(&["describe", "--tags", git_ref])
        .await
        .map(|output| output.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// One-line log entries for `base..head`
pub async fn log_range(base: &str, head: &str) -> Option<Vec<String>> {
    let range = format!("{}..{}", base, head);
    git_output(&["log", "--pretty=format:[%h  %cs  %cn]  %s", &range])
        .await
        .map(|output| output.lines().map(str::to_string).collect())
}

/// Detect the `owner/name` repository from git remotes when exactly one
/// GitHub remote is configured
pub async fn repo_from_remote() -> Option<String> {
    let output = git_output(&["remote", "-v"]).await?;

    let mut repos = HashSet::new();
    for line in output.lines() {
        let Some(url) = line.split_whitespace().nth(1) else {
            continue;
        };
        if let Some(repo) = parse_github_remote(url) {
            repos.insert(repo);
        }
    }

    if repos.len() == 1 {
        repos.into_iter().next()
    } else {
        None
    }
}

/// Parse `owner/name` out of an ssh or https GitHub remote URL
fn parse_github_remote(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))?;
    let rest = rest.strip_suffix(".git").unwrap_or(rest);

    let (owner, name) = rest.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some(format!("{}/{}", owner, name))
}
