//! Revision detection and link-template construction.
//!
//! Computed once per invocation, before any symbol is resolved. All git
//! access is a synchronous subprocess call with no retries: a failure is
//! either a degraded fallback (`head` mode) or fatal (`last_tag` mode and
//! repository-root lookup).

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::Context;
use crate::error::Error;
use crate::types::UrlTemplate;

/// Fixed template suffix appended after the blob segment.
const TEMPLATE_SUFFIX: &str = "{filepath}#L{linestart}-L{linestop}";

/// Run git with the given arguments and return trimmed stdout.
///
/// # Errors
///
/// Returns the trimmed stderr (or the spawn failure) on non-zero exit.
fn git_output(args: &[&str], dir: &Path) -> Result<String, String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| return e.to_string())?;

    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }
    return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
}

/// The most recent commit hash, or its tag if that exact commit is tagged.
///
/// Falls back to the literal `"master"` when the repository cannot be
/// queried at all — degraded but non-fatal, so a build outside any
/// repository still produces links.
pub fn head(dir: &Path) -> String {
    let hash = match git_output(&["log", "-n1", "--pretty=%H"], dir) {
        Ok(h) => h,
        Err(reason) => {
            eprintln!("srclink: failed to get head ({reason}); falling back to \"master\"");
            return "master".to_string();
        },
    };

    return match tag_of_commit(&hash, dir) {
        Some(tag) => tag,
        None => hash,
    };
}

/// The most recent tag reachable from the current branch.
///
/// # Errors
///
/// Returns `Error::NoTagsFound` if the branch has no tags. There is no
/// sensible fallback for a user who asked to link against a tag.
pub fn last_tag(dir: &Path) -> Result<String, Error> {
    return git_output(&["describe", "--tags", "--abbrev=0"], dir)
        .map_err(|_reason| return Error::NoTagsFound);
}

/// The top-level directory of the current working tree.
///
/// # Errors
///
/// Returns `Error::RepoRoot` wrapping the git failure when run outside
/// any repository.
pub fn repo_root(dir: &Path) -> Result<PathBuf, Error> {
    return git_output(&["rev-parse", "--show-toplevel"], dir)
        .map(PathBuf::from)
        .map_err(|reason| return Error::RepoRoot { reason });
}

/// Resolve a blob mode to a concrete revision string.
///
/// `"head"` and `"last_tag"` query git; anything else is an explicit
/// ref returned verbatim with no git call.
///
/// # Errors
///
/// Returns `Error::NoTagsFound` in `last_tag` mode when no tag exists.
pub fn resolve_revision(blob: &str, dir: &Path) -> Result<String, Error> {
    return match blob {
        "head" => Ok(head(dir)),
        "last_tag" => last_tag(dir),
        explicit => Ok(explicit.to_string()),
    };
}

/// The tag pointing at the given commit, if any.
fn tag_of_commit(hash: &str, dir: &Path) -> Option<String> {
    return git_output(&["describe", "--exact-match", "--tags", hash], dir).ok();
}

/// Build the per-invocation URL template from a base repository URL and
/// a resolved revision.
///
/// When `url` is absent it is derived from the context's
/// `github_user`/`github_repo` pair. When `revision` is absent the
/// context's `github_version` is used. Both fallbacks failing is fatal —
/// fail-fast, no second round of git detection.
///
/// # Errors
///
/// Returns `Error::MissingUrl` if no base URL can be determined, or
/// `Error::MissingRevision` if no revision can be determined.
pub fn url_template(
    url: Option<&str>,
    revision: Option<&str>,
    context: &Context,
) -> Result<UrlTemplate, Error> {
    let base = match url {
        Some(u) => u.to_string(),
        None => {
            let (user, repo) = match (&context.github_user, &context.github_repo) {
                (Some(user), Some(repo)) => (user, repo),
                _ => return Err(Error::MissingUrl),
            };
            eprintln!(
                "srclink: config value `url` is missing; creating link from context values"
            );
            format!("https://github.com/{user}/{repo}")
        },
    };

    let blob = match revision {
        Some(r) => r,
        None => context.github_version.as_deref().ok_or(Error::MissingRevision)?,
    };

    let base = base.trim_end_matches('/');
    return Ok(UrlTemplate(format!("{base}/blob/{blob}/{TEMPLATE_SUFFIX}")));
}
