/// Crate-level error types for srclink diagnostics.
use std::path::PathBuf;

/// All errors in srclink are the fatal, configuration-class kind: a
/// missing or unresolvable value without which no link can be built.
/// Per-symbol resolution failures never appear here; they collapse to
/// "no link" inside the resolver. Each variant carries enough context
/// to produce a useful diagnostic without a debugger.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The `package` config value is required but absent.
    #[error("config value `package` is missing from .srclink.toml")]
    MissingPackage,

    /// No blob mode configured and no `github_version` fallback in context.
    #[error("must provide a blob or GitHub version to link to")]
    MissingRevision,

    /// No base URL configured and no `github_user`/`github_repo` fallback.
    #[error("config value `url` is missing and no github_user/github_repo context is set")]
    MissingUrl,

    /// `blob = "last_tag"` but the current branch has no tags.
    #[error("no tags found on current branch")]
    NoTagsFound,

    /// The configured package directory does not exist on disk.
    #[error("package not found: {}", path.display())]
    PackageNotFound {
        /// Path that was expected to contain the package.
        path: PathBuf,
    },

    /// Tree-sitter or toml_edit failed to parse a file.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// `git rev-parse --show-toplevel` failed; likely not a repository.
    #[error("unable to determine the repository root: {reason}")]
    RepoRoot {
        /// Stderr or spawn failure from the underlying git call.
        reason: String,
    },

    /// The user-supplied `resolve_command` could not be spawned.
    #[error("resolve command `{command}` failed: {reason}")]
    ResolveCommandFailed {
        /// The configured command string.
        command: String,
        /// Description of the spawn failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
