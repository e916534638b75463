//! Core CLI commands for srclink: annotate, check, keywords, resolve, revision.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::annotator;
use crate::config::Config;
use crate::error::Error;
use crate::init::{self, InitValues};
use crate::keywords;
use crate::resolver::Resolver;
use crate::revision;
use crate::types::SymbolReference;

/// Scan the docs tree and write `[source]` links in place.
///
/// # Errors
///
/// Returns configuration errors from setup, or `Error::Io` from writing.
pub fn annotate() -> Result<(), Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let resolver = build_resolver(&root, &config)?;

    let outcome = annotator::annotate_tree(&root.join(&config.docs_dir), &resolver, true)?;
    let updated = outcome.changed_files.len();
    println!(
        "{} links added, {} signatures skipped, {updated} files updated",
        outcome.linked, outcome.skipped
    );
    return Ok(());
}

/// Compute the one-time resolver for this invocation.
///
/// The revision, template, and repository root are all resolved here,
/// before any symbol is looked at, and are read-only afterwards. Both
/// are computed even when an external command overrides resolution, so
/// a broken repository surfaces immediately rather than per symbol.
///
/// # Errors
///
/// Returns `Error::RepoRoot`, `Error::NoTagsFound`, `Error::MissingUrl`,
/// or `Error::MissingRevision` from setup.
fn build_resolver(root: &Path, config: &Config) -> Result<Resolver, Error> {
    let repo_root = revision::repo_root(root)?;
    let resolved = resolved_revision(root, config)?;
    let template =
        revision::url_template(config.url.as_deref(), resolved.as_deref(), &config.context)?;
    return Ok(Resolver::select(config, template, &repo_root));
}

/// Same traversal as `annotate`, but writes nothing. Exit code 1 when
/// any file would change — the docs are out of date.
///
/// # Errors
///
/// Returns configuration errors from setup.
pub fn check() -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let resolver = build_resolver(&root, &config)?;

    let outcome = annotator::annotate_tree(&root.join(&config.docs_dir), &resolver, false)?;
    if outcome.changed_files.is_empty() {
        println!("docs up to date ({} signatures skipped)", outcome.skipped);
        return Ok(ExitCode::SUCCESS);
    }

    for file in &outcome.changed_files {
        println!("OUTDATED  {}", file.display());
    }
    println!(
        "{} files need annotation, run `srclink annotate`",
        outcome.changed_files.len()
    );
    return Ok(ExitCode::from(1));
}

/// Create or update `.srclink.toml`.
///
/// # Errors
///
/// Returns errors from config parsing or writing.
pub fn init(values: &InitValues) -> Result<(), Error> {
    return init::run(&PathBuf::from("."), values);
}

/// Print the package's function/method names as highlighter keywords.
///
/// # Errors
///
/// Returns `Error::MissingPackage` when no package is configured, or
/// `Error::PackageNotFound` when the configured directory is absent.
pub fn print_keywords(json: bool) -> Result<(), Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let package = config.require_package()?;
    let package_path = root.join(&config.package_dir).join(package);

    let names = keywords::collect(&package_path)?;
    if json {
        println!("{}", keywords::to_json(&names));
        return Ok(());
    }
    for name in &names {
        println!("{name}");
    }
    return Ok(());
}

/// Print the revision the current configuration would pin links to.
///
/// # Errors
///
/// Returns `Error::NoTagsFound` or `Error::MissingRevision` from
/// revision resolution.
pub fn print_revision() -> Result<(), Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;

    let resolved = match resolved_revision(&root, &config)? {
        Some(r) => r,
        None => config
            .context
            .github_version
            .clone()
            .ok_or(Error::MissingRevision)?,
    };
    println!("{resolved}");
    return Ok(());
}

/// Resolve one symbol reference and print its URL.
/// Exit code 1 (with a note on stderr) when no link is produced.
///
/// # Errors
///
/// Returns configuration errors from setup, or an external resolver failure.
pub fn resolve(name: &str, domain: &str, module: Option<&str>) -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let resolver = build_resolver(&root, &config)?;

    let reference = SymbolReference {
        domain: domain.to_string(),
        fullname: name.to_string(),
        module: module.map(String::from),
    };

    return match resolver.resolve(&reference)? {
        Some(url) => {
            println!("{url}");
            Ok(ExitCode::SUCCESS)
        },
        None => {
            eprintln!("no link for `{name}`");
            Ok(ExitCode::from(1))
        },
    };
}

/// Resolve the configured blob mode to a revision string.
///
/// An empty `blob` value opts out of mode resolution entirely, deferring
/// to the context's `github_version` in template construction.
///
/// # Errors
///
/// Returns `Error::NoTagsFound` in `last_tag` mode when no tag exists.
fn resolved_revision(dir: &Path, config: &Config) -> Result<Option<String>, Error> {
    let blob = config.blob.as_deref().unwrap_or(Config::DEFAULT_BLOB);
    if blob.is_empty() {
        return Ok(None);
    }
    return Ok(Some(revision::resolve_revision(blob, dir)?));
}
