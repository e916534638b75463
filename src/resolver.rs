//! Link resolution: one symbol reference in, one URL (or no link) out.
//!
//! The resolver is a strategy selected once per invocation: the builtin
//! source-analysis pipeline, or a user-supplied external command that
//! fully replaces it. Every per-symbol failure inside the builtin
//! pipeline collapses to "no link" — a symbol the analysis cannot place
//! simply goes unlinked, it never aborts the run.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::Config;
use crate::error::Error;
use crate::pysource;
use crate::types::{SourceLocation, SymbolReference, UrlTemplate};

/// The link resolution strategy for one invocation.
pub enum Resolver {
    /// Resolve through static analysis of the package sources.
    Builtin {
        /// Repository root; resolved file paths are made relative to it.
        repo_root: PathBuf,
        /// Absolute directory searched for module files.
        search_dir: PathBuf,
        /// The per-invocation URL template.
        template: UrlTemplate,
    },
    /// Delegate every reference to a user-supplied command.
    External {
        /// The configured command line, split on whitespace when spawned.
        command: String,
    },
}

impl Resolver {
    /// Pick the strategy for this invocation: the external command when
    /// one is configured, otherwise the builtin pipeline.
    pub fn select(config: &Config, template: UrlTemplate, repo_root: &Path) -> Self {
        if let Some(command) = &config.resolve_command {
            return Resolver::External {
                command: command.clone(),
            };
        }
        return Resolver::Builtin {
            repo_root: repo_root.to_path_buf(),
            search_dir: repo_root.join(&config.package_dir),
            template,
        };
    }

    /// Map one symbol reference to a URL, or `None` for "no link".
    ///
    /// # Errors
    ///
    /// Returns `Error::ResolveCommandFailed` if an external resolve
    /// command cannot be spawned. The builtin pipeline never errors.
    pub fn resolve(&self, reference: &SymbolReference) -> Result<Option<String>, Error> {
        return match self {
            Resolver::Builtin { repo_root, search_dir, template } => {
                Ok(resolve_builtin(reference, repo_root, search_dir, template))
            },
            Resolver::External { command } => resolve_external(reference, command),
        };
    }
}

/// The builtin pipeline: domain gate, module location, definition
/// lookup, then template rendering. Each step's failure yields `None`.
fn resolve_builtin(
    reference: &SymbolReference,
    repo_root: &Path,
    search_dir: &Path,
    template: &UrlTemplate,
) -> Option<String> {
    // Only the documented language's own domain is supported; everything
    // else is the expected no-link case, not an error.
    if reference.domain != "py" {
        return None;
    }

    let (file, fullname) = match &reference.module {
        Some(module) => (
            pysource::module_file(search_dir, module)?,
            reference.fullname.clone(),
        ),
        None => split_dotted_name(search_dir, &reference.fullname)?,
    };

    // A bare module reference has no definition to point at.
    if fullname.is_empty() {
        return None;
    }

    let source = std::fs::read_to_string(&file).ok()?;
    let defs = pysource::definitions(&file, &source).ok()?;
    let def = defs.iter().find(|d| return d.qualified_name == fullname)?;

    let relative = file.strip_prefix(repo_root).ok()?;
    return Some(template.render(&SourceLocation {
        line_start: def.line_start,
        line_stop: def.line_stop,
        path: relative.to_path_buf(),
    }));
}

/// Spawn the external resolve command with `<domain> <module> <fullname>`
/// arguments. Trimmed stdout is the URL; empty output or non-zero exit
/// is "no link".
///
/// # Errors
///
/// Returns `Error::ResolveCommandFailed` if the command cannot be spawned —
/// a broken user override is a configuration problem, not a per-symbol one.
fn resolve_external(
    reference: &SymbolReference,
    command: &str,
) -> Result<Option<String>, Error> {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(Error::ResolveCommandFailed {
            command: command.to_string(),
            reason: "empty command".to_string(),
        });
    };

    let output = Command::new(program)
        .args(parts)
        .arg(&reference.domain)
        .arg(reference.module.as_deref().unwrap_or(""))
        .arg(&reference.fullname)
        .output()
        .map_err(|e| {
            return Error::ResolveCommandFailed {
                command: command.to_string(),
                reason: e.to_string(),
            };
        })?;

    if !output.status.success() {
        return Ok(None);
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if url.is_empty() {
        return Ok(None);
    }
    return Ok(Some(url));
}

/// Split a single dotted path into (module file, fullname) by finding the
/// longest prefix that maps to a file on disk — the static analogue of
/// checking which root module is actually loaded.
fn split_dotted_name(search_dir: &Path, dotted: &str) -> Option<(PathBuf, String)> {
    let segments: Vec<&str> = dotted.split('.').collect();

    for i in (1..=segments.len()).rev() {
        let module = segments.get(..i)?.join(".");
        if let Some(file) = pysource::module_file(search_dir, &module) {
            let fullname = segments.get(i..)?.join(".");
            return Some((file, fullname));
        }
    }
    return None;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    const MOD_SOURCE: &str = "\
\"\"\"Module docstring.\"\"\"


def helper():
    pass


class ClassName:
    def __init__(self):
        pass

    def method_name(self):
        a = 1
        b = 2
        c = 3
        d = 4
        return a + b + c + d
";

    /// Lay out `pkg/mod.py` under a temp root and return (root, resolver).
    fn fixture() -> (tempfile::TempDir, Resolver) {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join("__init__.py"), "").unwrap();
        std::fs::write(pkg.join("mod.py"), MOD_SOURCE).unwrap();

        let template =
            UrlTemplate("<base>/blob/<rev>/{filepath}#L{linestart}-L{linestop}".to_string());
        let resolver = Resolver::Builtin {
            repo_root: dir.path().to_path_buf(),
            search_dir: dir.path().to_path_buf(),
            template,
        };
        (dir, resolver)
    }

    fn reference(domain: &str, module: Option<&str>, fullname: &str) -> SymbolReference {
        SymbolReference {
            domain: domain.to_string(),
            fullname: fullname.to_string(),
            module: module.map(String::from),
        }
    }

    #[test]
    fn resolves_method_to_line_range() {
        let (_dir, resolver) = fixture();
        // `method_name` is defined on lines 12-17 of pkg/mod.py.
        let url = resolver
            .resolve(&reference("py", Some("pkg.mod"), "ClassName.method_name"))
            .unwrap();
        assert_eq!(url.as_deref(), Some("<base>/blob/<rev>/pkg/mod.py#L12-L17"));
    }

    #[test]
    fn other_domains_never_link() {
        let (_dir, resolver) = fixture();
        for domain in ["c", "cpp", "js", "rst"] {
            let url = resolver
                .resolve(&reference(domain, Some("pkg.mod"), "helper"))
                .unwrap();
            assert!(url.is_none(), "domain {domain}");
        }
    }

    #[test]
    fn unknown_root_module_is_no_link() {
        let (_dir, resolver) = fixture();
        let url = resolver
            .resolve(&reference("py", Some("missing.mod"), "helper"))
            .unwrap();
        assert!(url.is_none());
    }

    #[test]
    fn unknown_attribute_is_no_link() {
        let (_dir, resolver) = fixture();
        let url = resolver
            .resolve(&reference("py", Some("pkg.mod"), "ClassName.gone"))
            .unwrap();
        assert!(url.is_none());
    }

    #[test]
    fn dotted_name_without_module_is_split_by_longest_prefix() {
        let (_dir, resolver) = fixture();
        let url = resolver
            .resolve(&reference("py", None, "pkg.mod.helper"))
            .unwrap();
        assert_eq!(url.as_deref(), Some("<base>/blob/<rev>/pkg/mod.py#L4-L5"));
    }

    #[test]
    fn bare_module_reference_is_no_link() {
        let (_dir, resolver) = fixture();
        let url = resolver.resolve(&reference("py", None, "pkg.mod")).unwrap();
        assert!(url.is_none());
    }
}
