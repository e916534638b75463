/// Core domain types for symbol references, source locations, and URL templates.
use std::path::PathBuf;

/// Resolved position of a symbol inside the repository.
/// Lines are 1-based and inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// First line of the definition, including any decorators.
    pub line_start: u32,
    /// Last line of the definition.
    pub line_stop: u32,
    /// Path of the defining file, relative to the repository root.
    pub path: PathBuf,
}

/// A documented symbol as it appears in a signature block.
/// The domain decides which fields are meaningful; only `py` resolves.
#[derive(Debug, Clone)]
pub struct SymbolReference {
    /// Documentation domain tag, e.g. `py`, `c`, `cpp`, `js`.
    pub domain: String,
    /// Dot-qualified name within the module, e.g. `Config.validate`.
    pub fullname: String,
    /// Dotted module path, e.g. `pkg.mod`. Absent when the signature
    /// carries a single dotted path and the split must be inferred.
    pub module: Option<String>,
}

/// The per-build link template with `{filepath}`, `{linestart}` and
/// `{linestop}` substitution slots. Built exactly once per invocation
/// by `revision::url_template` and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate(
    /// The raw template string.
    pub String,
);

impl UrlTemplate {
    /// Substitute a source location into the template slots.
    /// The relative path is rendered with forward slashes regardless of host OS.
    pub fn render(&self, location: &SourceLocation) -> String {
        let posix_path: Vec<String> = location
            .path
            .components()
            .map(|c| return c.as_os_str().to_string_lossy().into_owned())
            .collect();

        return self
            .0
            .replace("{filepath}", &posix_path.join("/"))
            .replace("{linestart}", &location.line_start.to_string())
            .replace("{linestop}", &location.line_stop.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_three_slots() {
        let template = UrlTemplate(
            "https://github.com/u/r/blob/main/{filepath}#L{linestart}-L{linestop}".to_string(),
        );
        let location = SourceLocation {
            line_start: 10,
            line_stop: 15,
            path: PathBuf::from("pkg/mod.py"),
        };
        assert_eq!(
            template.render(&location),
            "https://github.com/u/r/blob/main/pkg/mod.py#L10-L15"
        );
    }

    #[test]
    fn nested_path_uses_forward_slashes() {
        let template = UrlTemplate("{filepath}".to_string());
        let location = SourceLocation {
            line_start: 1,
            line_stop: 1,
            path: PathBuf::from("pkg").join("sub").join("mod.py"),
        };
        assert_eq!(template.render(&location), "pkg/sub/mod.py");
    }
}
