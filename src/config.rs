use std::path::{Path, PathBuf};

use crate::error::Error;

/// Identifiers supplied as a fallback when `url` is not configured,
/// mirroring the documentation generator's HTML context values.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Context {
    /// Repository name on the hosting platform.
    #[serde(default)]
    pub github_repo: Option<String>,
    /// Account or organization name on the hosting platform.
    #[serde(default)]
    pub github_user: Option<String>,
    /// Explicit revision used only when no blob mode is set.
    #[serde(default)]
    pub github_version: Option<String>,
}

/// Project configuration loaded from `.srclink.toml`.
/// Directory values are relative to the repository root, which is where
/// srclink is expected to run from.
pub struct Config {
    /// Revision selection: `"head"`, `"last_tag"`, or an explicit ref.
    pub blob: Option<String>,
    /// Fallback identifiers for URL derivation and revision pinning.
    pub context: Context,
    /// Directory containing the markdown API pages.
    pub docs_dir: PathBuf,
    /// Import name of the documented package, e.g. `pkg`.
    pub package: Option<String>,
    /// Directory containing the package.
    pub package_dir: PathBuf,
    /// External command that fully replaces the builtin resolver.
    pub resolve_command: Option<String>,
    /// Base repository URL, e.g. `https://github.com/user/repo`.
    pub url: Option<String>,
}

/// Raw TOML structure for `.srclink.toml`.
#[derive(serde::Deserialize)]
struct SrclinkTomlConfig {
    #[serde(default)]
    blob: Option<String>,
    #[serde(default)]
    context: Option<Context>,
    #[serde(default)]
    docs_dir: Option<String>,
    #[serde(default)]
    package: Option<String>,
    #[serde(default)]
    package_dir: Option<String>,
    #[serde(default)]
    resolve_command: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl Config {
    /// Default blob mode when the config file sets none.
    pub const DEFAULT_BLOB: &'static str = "head";

    /// Load config from `.srclink.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if
    /// the file exists but is malformed — never silently falls back to
    /// defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".srclink.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::defaults()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: SrclinkTomlConfig = toml::from_str(&content)?;
        Ok(Self {
            blob: raw.blob,
            context: raw.context.unwrap_or_default(),
            docs_dir: PathBuf::from(raw.docs_dir.unwrap_or_else(|| return "docs".to_string())),
            package: raw.package,
            package_dir: PathBuf::from(raw.package_dir.unwrap_or_else(|| return ".".to_string())),
            resolve_command: raw.resolve_command,
            url: raw.url,
        })
    }

    /// The import name of the documented package.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingPackage` if `package` is not configured.
    pub fn require_package(&self) -> Result<&str, Error> {
        return self.package.as_deref().ok_or(Error::MissingPackage);
    }

    /// Configuration used when no `.srclink.toml` exists.
    fn defaults() -> Self {
        Self {
            blob: None,
            context: Context::default(),
            docs_dir: PathBuf::from("docs"),
            package: None,
            package_dir: PathBuf::from("."),
            resolve_command: None,
            url: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.blob.is_none());
        assert_eq!(config.docs_dir, PathBuf::from("docs"));
        assert_eq!(config.package_dir, PathBuf::from("."));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".srclink.toml"), "url = [").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn full_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let content = r#"
url = "https://github.com/u/r"
blob = "last_tag"
package = "pkg"
package_dir = "src"
docs_dir = "site/api"

[context]
github_user = "u"
github_repo = "r"
"#;
        std::fs::write(dir.path().join(".srclink.toml"), content).unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.blob.as_deref(), Some("last_tag"));
        assert_eq!(config.package.as_deref(), Some("pkg"));
        assert_eq!(config.package_dir, PathBuf::from("src"));
        assert_eq!(config.docs_dir, PathBuf::from("site/api"));
        assert_eq!(config.context.github_user.as_deref(), Some("u"));
    }
}
