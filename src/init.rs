//! `.srclink.toml` creation and format-preserving updates.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Error;

/// Values supplied on the `init` command line. Absent values leave any
/// existing configuration untouched.
pub struct InitValues {
    /// Revision selection mode or explicit ref.
    pub blob: Option<String>,
    /// Package import name.
    pub package: Option<String>,
    /// Repository name for the context fallback.
    pub repo: Option<String>,
    /// Base repository URL.
    pub url: Option<String>,
    /// Account name for the context fallback.
    pub user: Option<String>,
}

/// Create or update `.srclink.toml`, preserving the user's formatting
/// and comments. A blob mode is filled in with the default when the file
/// ends up without one.
///
/// # Errors
///
/// Returns `Error::Io` on read/write failure, or `Error::ParseFailed`
/// if an existing config cannot be parsed.
pub fn run(root: &Path, values: &InitValues) -> Result<(), Error> {
    let (config_path, mut doc) = read_config_doc(root)?;

    for (key, value) in [
        ("blob", &values.blob),
        ("package", &values.package),
        ("url", &values.url),
    ] {
        if let Some(value) = value {
            doc[key] = toml_edit::value(value.as_str());
        }
    }

    if values.repo.is_some() || values.user.is_some() {
        if !doc.contains_key("context") {
            doc["context"] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        if let Some(user) = &values.user {
            doc["context"]["github_user"] = toml_edit::value(user.as_str());
        }
        if let Some(repo) = &values.repo {
            doc["context"]["github_repo"] = toml_edit::value(repo.as_str());
        }
    }

    if !doc.contains_key("blob") {
        doc["blob"] = toml_edit::value(Config::DEFAULT_BLOB);
    }

    std::fs::write(&config_path, doc.to_string())?;
    println!("Wrote {}", config_path.display());
    return Ok(());
}

/// Parse `.srclink.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ParseFailed` on parse failure.
fn read_config_doc(root: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), Error> {
    let config_path = root.join(".srclink.toml");
    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::Io(e)),
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return Error::ParseFailed {
            file: config_path.clone(),
            reason: e.to_string(),
        };
    })?;

    return Ok((config_path, doc));
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn creates_config_with_default_blob() {
        let dir = tempfile::tempdir().unwrap();
        let values = InitValues {
            blob: None,
            package: Some("pkg".to_string()),
            repo: Some("r".to_string()),
            url: None,
            user: Some("u".to_string()),
        };
        run(dir.path(), &values).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.blob.as_deref(), Some(Config::DEFAULT_BLOB));
        assert_eq!(config.package.as_deref(), Some("pkg"));
        assert_eq!(config.context.github_user.as_deref(), Some("u"));
        assert_eq!(config.context.github_repo.as_deref(), Some("r"));
    }

    #[test]
    fn update_preserves_comments_and_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let existing = "# pinned on purpose\nblob = \"v1.0\"\npackage = \"pkg\"\n";
        std::fs::write(dir.path().join(".srclink.toml"), existing).unwrap();

        let values = InitValues {
            blob: None,
            package: None,
            repo: None,
            url: Some("https://github.com/u/r".to_string()),
            user: None,
        };
        run(dir.path(), &values).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".srclink.toml")).unwrap();
        assert!(content.contains("# pinned on purpose"));
        assert!(content.contains("blob = \"v1.0\""));
        assert!(content.contains("https://github.com/u/r"));
    }
}
