//! Highlighter keyword collection for the documented package.
//!
//! Every function and method name defined anywhere in the package becomes
//! an extra highlighting keyword, so signatures and prose code samples
//! light up the package's own API. Independent of the linking feature.

use std::collections::BTreeSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Error;
use crate::pysource;

/// Collect the sorted, deduplicated set of function and method names
/// defined in the package rooted at `package_path`.
///
/// Files that fail to parse are skipped rather than fatal: a single
/// broken module shouldn't take the whole keyword set down with it.
///
/// # Errors
///
/// Returns `Error::PackageNotFound` if `package_path` is not a directory,
/// or `Error::Io` if a source file cannot be read.
pub fn collect(package_path: &Path) -> Result<BTreeSet<String>, Error> {
    if !package_path.is_dir() {
        return Err(Error::PackageNotFound {
            path: package_path.to_path_buf(),
        });
    }

    let mut keywords = BTreeSet::new();
    for entry in WalkDir::new(package_path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.path().extension().is_some_and(|ext| return ext == "py"))
    {
        let source = std::fs::read_to_string(entry.path())?;
        let Ok(names) = pysource::function_names(entry.path(), &source) else {
            eprintln!("srclink: skipping unparseable file {}", entry.path().display());
            continue;
        };
        keywords.extend(names);
    }

    return Ok(keywords);
}

/// Render the keyword set as a JSON array.
pub fn to_json(keywords: &BTreeSet<String>) -> String {
    let names: Vec<&String> = keywords.iter().collect();
    return serde_json::to_string_pretty(&names).unwrap_or_else(|_e| return "[]".to_string());
}
