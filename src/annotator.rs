//! Markdown annotation: attach `[source]` links to signature blocks.
//!
//! API pages use MyST-style directive fences for signatures:
//!
//! ~~~text
//! ```{py:function} pkg.mod.connect(timeout=5)
//! :module: pkg.mod
//! ```
//! ~~~
//!
//! Each block gets at most one link per distinct URL, inserted on its own
//! line right after the closing fence. Re-running on an already annotated
//! tree is a no-op.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::Error;
use crate::resolver::Resolver;
use crate::types::SymbolReference;

/// Result of annotating one markdown file.
pub struct FileOutcome {
    /// Whether the annotated content differs from the input.
    pub changed: bool,
    /// The annotated content.
    pub content: String,
    /// One entry per signature encountered, resolved or not.
    pub signatures: Vec<SignatureOutcome>,
}

/// One signature processed during annotation.
pub struct SignatureOutcome {
    /// The dotted name as written in the signature line.
    pub name: String,
    /// The resolved URL, or `None` when no link was produced.
    pub url: Option<String>,
}

/// Aggregate result of annotating a docs tree.
pub struct TreeOutcome {
    /// Files whose content would change (or did change, when writing).
    pub changed_files: Vec<PathBuf>,
    /// Signatures that received a new link.
    pub linked: u32,
    /// Signatures that produced no link.
    pub skipped: u32,
}

/// A parsed directive block: signatures, module option, and fence bounds.
struct Block {
    /// Index of the closing fence line.
    close: usize,
    /// Documentation domain from the directive tag.
    domain: String,
    /// Module from a `:module:` option line, if present.
    module: Option<String>,
    /// Dotted name per signature line, in order of appearance.
    signatures: Vec<String>,
}

/// Annotate a single file's content without touching the filesystem.
///
/// # Errors
///
/// Returns `Error::ResolveCommandFailed` from an external resolver.
///
/// # Panics
///
/// Panics if the hardcoded directive regexes are invalid (compile-time invariant).
pub fn annotate_content(content: &str, resolver: &Resolver) -> Result<FileOutcome, Error> {
    let opening = Regex::new(r"^```\{([a-z]+):(\w+)\}\s+(\S.*)$").expect("valid regex");
    let link_line = Regex::new(r"^\[\\\[source\\\]\]\((\S+)\)$").expect("valid regex");

    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    let mut signatures: Vec<SignatureOutcome> = Vec::new();
    let mut changed = false;

    let mut i = 0;
    while i < lines.len() {
        let Some(block) = parse_block(&lines, i, &opening) else {
            i = i.saturating_add(1);
            continue;
        };
        let next = annotate_block(&mut lines, &block, resolver, &link_line, &mut signatures)?;
        if next.inserted > 0 {
            changed = true;
        }
        i = next.resume_at;
    }

    let mut output = lines.join("\n");
    if content.ends_with('\n') {
        output.push('\n');
    }

    return Ok(FileOutcome {
        changed,
        content: output,
        signatures,
    });
}

/// Annotate every `.md` file under `docs_dir`, writing changes back when
/// `write` is set. Prints one informational line per link produced.
///
/// # Errors
///
/// Returns `Error::Io` on read/write failures, or resolver errors.
pub fn annotate_tree(
    docs_dir: &Path,
    resolver: &Resolver,
    write: bool,
) -> Result<TreeOutcome, Error> {
    let mut outcome = TreeOutcome {
        changed_files: Vec::new(),
        linked: 0,
        skipped: 0,
    };

    for entry in WalkDir::new(docs_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.path().extension().is_some_and(|ext| return ext == "md"))
    {
        let md_path = entry.path();
        let content = std::fs::read_to_string(md_path)?;
        let file = annotate_content(&content, resolver)?;

        for sig in &file.signatures {
            match &sig.url {
                Some(url) => {
                    outcome.linked = outcome.linked.saturating_add(1);
                    println!("link: {} -> {url}", sig.name);
                },
                None => outcome.skipped = outcome.skipped.saturating_add(1),
            }
        }

        if file.changed {
            outcome.changed_files.push(md_path.to_path_buf());
            if write {
                std::fs::write(md_path, file.content)?;
            }
        }
    }

    return Ok(outcome);
}

/// Result of processing one block: where scanning resumes and how many
/// link lines were inserted.
struct BlockStep {
    /// Number of newly inserted link lines.
    inserted: usize,
    /// Line index to resume scanning at.
    resume_at: usize,
}

/// Resolve a block's signatures and insert missing link lines after its
/// closing fence. Link lines already present count toward the per-block
/// URL dedupe set, which makes annotation idempotent.
fn annotate_block(
    lines: &mut Vec<String>,
    block: &Block,
    resolver: &Resolver,
    link_line: &Regex,
    signatures: &mut Vec<SignatureOutcome>,
) -> Result<BlockStep, Error> {
    // URLs already attached to this block from a previous run.
    let mut used: HashSet<String> = HashSet::new();
    let mut insert_at = block.close.saturating_add(1);
    while let Some(existing) = lines.get(insert_at) {
        let Some(cap) = link_line.captures(existing) else {
            break;
        };
        if let Some(url) = cap.get(1) {
            used.insert(url.as_str().to_string());
        }
        insert_at = insert_at.saturating_add(1);
    }

    let mut inserted = 0_usize;
    for name in &block.signatures {
        let reference = SymbolReference {
            domain: block.domain.clone(),
            fullname: name.clone(),
            module: block.module.clone(),
        };
        let url = resolver.resolve(&reference)?;

        if let Some(url) = &url
            && !used.contains(url)
        {
            used.insert(url.clone());
            lines.insert(insert_at, format!("[\\[source\\]]({url})"));
            insert_at = insert_at.saturating_add(1);
            inserted = inserted.saturating_add(1);
            signatures.push(SignatureOutcome {
                name: name.clone(),
                url: Some(url.clone()),
            });
            continue;
        }

        // Duplicate URLs on the same block are suppressed, not counted
        // as failures; a pre-existing link line also lands here.
        signatures.push(SignatureOutcome {
            name: name.clone(),
            url: None,
        });
    }

    return Ok(BlockStep {
        inserted,
        resume_at: insert_at,
    });
}

/// Extract the dotted name from a signature, dropping any argument list.
/// Returns `None` when the remainder is not a plain dotted identifier.
fn parse_signature_name(signature: &str) -> Option<String> {
    let name = signature.split('(').next()?.trim();
    if name.is_empty() {
        return None;
    }

    let valid = name
        .chars()
        .all(|c| return c.is_alphanumeric() || c == '_' || c == '.');
    if !valid {
        return None;
    }
    return Some(name.to_string());
}

/// Try to parse a directive block starting at line `start`.
///
/// Continuation signature lines may follow the opening line; option
/// lines (`:field: value`) follow the signatures; the body runs to the
/// closing fence. Blocks without a closing fence are ignored.
fn parse_block(lines: &[String], start: usize, opening: &Regex) -> Option<Block> {
    let first = lines.get(start)?;
    let cap = opening.captures(first)?;
    let domain = cap.get(1)?.as_str().to_string();
    let mut signatures = Vec::new();

    if let Some(name) = parse_signature_name(cap.get(3)?.as_str()) {
        signatures.push(name);
    }

    // Additional overload signatures directly under the opening line.
    let mut i = start.saturating_add(1);
    while let Some(line) = lines.get(i) {
        if line.is_empty() || line.starts_with(':') || line == "```" {
            break;
        }
        let Some(name) = parse_signature_name(line) else {
            break;
        };
        signatures.push(name);
        i = i.saturating_add(1);
    }

    // Option lines.
    let mut module = None;
    while let Some(line) = lines.get(i) {
        let Some(rest) = line.strip_prefix(':') else {
            break;
        };
        if let Some(value) = rest.strip_prefix("module:") {
            module = Some(value.trim().to_string());
        }
        i = i.saturating_add(1);
    }

    // Body runs to the closing fence.
    let close = (i..lines.len()).find(|&j| {
        return lines.get(j).is_some_and(|l| return l.trim_end() == "```");
    })?;

    if signatures.is_empty() {
        return None;
    }
    return Some(Block {
        close,
        domain,
        module,
        signatures,
    });
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::types::UrlTemplate;

    const PY_MOD: &str = "\
def connect(timeout=5):
    return timeout


def connect_async(timeout=5):
    return timeout
";

    fn fixture_resolver(dir: &tempfile::TempDir) -> Resolver {
        let pkg = dir.path().join("pkg");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join("__init__.py"), "").unwrap();
        std::fs::write(pkg.join("mod.py"), PY_MOD).unwrap();
        Resolver::Builtin {
            repo_root: dir.path().to_path_buf(),
            search_dir: dir.path().to_path_buf(),
            template: UrlTemplate("<b>/blob/<r>/{filepath}#L{linestart}-L{linestop}".to_string()),
        }
    }

    #[test]
    fn appends_link_after_block() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = fixture_resolver(&dir);
        let doc = "# API\n\n```{py:function} pkg.mod.connect(timeout=5)\nOpen a connection.\n```\n";
        let outcome = annotate_content(doc, &resolver).unwrap();

        assert!(outcome.changed);
        assert!(outcome
            .content
            .contains("[\\[source\\]](<b>/blob/<r>/pkg/mod.py#L1-L2)"));
    }

    #[test]
    fn module_option_supplies_the_module() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = fixture_resolver(&dir);
        let doc = "```{py:function} connect(timeout=5)\n:module: pkg.mod\n```\n";
        let outcome = annotate_content(doc, &resolver).unwrap();

        assert!(outcome.content.contains("pkg/mod.py#L1-L2"));
    }

    #[test]
    fn annotation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = fixture_resolver(&dir);
        let doc = "```{py:function} pkg.mod.connect(timeout=5)\n```\n";

        let first = annotate_content(doc, &resolver).unwrap();
        assert!(first.changed);
        let second = annotate_content(&first.content, &resolver).unwrap();
        assert!(!second.changed);
        assert_eq!(first.content, second.content);
    }

    #[test]
    fn duplicate_urls_in_one_block_get_one_link() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = fixture_resolver(&dir);
        // Two overload signatures resolving to the same definition.
        let doc = "```{py:function} pkg.mod.connect(timeout=5)\npkg.mod.connect(timeout, retries)\n```\n";
        let outcome = annotate_content(doc, &resolver).unwrap();

        assert_eq!(outcome.content.matches("[\\[source\\]]").count(), 1);
    }

    #[test]
    fn distinct_urls_in_one_block_each_get_a_link() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = fixture_resolver(&dir);
        let doc = "```{py:function} pkg.mod.connect(timeout=5)\npkg.mod.connect_async(timeout=5)\n```\n";
        let outcome = annotate_content(doc, &resolver).unwrap();

        assert_eq!(outcome.content.matches("[\\[source\\]]").count(), 2);
    }

    #[test]
    fn non_py_domains_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = fixture_resolver(&dir);
        let doc = "```{cpp:function} ns::connect(int)\n```\n";
        let outcome = annotate_content(doc, &resolver).unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.content, doc);
    }

    #[test]
    fn unresolvable_symbol_is_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = fixture_resolver(&dir);
        let doc = "```{py:function} pkg.mod.gone()\n```\n";
        let outcome = annotate_content(doc, &resolver).unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.signatures.len(), 1);
        assert!(outcome.signatures.first().unwrap().url.is_none());
    }
}
