//! Python source analysis: the static stand-in for runtime introspection.
//!
//! Maps dotted module paths to files on disk and collects dot-qualified
//! definitions with their line spans by walking the tree-sitter CST.

use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser, Tree};

use crate::error::Error;

/// A named definition found in a Python module.
pub struct PyDefinition {
    /// 1-based first line, including decorators when present.
    pub line_start: u32,
    /// 1-based last line, inclusive.
    pub line_stop: u32,
    /// Dot-qualified name within the module, e.g. `Config.validate`.
    pub qualified_name: String,
}

/// Collect every addressable definition in a module: top-level functions
/// and classes, plus members nested in class bodies, qualified with dots.
/// Decorated definitions report the span of the whole decorated node, so
/// a wrapped or property getter still points at its true line range.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if tree-sitter cannot parse the source.
pub fn definitions(file_path: &Path, source: &str) -> Result<Vec<PyDefinition>, Error> {
    let tree = parse_source(file_path, source)?;
    let mut found = Vec::new();
    collect_scope(tree.root_node(), source, "", &mut found);
    return Ok(found);
}

/// Collect the bare names of every function definition in the source,
/// at any nesting depth. Feeds the highlighter keyword set.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if tree-sitter cannot parse the source.
pub fn function_names(file_path: &Path, source: &str) -> Result<Vec<String>, Error> {
    let tree = parse_source(file_path, source)?;
    let mut names = Vec::new();
    collect_function_names(tree.root_node(), source, &mut names);
    return Ok(names);
}

/// Map a dotted module path to a file under `search_dir`.
///
/// `a.b.c` resolves to `a/b/c.py`, or `a/b/c/__init__.py` for packages.
/// Returns `None` when neither exists — the static analogue of a module
/// that is not currently loaded.
pub fn module_file(search_dir: &Path, module: &str) -> Option<PathBuf> {
    if module.is_empty() {
        return None;
    }

    let mut base = search_dir.to_path_buf();
    for segment in module.split('.') {
        base.push(segment);
    }

    let as_module = base.with_extension("py");
    if as_module.is_file() {
        return Some(as_module);
    }

    let as_package = base.join("__init__.py");
    if as_package.is_file() {
        return Some(as_package);
    }
    return None;
}

/// Recursively gather function names from any node.
fn collect_function_names(node: Node<'_>, source: &str, names: &mut Vec<String>) {
    if node.kind() == "function_definition"
        && let Some(name_node) = node.child_by_field_name("name")
        && let Ok(name) = name_node.utf8_text(source.as_bytes())
    {
        names.push(name.to_string());
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_function_names(child, source, names);
    }
}

/// Walk one scope (module root or class body), qualifying names with `prefix`.
fn collect_scope(scope: Node<'_>, source: &str, prefix: &str, found: &mut Vec<PyDefinition>) {
    let mut cursor = scope.walk();
    for child in scope.children(&mut cursor) {
        // A decorated definition wraps the real one; the span of the
        // outer node covers the decorators, matching what a source
        // listing of the unwrapped object would show.
        let (span_node, def_node) = if child.kind() == "decorated_definition" {
            let Some(inner) = child.child_by_field_name("definition") else {
                continue;
            };
            (child, inner)
        } else {
            (child, child)
        };

        match def_node.kind() {
            "class_definition" => {
                let Some(def) = definition_from_nodes(span_node, def_node, source, prefix) else {
                    continue;
                };
                let qualified = def.qualified_name.clone();
                found.push(def);
                if let Some(body) = def_node.child_by_field_name("body") {
                    collect_scope(body, source, &qualified, found);
                }
            },
            "function_definition" => {
                if let Some(def) = definition_from_nodes(span_node, def_node, source, prefix) {
                    found.push(def);
                }
            },
            _ => {},
        }
    }
}

/// Build a `PyDefinition` from a span node and the named definition node.
fn definition_from_nodes(
    span_node: Node<'_>,
    def_node: Node<'_>,
    source: &str,
    prefix: &str,
) -> Option<PyDefinition> {
    let name_node = def_node.child_by_field_name("name")?;
    let name = name_node.utf8_text(source.as_bytes()).ok()?;

    let qualified_name = if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    };

    let line_start = u32::try_from(span_node.start_position().row).ok()?.saturating_add(1);
    let line_stop = u32::try_from(span_node.end_position().row).ok()?.saturating_add(1);

    return Some(PyDefinition {
        line_start,
        line_stop,
        qualified_name,
    });
}

/// Parse Python source into a tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set or parsing fails.
fn parse_source(file_path: &Path, source: &str) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| {
            return Error::ParseFailed {
                file: file_path.to_path_buf(),
                reason: e.to_string(),
            };
        })?;

    return parser.parse(source, None).ok_or_else(|| {
        return Error::ParseFailed {
            file: file_path.to_path_buf(),
            reason: "tree-sitter returned None".to_string(),
        };
    });
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
import os


def connect(timeout=5):
    return os.name


class Config:
    \"\"\"Docstring.\"\"\"

    def validate(self):
        if not self.path:
            raise ValueError
        return True

    @property
    def path(self):
        return self._path

    class Inner:
        def run(self):
            pass
";

    fn find(defs: &[PyDefinition], name: &str) -> (u32, u32) {
        let def = defs
            .iter()
            .find(|d| d.qualified_name == name)
            .unwrap_or_else(|| panic!("missing {name}"));
        (def.line_start, def.line_stop)
    }

    #[test]
    fn top_level_function_span() {
        let defs = definitions(Path::new("mod.py"), SOURCE).unwrap();
        assert_eq!(find(&defs, "connect"), (4, 5));
    }

    #[test]
    fn class_and_method_are_qualified() {
        let defs = definitions(Path::new("mod.py"), SOURCE).unwrap();
        assert_eq!(find(&defs, "Config").0, 8);
        assert_eq!(find(&defs, "Config.validate"), (11, 14));
    }

    #[test]
    fn property_span_includes_decorator() {
        let defs = definitions(Path::new("mod.py"), SOURCE).unwrap();
        assert_eq!(find(&defs, "Config.path"), (16, 18));
    }

    #[test]
    fn nested_class_members_resolve() {
        let defs = definitions(Path::new("mod.py"), SOURCE).unwrap();
        assert_eq!(find(&defs, "Config.Inner.run"), (21, 22));
    }

    #[test]
    fn function_names_include_nested() {
        let names = function_names(Path::new("mod.py"), SOURCE).unwrap();
        assert!(names.contains(&"connect".to_string()));
        assert!(names.contains(&"validate".to_string()));
        assert!(names.contains(&"path".to_string()));
        assert!(names.contains(&"run".to_string()));
    }

    #[test]
    fn module_file_prefers_plain_module() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        std::fs::create_dir_all(pkg.join("sub")).unwrap();
        std::fs::write(pkg.join("__init__.py"), "").unwrap();
        std::fs::write(pkg.join("mod.py"), "").unwrap();
        std::fs::write(pkg.join("sub").join("__init__.py"), "").unwrap();

        assert_eq!(
            module_file(dir.path(), "pkg.mod"),
            Some(dir.path().join("pkg/mod.py"))
        );
        assert_eq!(
            module_file(dir.path(), "pkg.sub"),
            Some(dir.path().join("pkg/sub/__init__.py"))
        );
        assert_eq!(module_file(dir.path(), "pkg.gone"), None);
        assert_eq!(module_file(dir.path(), ""), None);
    }
}
