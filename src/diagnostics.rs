use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Only configuration-class failures reach this point; each block says
/// what is missing and how to supply it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::MissingPackage => "\
# Error: Package Not Configured

No `package` value in `.srclink.toml`.

## Fix

    srclink init --package <name>
"
        .to_string(),

        Error::MissingRevision => "\
# Error: No Revision To Link To

No blob mode is set and the context has no `github_version`.

## Fix

Set `blob` in `.srclink.toml` to `head`, `last_tag`, or an explicit ref,
or add `github_version` under `[context]`.
"
        .to_string(),

        Error::MissingUrl => "\
# Error: Repository URL Missing

No `url` in `.srclink.toml` and no `github_user`/`github_repo` context
to derive one from.

## Fix

    srclink init --url https://github.com/<user>/<repo>
"
        .to_string(),

        Error::NoTagsFound => "\
# Error: No Tags On Branch

`blob = \"last_tag\"` requires at least one tag reachable from the
current branch.

## Fix

Tag a commit, or switch `blob` to `head` or an explicit ref.
"
        .to_string(),

        Error::PackageNotFound { path } => format!(
            "\
# Error: Package Not Found

`{}` is not a directory.

## Fix

Check `package` and `package_dir` in `.srclink.toml`.
",
            path.display()
        ),

        Error::RepoRoot { reason } => format!(
            "\
# Error: Not A Repository

Could not determine the repository root: {reason}

## Fix

Run srclink inside a git working tree.
"
        ),

        Error::ResolveCommandFailed { command, reason } => format!(
            "\
# Error: Resolve Command Failed

`{command}` could not be run: {reason}

## Fix

Check `resolve_command` in `.srclink.toml`.
"
        ),

        Error::Io(e) => format!("# Error: I/O\n\n{e}\n"),
        Error::ParseFailed { file, reason } => {
            format!("# Error: Parse Failed\n\nCould not parse `{}`: {reason}\n", file.display())
        },
        Error::TomlDe(e) => format!("# Error: Config Malformed\n\n{e}\n"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_renders_a_heading() {
        let errors = [
            Error::MissingPackage,
            Error::MissingRevision,
            Error::MissingUrl,
            Error::NoTagsFound,
        ];
        for e in &errors {
            assert!(render_error(e).starts_with("# Error:"), "{e}");
        }
    }
}
