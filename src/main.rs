mod annotator;
mod commands;
mod config;
mod diagnostics;
mod error;
mod init;
mod keywords;
mod pysource;
mod resolver;
mod revision;
mod types;
mod watch;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "srclink", about = "Pin [source] links in API docs to GitHub blob line ranges")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach [source] links to signature blocks in the docs tree
    Annotate,
    /// Report which docs files are missing links, without writing
    Check,
    /// Create or update .srclink.toml
    Init {
        /// Revision selection: "head", "last_tag", or an explicit ref
        #[arg(long)]
        blob: Option<String>,
        /// Import name of the documented package
        #[arg(long)]
        package: Option<String>,
        /// GitHub repository name (context fallback)
        #[arg(long)]
        repo: Option<String>,
        /// Base repository URL
        #[arg(long)]
        url: Option<String>,
        /// GitHub account name (context fallback)
        #[arg(long)]
        user: Option<String>,
    },
    /// Print the package's function/method names as highlighter keywords
    Keywords {
        /// Emit a JSON array instead of one name per line
        #[arg(long)]
        json: bool,
    },
    /// Resolve one symbol reference and print its URL
    Resolve {
        /// Documentation domain of the reference
        #[arg(long, default_value = "py")]
        domain: String,
        /// Dotted module path, when known separately from the name
        #[arg(long)]
        module: Option<String>,
        /// Dot-qualified symbol name
        name: String,
    },
    /// Print the revision links would be pinned to
    Revision,
    /// Re-run check whenever docs or package sources change
    Watch,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Annotate => commands::annotate().map(|()| return ExitCode::SUCCESS),
        Commands::Check => commands::check(),
        Commands::Init { blob, package, repo, url, user } => {
            let values = init::InitValues { blob, package, repo, url, user };
            commands::init(&values).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Keywords { json } => {
            commands::print_keywords(json).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Resolve { domain, module, name } => {
            commands::resolve(&name, &domain, module.as_deref())
        },
        Commands::Revision => commands::print_revision().map(|()| return ExitCode::SUCCESS),
        Commands::Watch => watch::run(),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
