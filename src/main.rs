use clap::{Parser, Subcommand};
use docflat::assemble::Assembler;
use docflat::config::{self, SiteConfig};
use docflat::mkdocs::MkDocsBuilder;
use docflat::output;
use docflat::rewrite::LinkRewriter;
use docflat::source::{DocumentSource, GitHubSource, LocalSource, PathFilter};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Where documents come from, shared by every command that fetches.
#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// GitHub token for API requests (raises the rate limit, reaches private repos)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Read documents from a local checkout instead of the GitHub API
    #[arg(long, value_name = "DIR")]
    local: Option<PathBuf>,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "docflat")]
#[command(about = "Assemble a flattened MkDocs site from a repository's markdown")]
#[command(long_about = "\
Assemble a flattened MkDocs site from a repository's markdown

Every markdown file in the repository is fetched, the docs root is stripped
from its path, and its links are rewritten to match the flattened layout.
A navigation tree is built from the filenames and MkDocs builds the site.

Paths:
  README.md              → README.md          Home, pinned first
  CONTRIBUTING.md        → CONTRIBUTING.md
  docs/CLI.md            → CLI.md
  docs/guide/SETUP.md    → guide/SETUP.md
  [reference] source     → API_REFERENCE.md   API Reference, pinned last

Links:
  docs/CLI, docs/CLI.md    → CLI.md
  CONTRIBUTING             → CONTRIBUTING.md
  ./LICENSE, config.yml    → https://github.com/<repo>/blob/<branch>/...
  https://..., #anchor     → unchanged

Run 'docflat gen-config' to generate a documented docflat.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: <project-dir>/docflat.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that receives docs/, mkdocs.yml and site/
    #[arg(long, default_value = ".", global = true)]
    project_dir: PathBuf,

    /// Log pipeline internals (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: fetch → write → mkdocs build
    Build(SourceArgs),
    /// Write the docs tree and mkdocs.yml without building the site
    Prepare(SourceArgs),
    /// Print the navigation the site would get
    Nav {
        #[command(flatten)]
        source: SourceArgs,
        /// Print as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// Rewrite the links of one markdown file and print the result
    Rewrite {
        /// Markdown file to rewrite
        file: PathBuf,
        /// Repository path the file came from (for diagnostics)
        #[arg(long)]
        origin: Option<String>,
    },
    /// Print a stock docflat.toml with all options documented
    GenConfig,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        output::print_error(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Build(args) => assemble(cli, args, true)?,
        Command::Prepare(args) => assemble(cli, args, false)?,
        Command::Nav { source, json } => {
            let config = load_config(cli)?;
            let source = make_source(&config, source);
            let assembler = Assembler::new(config, &cli.project_dir);
            let collected = assembler.collect(source.as_ref());
            let nav = assembler.navigation(&assembler.rewrite(&collected.documents));
            if *json {
                println!("{}", serde_json::to_string_pretty(&nav)?);
            } else {
                output::print_nav(&nav);
            }
        }
        Command::Rewrite { file, origin } => {
            let config = load_config(cli)?;
            let text = std::fs::read_to_string(file)?;
            let origin = origin
                .clone()
                .unwrap_or_else(|| file.display().to_string());
            let rewriter = LinkRewriter::new(&config.repository, &config.layout);
            print!("{}", rewriter.rewrite(&text, &origin));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so `rewrite` and `nav --json` stay pipeable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.project_dir.join("docflat.toml"));
    tracing::debug!(path = %path.display(), "Loading config");
    config::load_config(&path)
}

fn make_source(config: &SiteConfig, args: &SourceArgs) -> Box<dyn DocumentSource> {
    let filter = PathFilter::new(&config.fetch.exclude);
    match &args.local {
        Some(dir) => Box::new(LocalSource::new(dir.clone(), filter)),
        None => Box::new(
            GitHubSource::new(config.repository.clone(), args.token.clone(), filter)
                .with_home(config.navigation.home.clone()),
        ),
    }
}

/// Run the pipeline with progress printed from a separate thread.
fn assemble(cli: &Cli, args: &SourceArgs, build: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli)?;
    let source = make_source(&config, args);
    let project_dir: &Path = &cli.project_dir;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_event(&event) {
                println!("{}", line);
            }
        }
    });

    let result = {
        let builder = MkDocsBuilder::new(config.output.build_command.clone());
        let assembler = Assembler::new(config, project_dir).with_events(tx);
        if build {
            assembler.run(source.as_ref(), &builder)
        } else {
            assembler.prepare(source.as_ref())
        }
    };
    printer.join().map_err(|_| "output thread panicked")?;

    output::print_outcome(&result?);
    Ok(())
}
