#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, fail, resolve_output_mode};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wave_core::resolve_config;

/// Log file used while the board owns the terminal.
const TUI_LOG_FILE: &str = ".wave/wave.log";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "wave: read wave posts, comment on them and summarize them",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides FORMAT env and TTY detection).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Post source: `local`, `remote`, or a literal path or URL.
    #[arg(long, global = true)]
    source: Option<String>,

    /// Display name for comments added in the board.
    #[arg(long, global = true)]
    author: Option<String>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }

    fn source_flag(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List posts",
        long_about = "List posts from the active source with their comment counts.",
        after_help = "EXAMPLES:\n    # List posts from the default source\n    wave list\n\n    # List the first five remote posts\n    wave --source remote list -n 5\n\n    # Emit machine-readable output\n    wave list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one post",
        long_about = "Show a post's title, content and comments by ID.",
        after_help = "EXAMPLES:\n    # Show a post\n    wave show 1\n\n    # Read from a specific file\n    wave --source data/other.json show 1\n\n    # Emit machine-readable output\n    wave show 1 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "Print a comments document",
        long_about = "Load a comments document, unwrap its envelopes and print the comments.",
        after_help = "EXAMPLES:\n    # Print the configured comments document\n    wave comments\n\n    # Read a local file\n    wave comments --file comments.json\n\n    # Fetch from a URL\n    wave comments --from https://example.com/comments.json"
    )]
    Comments(cmd::comments::CommentsArgs),

    #[command(
        next_help_heading = "Summaries",
        about = "Summarize a post",
        long_about = "Generate a short summary of a post or of literal text. A generation failure prints the fallback summary unless --strict is set.",
        after_help = "EXAMPLES:\n    # Summarize a post\n    wave summarize 1\n\n    # Summarize literal text\n    wave summarize --text \"Long wave content...\"\n\n    # Fail instead of printing the fallback\n    wave summarize 1 --strict"
    )]
    Summarize(cmd::summarize::SummarizeArgs),

    #[command(
        next_help_heading = "Interactive",
        about = "Open the interactive board",
        long_about = "Open a full-screen board of post cards. Summarize, comment, toggle sources and load comment files from the keyboard.",
        after_help = "EXAMPLES:\n    # Open the board on the default source\n    wave tui\n\n    # Start on the remote source as a named author\n    wave --source remote --author Ann tui"
    )]
    Tui(cmd::tui::TuiArgs),

    #[command(
        next_help_heading = "Config",
        about = "Inspect configuration",
        long_about = "Show the effective configuration or the raw project or user file.",
        after_help = "EXAMPLES:\n    # Show effective configuration\n    wave config show\n\n    # Show the raw project file\n    wave config show --project"
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Config",
        about = "Generate shell completions",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    wave completions bash\n\n    # Generate zsh completions\n    wave completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool, log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_env("WAVE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "wave=debug,info"
        } else if quiet {
            "error"
        } else {
            "wave=info,warn"
        })
    });

    let format = env::var("WAVE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let (writer, ansi) = log_file.map_or_else(
        || (BoxMakeWriter::new(std::io::stderr), true),
        |path| (file_writer(path), false),
    );

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_ansi(ansi).with_writer(writer))
                .init();
        }
    }
}

/// Append to `path`, or discard logs when it cannot be opened.
fn file_writer(path: &Path) -> BoxMakeWriter {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(std::io::sink),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let project_root: PathBuf = env::current_dir()?;

    let log_file = matches!(cli.command, Commands::Tui(_)).then(|| project_root.join(TUI_LOG_FILE));
    init_tracing(cli.verbose, cli.quiet, log_file.as_deref());

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let config = resolve_config(&project_root).map_err(|err| fail(output, err))?;
    debug!(project = %config.project_path.display(), "configuration resolved");

    let source = cli.source_flag();
    match &cli.command {
        Commands::List(args) => cmd::list::run_list(args, &config, source, output),
        Commands::Show(args) => cmd::show::run_show(args, &config, source, output),
        Commands::Comments(args) => cmd::comments::run_comments(args, &config, output),
        Commands::Summarize(args) => {
            cmd::summarize::run_summarize(args, &config, source, output)
        }
        Commands::Tui(args) => cmd::tui::run_tui(args, &config, source, cli.author.as_deref()),
        Commands::Config(args) => cmd::config::run_config(args, &config, output),
        Commands::Completions(_) => Ok(()),
    }
}
