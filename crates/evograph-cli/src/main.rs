#![forbid(unsafe_code)]

mod cmd;
mod output;
mod project;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "evo: animal ancestry forest",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize an evograph project",
        long_about = "Create .evograph/ with a default config.toml in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    evo init\n\n    # Rewrite the config template\n    evo init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Add an animal or taxon",
        long_about = "Create one node with a fresh id, optionally under an existing ancestor. \
                      A node with a scientific name is a leaf species.",
        after_help = "EXAMPLES:\n    # Add a root taxon\n    evo add Mammalia\n\n    # Add a species under it\n    evo add Lion --ancestor 1 --scientific-name \"Panthera leo\"\n\n    # Emit machine-readable output\n    evo add Tiger --ancestor 1 --json"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Attach a species under a taxonomy path",
        long_about = "Walk a classification path from the top, reusing taxa that exist by name \
                      and creating the rest, then add the species under the last one.",
        after_help = "EXAMPLES:\n    # Attach a lion under its classification\n    evo attach Lion --path Animalia,Mammalia,Carnivora,Felidae --scientific-name \"Panthera leo\""
    )]
    Attach(cmd::attach::AttachArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Update descriptive attributes",
        after_help = "EXAMPLES:\n    # Fix a lifespan\n    evo update 4 --lifespan \"10-14 years\""
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Move a node under another ancestor",
        long_about = "Re-parent a node. Moves that would make a node its own ancestor are rejected.",
        after_help = "EXAMPLES:\n    # Move node 5 under node 2\n    evo move 5 --ancestor 2\n\n    # Make node 5 a root\n    evo move 5 --root"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Delete a node",
        long_about = "Remove one node. Descendants are kept and their ancestor link is left dangling.",
        after_help = "EXAMPLES:\n    # Delete node 3\n    evo delete 3"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Resolve deferred enrichment",
        after_help = "EXAMPLES:\n    # List the queue\n    evo enrich --pending\n\n    # Fill in one node\n    evo enrich 4 --fun-fact \"Sleeps up to 20 hours a day\"\n\n    # Give up on a node\n    evo enrich 4 --fail \"no source found\"\n\n    # Apply results for every pending node\n    evo enrich --from-file results.json"
    )]
    Enrich(cmd::enrich::EnrichArgs),

    #[command(
        next_help_heading = "Read",
        about = "List animals",
        after_help = "EXAMPLES:\n    # Everything\n    evo list\n\n    # Leaf species only\n    evo list --species --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one animal",
        after_help = "EXAMPLES:\n    evo show 4"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Query",
        about = "Show the ancestor chain of an animal",
        after_help = "EXAMPLES:\n    evo lineage 4"
    )]
    Lineage(cmd::lineage::LineageArgs),

    #[command(
        next_help_heading = "Query",
        about = "Find the closest common ancestor of two species",
        long_about = "Lowest common ancestor of two leaf species, with the number of steps \
                      from each side.",
        after_help = "EXAMPLES:\n    # Lion and tiger\n    evo common 4 5\n\n    # Emit machine-readable output\n    evo common 4 5 --json"
    )]
    Common(cmd::common::CommonArgs),

    #[command(
        next_help_heading = "Query",
        about = "Project the forest as nodes and edges",
        after_help = "EXAMPLES:\n    # Outline\n    evo graph\n\n    # Renderer input\n    evo graph --json"
    )]
    Graph(cmd::graph::GraphArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("EVOGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "evograph=debug,info"
        } else {
            "evograph=info,warn"
        })
    });

    let format = env::var("EVOGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(command: &Commands, output: OutputMode) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;
    debug!(root = %project_root.display(), "resolved working directory");

    match command {
        Commands::Init(args) => cmd::init::run_init(args, output, &project_root),
        Commands::Add(args) => cmd::add::run_add(args, output, &project_root),
        Commands::Attach(args) => cmd::attach::run_attach(args, output, &project_root),
        Commands::Update(args) => cmd::update::run_update(args, output, &project_root),
        Commands::Move(args) => cmd::move_cmd::run_move(args, output, &project_root),
        Commands::Delete(args) => cmd::delete::run_delete(args, output, &project_root),
        Commands::Enrich(args) => cmd::enrich::run_enrich(args, output, &project_root),
        Commands::List(args) => cmd::list::run_list(args, output, &project_root),
        Commands::Show(args) => cmd::show::run_show(args, output, &project_root),
        Commands::Lineage(args) => cmd::lineage::run_lineage(args, output, &project_root),
        Commands::Common(args) => cmd::common::run_common(args, output, &project_root),
        Commands::Graph(args) => cmd::graph::run_graph(args, output, &project_root),
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match run(&cli.command, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("command failed: {err:?}");
            if let Err(render_err) = render_error(output, &CliError::from(&err)) {
                eprintln!("error: {err:#} (while reporting: {render_err})");
            }
            ExitCode::FAILURE
        }
    }
}
