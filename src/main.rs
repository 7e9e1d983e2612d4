//! packcfg CLI
//!
//! Entry point for the `packcfg` command-line tool.

use clap::{Args, Parser, Subcommand};
use packcfg::chunks::{Assignment, ModuleInfo};
use packcfg::{build, BuildOptions, BuildReport, ProjectLayout};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "packcfg")]
#[command(about = "Compose the bundler configuration", version)]
struct Cli {
    /// Log at debug level (overrides PACKCFG_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LayoutArgs {
    /// Application project root
    #[arg(long, default_value = "../../")]
    root: PathBuf,

    /// Framework source directory (holds HOC/)
    #[arg(long, default_value = ".")]
    framework_dir: PathBuf,

    /// Application entry module
    #[arg(long, default_value = "./App")]
    entry: PathBuf,

    /// Override document (default: <root>/webpack.config.json)
    #[arg(long = "override")]
    override_path: Option<PathBuf>,

    /// Server configuration (default: <root>/src/Server/Config/server.json)
    #[arg(long)]
    server: Option<PathBuf>,

    /// Fail when the override exists but cannot be used
    #[arg(long)]
    strict_override: bool,

    /// Worker pool size (default: processing units + 2)
    #[arg(long)]
    pool_size: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the final configuration
    Build {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Print the build report (sources, override outcome, merged config)
    Inspect {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Partition a module list with the effective chunk groups
    Chunks {
        #[command(flatten)]
        layout: LayoutArgs,

        /// JSON file with [{identifier, size, chunks}]
        #[arg(long, short = 'm')]
        modules: PathBuf,

        /// Output one line per module instead of JSON
        #[arg(long)]
        human: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build { layout, out } => run_build(layout, out),
        Commands::Inspect { layout } => run_inspect(layout),
        Commands::Chunks {
            layout,
            modules,
            human,
        } => run_chunks(layout, modules, human),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("PACKCFG_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_options(args: LayoutArgs) -> BuildOptions {
    let mut layout = ProjectLayout::new(args.root, args.framework_dir).with_app_entry(args.entry);
    if let Some(path) = args.override_path {
        layout = layout.with_override_path(path);
    }
    if let Some(path) = args.server {
        layout = layout.with_server_config_path(path);
    }
    let layout = match layout.absolutize_from_cwd() {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Error resolving working directory: {}", e);
            process::exit(1);
        }
    };

    let mut options = BuildOptions::new(layout);
    options.strict_override = args.strict_override;
    options.pool_size = args.pool_size;
    options
}

fn run_pipeline(args: LayoutArgs) -> BuildReport {
    match build(&build_options(args)) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Configuration build failed at stage '{}': {}", e.stage(), e);
            process::exit(e.exit_code());
        }
    }
}

fn run_build(args: LayoutArgs, out: Option<PathBuf>) {
    let report = run_pipeline(args);

    let json = match report.final_config.to_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    };

    match out {
        Some(path) => {
            if let Err(e) = fs::write(&path, format!("{}\n", json)) {
                eprintln!("Error writing {}: {}", path.display(), e);
                process::exit(1);
            }
        }
        None => println!("{}", json),
    }
}

fn run_inspect(args: LayoutArgs) {
    let report = run_pipeline(args);
    match report.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_chunks(args: LayoutArgs, modules_path: PathBuf, human: bool) {
    let modules: Vec<ModuleInfo> = match fs::read_to_string(&modules_path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
    {
        Ok(modules) => modules,
        Err(e) => {
            eprintln!("Error loading modules from {}: {}", modules_path.display(), e);
            process::exit(1);
        }
    };

    let report = run_pipeline(args);
    let rules = report.final_config.split_rules();

    if human {
        for module in &modules {
            println!("{}", rules.assign(module).to_human());
        }
        return;
    }

    let assignments: Vec<Assignment> = modules.iter().map(|m| rules.assign(m)).collect();
    let output = serde_json::json!({
        "assignments": assignments,
        "partition": rules.partition(&modules),
    });
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
