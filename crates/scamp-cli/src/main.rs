mod commands;
mod load;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scamp")]
#[command(about = "Step through Scamp programs one reduction at a time", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mount a directory under a path prefix (repeatable), e.g. /lib/=./lib
    #[arg(long = "mount", value_name = "PREFIX=DIR", global = true, value_parser = load::parse_mount)]
    mounts: Vec<(String, String)>,

    /// Stop after this many micro-steps
    #[arg(long, global = true, default_value = "1000000")]
    max_steps: u64,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a program to completion and print the final program
    Run {
        /// Local path, mounted path or http(s) URL
        path: String,
    },

    /// Print every micro-step of a program
    Trace {
        /// Local path, mounted path or http(s) URL
        path: String,
    },

    /// Parse and scope-check a program without running it
    Check {
        /// Local path, mounted path or http(s) URL
        path: String,
    },

    /// Evaluate program text given on the command line
    Eval {
        /// Program text, e.g. "(define x 2) (* x x)"
        code: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = commands::Options {
        max_steps: cli.max_steps,
        json: cli.json,
    };

    match cli.command {
        Commands::Run { path } => {
            let source = load::read_source(&cli.mounts, &path)?;
            commands::run(&source, &options)?;
        }

        Commands::Trace { path } => {
            let source = load::read_source(&cli.mounts, &path)?;
            commands::trace(&source, &options)?;
        }

        Commands::Check { path } => {
            let source = load::read_source(&cli.mounts, &path)?;
            commands::check(&source, &options)?;
        }

        Commands::Eval { code } => {
            let source = scamp_types::SourceFile::new(scamp_compiler::INPUT_NAME, code);
            commands::run(&source, &options)?;
        }
    }

    Ok(())
}
