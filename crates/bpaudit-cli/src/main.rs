//! bpaudit CLI: the `bpaudit` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Audit {
            blueprint,
            chunks,
            chunks_dir,
            source_scan,
            scan_nextjs,
            scan_express,
            prefix,
            config,
            json,
        } => commands::audit::run(commands::audit::Args {
            blueprint,
            chunks,
            chunks_dir,
            source_scan,
            scan_nextjs,
            scan_express,
            prefix,
            config,
            json,
        }),

        Commands::Scan {
            framework,
            root,
            prefix,
            output,
        } => commands::scan::run(framework, root, prefix, output),
    }
}
