use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "bpaudit",
    about = "bpaudit: pre-flight validation of test-generation blueprints",
    version
)]
pub struct Cli {
    /// Log pass-level detail to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit a blueprint and report defects, score and verdict
    Audit {
        /// Path to the blueprint JSON
        #[arg(long)]
        blueprint: Option<String>,

        /// Chunk document (repeatable)
        #[arg(long = "chunk")]
        chunks: Vec<String>,

        /// Directory of chunk documents (`*.json`, read in name order)
        #[arg(long)]
        chunks_dir: Option<String>,

        /// Pre-computed source route scan
        #[arg(long)]
        source_scan: Option<String>,

        /// Scan a Next.js App Router api directory
        #[arg(long)]
        scan_nextjs: Option<String>,

        /// Scan an Express source tree
        #[arg(long)]
        scan_express: Option<String>,

        /// Path prefix applied by --scan-nextjs/--scan-express
        #[arg(long)]
        prefix: Option<String>,

        /// Path to bpaudit.toml (defaults to ./bpaudit.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract routes from a source tree as a scan document
    Scan {
        /// Source framework
        #[arg(long, value_enum)]
        framework: FrameworkArg,

        /// Root directory to scan
        #[arg(long)]
        root: String,

        /// Path prefix for every extracted route
        #[arg(long)]
        prefix: Option<String>,

        /// Write the scan document here instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FrameworkArg {
    Nextjs,
    Express,
}
