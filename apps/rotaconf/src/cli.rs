//! CLI argument parsing via `clap`.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rotaconf",
    version,
    about = "Converge logrotate configuration to a declared state"
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    /// Log level: trace|debug|info|warn|error|off
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    /// Log format on stderr: human|jsonl
    #[arg(long, global = true, default_value = "human")]
    pub log_format: String,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Clone, Default)]
/// Options shared by every command that reads the desired state.
pub struct ConfigArgs {
    /// Path to rotaconf.toml|yaml (default: search upward from cwd)
    #[arg(long)]
    pub config: Option<String>,
    /// Treat this directory as `/` for logrotate paths and OS detection
    #[arg(long)]
    pub sysroot: Option<String>,
    /// human|json
    #[arg(long)]
    pub output: Option<String>,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    Version,
    /// Write managed configs, remove stale ones, and emit docs
    Sync {
        #[command(flatten)]
        cfg: ConfigArgs,
        #[arg(
            long,
            action = clap::ArgAction::SetTrue,
            help = "Preview planned writes without changing files"
        )]
        dry_run: bool,
        #[arg(
            long,
            action = clap::ArgAction::SetTrue,
            help = "Exit non-zero if changes would occur"
        )]
        check: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip documentation output")]
        no_docs: bool,
        #[arg(long)]
        docs_dir: Option<String>,
    },
    /// Print a rendered config to stdout
    Render {
        #[command(flatten)]
        cfg: ConfigArgs,
        /// Custom config name; the global config when omitted
        #[arg(long)]
        name: Option<String>,
    },
    /// Emit documentation only
    Docs {
        #[command(flatten)]
        cfg: ConfigArgs,
        /// markdown|json|both
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        docs_dir: Option<String>,
    },
    /// Validate the desired state without touching disk
    Validate {
        #[command(flatten)]
        cfg: ConfigArgs,
    },
}
