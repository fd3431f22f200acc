use crate::app::cli::{CheckOptions, ConvertOptions};
use std::path::PathBuf;

/// hemirec command line interface arguments.
#[derive(clap::Parser, Debug)]
#[clap(
    author,
    version,
    about = "Reconstructs hemispherical scattering distributions from in-plane measurements."
)]
pub struct CliArgs {
    /// Whether to print only errors.
    #[clap(short, long, help = "Silent output, only errors are printed")]
    pub quiet: bool,

    /// Whether to print verbose information.
    #[clap(short, long, help = "Use verbose output (log level = 4)")]
    pub verbose: bool,

    /// Whether to show the timestamp in the log.
    #[clap(
        long,
        help = "Show timestamp for each log message in seconds since\nprogram starts"
    )]
    pub log_timestamp: bool,

    /// Verbosity level for the log.
    #[clap(
        long,
        help = "Setting logging verbosity level (higher for more\ndetails)\n  0 - error\n  1 - \
                warn + error\n  2 - info + warn + error\n  3 - debug + info + warn + error\n  4 - \
                trace + debug + info + warn + error\n\x08",
        default_value_t = 1
    )]
    pub log_level: u8,

    /// Path to the user config file. If not specified, hemirec looks for
    /// `hemirec.toml` in the current directory then in the system
    /// configuration directory.
    #[clap(short, long, global = true, help = "Path to the user config file")]
    pub config: Option<PathBuf>,

    /// Command to execute.
    #[clap(subcommand)]
    pub command: SubCommand,
}

/// hemirec command.
#[derive(clap::Subcommand, Debug)]
pub enum SubCommand {
    /// Reconstructs the hemisphere and writes an OPTIS BSDF file.
    Convert(ConvertOptions),

    /// Validates a measurement file and prints a summary per pair.
    Check(CheckOptions),
}
