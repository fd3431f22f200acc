use args::CliArgs;
use std::io::Write;

pub(crate) mod args;
pub mod cli;
mod config;
mod error;

pub use config::*;
pub use error::RuntimeError;

/// Main entry point for the hemirec converter.
pub fn run() -> Result<(), RuntimeError> {
    use clap::Parser;

    let args = CliArgs::parse();
    let launch_time = std::time::SystemTime::now();

    setup_logging(&args, launch_time);

    log::info!(
        "hemirec {} launched at {} on {}.",
        base::Version::current(),
        chrono::DateTime::<chrono::Utc>::from(launch_time),
        std::env::consts::OS
    );

    let config = Config::load_config(args.config.as_deref())?;

    cli::run(args.command, config)
}

/// Maps the numeric verbosity of the command line to a log filter.
pub fn log_filter_from_level(level: u8) -> log::LevelFilter {
    match level {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Effective log level: `--quiet` wins over `--verbose`, which wins over
/// `--log-level`.
pub fn effective_log_level(args: &CliArgs) -> u8 {
    if args.quiet {
        0
    } else if args.verbose {
        4
    } else {
        args.log_level
    }
}

/// Installs the logger.
///
/// # Arguments
///
/// * `args` - The CLI arguments passed to the program.
/// * `launch_time` - The time when the program is launched, used for the
///   optional elapsed-time prefix.
pub fn setup_logging(args: &CliArgs, launch_time: std::time::SystemTime) {
    let log_level = effective_log_level(args);
    let timestamp = args.log_timestamp;
    env_logger::builder()
        .format(move |buf, record| {
            let top_level_module = record
                .module_path()
                .and_then(|path| path.split("::").next())
                .unwrap_or("?");
            if timestamp {
                let duration = launch_time.elapsed().unwrap_or_default();
                let millis = duration.as_millis() % 1000;
                let seconds = duration.as_secs() % 60;
                let minutes = (duration.as_secs() / 60) % 60;
                let hours = (duration.as_secs() / 60) / 60;
                writeln!(
                    buf,
                    "{}:{}:{}.{:03} {:5} [{}]: {}",
                    hours,
                    minutes,
                    seconds,
                    millis,
                    record.level(),
                    top_level_module,
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{:5} [{}]: {}",
                    record.level(),
                    top_level_module,
                    record.args()
                )
            }
        })
        .filter_level(log_filter_from_level(log_level))
        .init();
}
