use crate::app::{args::SubCommand, Config, RuntimeError};

/// ANSI color codes.
pub mod ansi {
    pub const BRIGHT_RED: &str = "\u{001b}[31m";
    pub const RESET: &str = "\u{001b}[0m";

    pub const RED_EXCLAMATION: &str = "\u{001b}[31m!\u{001b}[0m";
    pub const CYAN_CHECK: &str = "\u{001b}[36m✓\u{001b}[0m";

    pub const YELLOW_GT: &str = "\u{001b}[33m>\u{001b}[0m";

    pub const CYAN_MINUS: &str = "\u{001b}[36m-\u{001b}[0m";
}

mod cmd_check;
mod cmd_convert;

pub use cmd_check::CheckOptions;
pub use cmd_convert::ConvertOptions;

/// Entry point of hemirec CLI.
pub fn run(cmd: SubCommand, config: Config) -> Result<(), RuntimeError> {
    match cmd {
        SubCommand::Convert(opts) => cmd_convert::convert(opts, config),
        SubCommand::Check(opts) => cmd_check::check(opts, config),
    }
}
