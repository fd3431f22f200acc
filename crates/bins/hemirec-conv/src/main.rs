//! Command-line front-end of hemirec.
#![warn(clippy::all, rust_2021_compatibility)]

mod app;

fn main() {
    std::process::exit(match app::run() {
        Ok(_) => 0,
        Err(ref e) => {
            eprintln!("{}error:{} {e}", app::cli::ansi::BRIGHT_RED, app::cli::ansi::RESET);
            let mut source = std::error::Error::source(e);
            while let Some(err) = source {
                eprintln!("  caused by: {err}");
                source = std::error::Error::source(err);
            }
            1
        },
    })
}
