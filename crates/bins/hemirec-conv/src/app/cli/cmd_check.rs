use crate::app::{cli::ansi, Config, RuntimeError};
use base::{io, measurement::is_valid_wavelength, MeasurementSet, RadialProfile};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[clap(about = "Validates a measurement file and prints a summary per (incidence, wavelength) \
                pair.")]
pub struct CheckOptions {
    /// Measurement file with the header `incidence,wavelength,theta,value`.
    #[arg(short, long, required = true)]
    pub input: PathBuf,
}

pub fn check(opts: CheckOptions, config: Config) -> Result<(), RuntimeError> {
    let input = config.resolve_path(&opts.input);
    let measurements = io::load_measurements(&input)?;
    println!(
        "{} {}: {} point(s)",
        ansi::YELLOW_GT,
        input.display(),
        measurements.len()
    );
    let problems = report(&measurements);
    if problems.is_empty() {
        println!("{} Ready for conversion", ansi::CYAN_CHECK);
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("  {} {}", ansi::RED_EXCLAMATION, problem);
        }
        Err(RuntimeError::InvalidParameters(format!(
            "{} problem(s) found in {}",
            problems.len(),
            input.display()
        )))
    }
}

/// Prints the summary of every pair and returns the problems preventing a
/// conversion.
fn report(measurements: &MeasurementSet) -> Vec<String> {
    let mut problems = Vec::new();
    if measurements.is_empty() {
        problems.push("no measurement point".to_owned());
    }
    for wavelength in measurements.wavelengths() {
        if !is_valid_wavelength(wavelength) {
            problems.push(base::error::Error::InvalidWavelengthRange(wavelength).to_string());
        }
    }
    for summary in measurements.summarise() {
        println!(
            "  {} θi = {:>5.1}°, λ = {:>5.1} nm: {:>4} point(s), θo ∈ [{}°, {}°], max {}",
            ansi::CYAN_MINUS,
            summary.incidence,
            summary.wavelength,
            summary.count,
            summary.theta_min,
            summary.theta_max,
            summary.value_max
        );
        if let Err(err) = RadialProfile::build(measurements, summary.incidence, summary.wavelength)
        {
            problems.push(err.to_string());
        }
    }
    problems
}
