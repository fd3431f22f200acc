use crate::app::{cli::ansi, Config, RuntimeError};
use base::{io, strategy_for, Distribution, SurfaceKind, Version};
use std::path::{Path, PathBuf};

#[derive(clap::Args, Debug)]
#[clap(about = "Reconstructs the full hemisphere from in-plane measurements and writes an \
                OPTIS BSDF file.")]
pub struct ConvertOptions {
    /// Measurement file with the header `incidence,wavelength,theta,value`.
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// Directory where the converted file is written. If not specified, the
    /// configured output directory or the current working directory is used.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Name of the output file, without extension. Defaults to the stem of
    /// the input file.
    #[arg(short, long)]
    pub name: Option<String>,

    #[clap(
        short,
        long,
        default_value_t = SurfaceKind::Reflection,
        help = "Side of the surface to reconstruct."
    )]
    pub kind: SurfaceKind,

    #[clap(
        long,
        default_value_t = 1.0,
        help = "Ratio between the azimuthal and polar widths of the\ntransmitted lobe."
    )]
    pub ratio: f64,

    #[clap(
        long,
        help = "Angular sampling step of the exit hemisphere in degrees.\nOverrides the \
                configuration."
    )]
    pub sampling: Option<f64>,

    #[clap(
        long,
        num_args(1..),
        value_delimiter = ',',
        help = "Incidence angles to export, in degrees. Defaults to\nevery incidence of the \
                input, in order of appearance."
    )]
    pub incidences: Option<Vec<f64>>,

    #[clap(
        long,
        num_args(1..),
        value_delimiter = ',',
        help = "Wavelengths to export, in nm. Defaults to every\nwavelength of the input, \
                ascending."
    )]
    pub wavelengths: Option<Vec<f64>>,

    #[clap(
        long,
        num_args(1..),
        value_delimiter = ',',
        help = "Target reflectances in percent, one per incidence.\nThe first one sets the \
                scale of the whole distribution.\nTransmission only."
    )]
    pub targets: Option<Vec<f64>>,

    /// Comment written in the file header.
    #[arg(long)]
    pub comment: Option<String>,
}

pub fn convert(opts: ConvertOptions, config: Config) -> Result<(), RuntimeError> {
    let input = config.resolve_path(&opts.input);
    let output_dir = config.resolve_output_dir(opts.output.as_deref())?;
    let name = match opts.name {
        Some(name) => name,
        None => output_name(&input)?,
    };

    println!(
        "{} Loading measurements from {}...",
        ansi::YELLOW_GT,
        input.display()
    );
    let measurements = io::load_measurements(&input)?;
    let incidences = opts
        .incidences
        .unwrap_or_else(|| measurements.incident_angles());
    let wavelengths = opts.wavelengths.unwrap_or_else(|| measurements.wavelengths());
    let comment = opts
        .comment
        .or_else(|| config.user().comment.clone())
        .unwrap_or_else(|| default_comment(&input));
    let grid = config.hemisphere_grid(opts.sampling)?;

    let conversion_failed = |err: base::error::Error| RuntimeError::Conversion(input.clone(), err);
    let strategy = strategy_for(opts.kind, opts.ratio).map_err(conversion_failed)?;
    let mut dist = Distribution::new(measurements, wavelengths, incidences, strategy)
        .map_err(conversion_failed)?
        .with_comment(comment);

    println!(
        "{} Reconstructing {} distribution on {}x{} exit directions...",
        ansi::YELLOW_GT,
        opts.kind,
        grid.n_theta(),
        grid.n_phi()
    );
    dist.convert_with_grid(grid, opts.targets.as_deref())
        .map_err(conversion_failed)?;

    if let Some(factor) = dist.scale_factor()? {
        println!("  {} Scale factor: {}", ansi::CYAN_MINUS, factor);
    }
    for (i, incidence) in dist.incident_angles().iter().enumerate() {
        for (j, wavelength) in dist.wavelengths().iter().enumerate() {
            let integral = dist.integral(i, j)?;
            let mark = if integral.is_within_tolerance() {
                ansi::CYAN_MINUS
            } else {
                ansi::RED_EXCLAMATION
            };
            println!(
                "  {} θi = {:>5.1}°, λ = {:>5.1} nm: {:.3} %",
                mark,
                incidence,
                wavelength,
                integral.reflectance()
            );
        }
    }

    let filepath = dist.export(&output_dir, &name)?;
    io::append_end_of_file(&filepath)?;
    println!("{} Written {}", ansi::CYAN_CHECK, filepath.display());
    Ok(())
}

/// Stem of the input file, used when no output name is given.
fn output_name(input: &Path) -> Result<String, RuntimeError> {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            RuntimeError::InvalidParameters(format!(
                "cannot derive an output name from {}, use --name",
                input.display()
            ))
        })
}

fn default_comment(input: &Path) -> String {
    format!(
        "Converted from {} by hemirec {} on {}",
        input
            .file_name()
            .map_or_else(|| input.display().to_string(), |name| name.to_string_lossy().into_owned()),
        Version::current(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{args::CliArgs, args::SubCommand, UserConfig};
    use clap::Parser;

    const MEASUREMENTS: &str = "\
incidence,wavelength,theta,value
0,550,0,1.0
0,550,30,0.6
0,550,60,0.2
0,550,90,0.0
30,550,0,0.5
30,550,30,1.0
30,550,60,0.5
30,550,90,0.1
";

    fn parse(args: &[&str]) -> ConvertOptions {
        let args = CliArgs::parse_from(std::iter::once("hemirec-conv").chain(args.iter().copied()));
        match args.command {
            SubCommand::Convert(opts) => opts,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parse_options() {
        let opts = parse(&[
            "convert",
            "-i",
            "glass.csv",
            "-k",
            "btdf",
            "--incidences",
            "0,30",
            "--targets",
            "40",
            "12",
        ]);
        assert_eq!(opts.input, PathBuf::from("glass.csv"));
        assert_eq!(opts.kind, SurfaceKind::Transmission);
        assert_eq!(opts.incidences, Some(vec![0.0, 30.0]));
        assert_eq!(opts.targets, Some(vec![40.0, 12.0]));
        assert_eq!(opts.ratio, 1.0);
        assert!(opts.sampling.is_none());
    }

    #[test]
    fn output_name_from_input() {
        assert_eq!(output_name(Path::new("/data/glass.csv")).unwrap(), "glass");
        assert!(output_name(Path::new("/")).is_err());
    }

    #[test]
    fn convert_writes_file_with_trailer() {
        let dir = std::env::temp_dir().join(format!("hemirec-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("paint.csv");
        std::fs::write(&input, MEASUREMENTS).unwrap();
        let config = Config {
            cwd: dir.clone(),
            user: UserConfig {
                sampling: 10.0,
                ..UserConfig::default()
            },
        };
        let opts = parse(&["convert", "-i", "paint.csv", "-o", "out", "--comment", "paint"]);
        convert(opts, config).unwrap();

        let text = std::fs::read_to_string(dir.join("out").join("paint.brdf")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "OPTIS - brdf surface file v9.0");
        assert_eq!(lines[2], "paint");
        assert_eq!(lines.last(), Some(&io::END_OF_FILE));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rescaling_reflection_is_rejected() {
        let dir = std::env::temp_dir().join(format!("hemirec-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("paint.csv"), MEASUREMENTS).unwrap();
        let config = Config {
            cwd: dir.clone(),
            user: UserConfig {
                sampling: 30.0,
                ..UserConfig::default()
            },
        };
        let opts = parse(&["convert", "-i", "paint.csv", "--targets", "50"]);
        assert!(matches!(
            convert(opts, config),
            Err(RuntimeError::Conversion(_, base::error::Error::InvalidParameters(_)))
        ));
        assert!(!dir.join("paint.brdf").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
