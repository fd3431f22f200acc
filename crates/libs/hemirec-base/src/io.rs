//! Reading measurement records and writing OPTIS BSDF text files.

use crate::{
    distribution::Distribution,
    error::{Error, Result},
    grid::{HemisphereGrid, Table},
    strategy::SurfaceKind,
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Trailer line terminating a complete BSDF file. Appended by the caller once
/// it is done with the file.
pub const END_OF_FILE: &str = "End of file";

/// Significant digits of the values written in the tables.
const VALUE_DIGITS: usize = 8;

/// Formats a number with the given count of significant digits, switching to
/// scientific notation for very small or very large magnitudes. Trailing zeros
/// are dropped.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = digits.max(1);
    let exponent = value.abs().log10().floor() as i32;
    if exponent < -5 || exponent >= digits as i32 {
        let formatted = format!("{:.*e}", digits - 1, value);
        match formatted.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", trim_fraction(mantissa), exp),
            None => formatted,
        }
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn join<I, F>(values: I, f: F) -> String
where
    I: IntoIterator<Item = f64>,
    F: Fn(f64) -> String,
{
    values.into_iter().map(f).collect::<Vec<_>>().join("\t")
}

/// Writes the converted distribution in the OPTIS BSDF text layout, without
/// the final [`END_OF_FILE`] line.
pub fn write_bsdf<W: Write>(writer: &mut W, dist: &Distribution) -> Result<()> {
    let grid = dist.grid()?;
    let reflectances = dist.reflectance_table()?;
    let mut tables = Vec::with_capacity(reflectances.len() * dist.wavelengths().len());
    for i in 0..dist.incident_angles().len() {
        for j in 0..dist.wavelengths().len() {
            tables.push(dist.table(i, j)?);
        }
    }
    write_body(writer, dist, grid, &tables, &reflectances)
        .map_err(|err| Error::io("<writer>", err))
}

fn write_body<W: Write>(
    w: &mut W,
    dist: &Distribution,
    grid: &HemisphereGrid,
    tables: &[&Table],
    reflectances: &[Vec<f64>],
) -> std::io::Result<()> {
    let kind = dist.kind();
    let (has_reflection, has_transmission) = kind.flags();

    writeln!(w, "{}", kind.signature())?;
    // Text mode.
    writeln!(w, "0")?;
    writeln!(w, "{}", dist.comment())?;
    // Measurement description length, followed by the (empty) description.
    writeln!(w, "0")?;
    writeln!(w)?;
    writeln!(w, "{has_reflection}\t{has_transmission}")?;
    // Values are proportional to the BSDF.
    writeln!(w, "1")?;
    writeln!(
        w,
        "{}\t{}",
        dist.incident_angles().len(),
        dist.wavelengths().len()
    )?;
    writeln!(w, "{}", join(dist.incident_angles().iter().copied(), |v| format!("{v:.3}")))?;
    writeln!(w, "{}", join(dist.wavelengths().iter().copied(), |v| format!("{v:.1}")))?;

    let phi_header = join(grid.phis().iter().copied(), |v| format!("{v:.3}"));
    let thetas = grid.thetas();
    let n_theta = grid.n_theta();
    let pairs = reflectances.iter().flatten().zip(tables);
    for (&reflectance, table) in pairs {
        writeln!(w, "{}", format_significant(reflectance, VALUE_DIGITS))?;
        writeln!(w, "{}\t{}", n_theta, grid.n_phi())?;
        writeln!(w, "\t{phi_header}")?;
        for k in 0..n_theta {
            // Transmission tables cover [90°, 180°]: the exit angle θ is
            // written as 180° - θ, rows walked from grazing to normal exit.
            let (label, row) = match kind {
                SurfaceKind::Reflection => (thetas[k], table.row(k)),
                SurfaceKind::Transmission => {
                    let idx = n_theta - 1 - k;
                    (180.0 - thetas[idx], table.row(idx))
                },
            };
            writeln!(
                w,
                "{:.3}\t{}",
                label,
                join(row.iter().copied(), |v| format_significant(v, VALUE_DIGITS))
            )?;
        }
    }
    Ok(())
}

impl Distribution {
    /// Writes the converted distribution to `<dir>/<name>.<ext>`, where the
    /// extension depends on the surface kind, and returns the file path.
    ///
    /// The directory is created if it does not exist. An existing file is
    /// overwritten. Nothing is cleaned up if writing fails midway.
    pub fn export<P: AsRef<Path>>(&self, dir: P, name: &str) -> Result<PathBuf> {
        if !self.is_converted() {
            return Err(Error::NotConverted);
        }
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;
        let filepath = dir.join(format!("{}.{}", name, self.kind().extension()));
        let file = File::create(&filepath).map_err(|err| Error::io(&filepath, err))?;
        let mut writer = BufWriter::new(file);
        write_bsdf(&mut writer, self).map_err(|err| match err {
            Error::Io { source, .. } => Error::io(&filepath, source),
            err => err,
        })?;
        writer.flush().map_err(|err| Error::io(&filepath, err))?;
        log::info!("BSDF written to {}", filepath.display());
        Ok(filepath)
    }
}

/// Appends the [`END_OF_FILE`] trailer to a file written by
/// [`Distribution::export`].
pub fn append_end_of_file<P: AsRef<Path>>(filepath: P) -> Result<()> {
    let filepath = filepath.as_ref();
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(filepath)
        .map_err(|err| Error::io(filepath, err))?;
    writeln!(file, "{END_OF_FILE}").map_err(|err| Error::io(filepath, err))
}

#[cfg(feature = "io")]
pub use csv_io::*;

#[cfg(feature = "io")]
mod csv_io {
    use crate::{
        error::{Error, Result},
        measurement::{MeasurementPoint, MeasurementSet},
    };
    use std::{io::Read, path::Path};

    /// Parses measurement records from CSV data with the header
    /// `incidence,wavelength,theta,value`.
    pub fn parse_measurements<R: Read>(reader: R) -> std::result::Result<MeasurementSet, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);
        let points = reader
            .deserialize::<MeasurementPoint>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let negatives = points.iter().filter(|p| p.value < 0.0).count();
        if negatives > 0 {
            log::warn!("{negatives} measurement value(s) are negative");
        }
        Ok(MeasurementSet::new(points))
    }

    /// Loads measurement records from a CSV file.
    pub fn load_measurements<P: AsRef<Path>>(filepath: P) -> Result<MeasurementSet> {
        let filepath = filepath.as_ref();
        let file = std::fs::File::open(filepath).map_err(|err| Error::io(filepath, err))?;
        let set = parse_measurements(std::io::BufReader::new(file)).map_err(|source| {
            Error::Csv {
                path: filepath.to_path_buf(),
                source,
            }
        })?;
        log::info!(
            "Loaded {} measurement point(s) from {}",
            set.len(),
            filepath.display()
        );
        Ok(set)
    }
}
