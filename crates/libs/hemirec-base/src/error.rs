//! Error type for hemirec.

use std::path::PathBuf;

/// Errors raised while reconstructing or exporting a scattering distribution.
///
/// None of them are retried internally; the caller is expected to fix the
/// input data and run the conversion again.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A wavelength lies outside the open interval (360, 830) nm.
    #[error("Wavelength {0} nm is outside the valid range (360, 830) nm")]
    InvalidWavelengthRange(f64),

    /// Fewer than two exit angles were measured for an (incidence, wavelength)
    /// pair.
    #[error(
        "Insufficient measurement data at incidence {incidence}° and wavelength {wavelength} \
         nm: {count} point(s), at least 2 required"
    )]
    InsufficientMeasurementData {
        /// Incidence angle of the pair, in degrees.
        incidence: f64,
        /// Wavelength of the pair, in nanometres.
        wavelength: f64,
        /// Number of matching measurement points.
        count: usize,
    },

    /// Every value of the reconstructed tensor is zero.
    #[error("Reconstructed distribution is zero everywhere, refusing to emit a degenerate file")]
    EmptyReconstruction,

    /// An axis that must be strictly increasing is not.
    #[error("Values along the {axis} axis are not strictly increasing (at index {index})")]
    MeasurementOrdering {
        /// Name of the offending axis.
        axis: &'static str,
        /// Index of the first value breaking the ordering.
        index: usize,
    },

    /// The integral of the first incidence is zero, so no finite scale factor
    /// can be derived from the target reflectance.
    #[error("Cannot derive a scale factor: the integral of the first incidence is {0}")]
    DegenerateRescale(f64),

    /// Parameters handed to the engine are inconsistent.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The distribution was exported before being converted.
    #[error("The distribution has not been converted yet")]
    NotConverted,

    /// Failed to parse a measurement file.
    #[cfg(feature = "io")]
    #[error("Failed to read measurement records from {path}: {source}")]
    Csv {
        /// Path to the measurement file.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Failed to create or write the output file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path of the file or directory being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl Error {
    /// Creates an [`Error::Io`] attached to the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type used throughout hemirec.
pub type Result<T> = std::result::Result<T, Error>;
