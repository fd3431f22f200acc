//! # hemirec-base
//! Core library for hemirec.
//!
//! Reconstructs full hemispherical scattering distributions from in-plane
//! measured profiles and writes them as OPTIS BSDF text files.
//!
//! ```no_run
//! use hemirec_base::{io, Distribution, PlaneSymmetric};
//!
//! let measurements = io::load_measurements("measurements.csv")?;
//! let incidences = measurements.incident_angles();
//! let wavelengths = measurements.wavelengths();
//! let mut dist = Distribution::new(measurements, wavelengths, incidences, Box::new(PlaneSymmetric))?
//!     .with_comment("sample surface");
//! dist.convert(1.0)?;
//! let path = dist.export("out", "sample")?;
//! io::append_end_of_file(path)?;
//! # Ok::<(), hemirec_base::error::Error>(())
//! ```

pub mod distribution;
pub mod error;
pub mod grid;
pub mod integrate;
pub mod io;
pub mod measurement;
pub mod profile;
pub mod range;
pub mod strategy;

pub use distribution::Distribution;
pub use grid::{HemisphereGrid, Table};
pub use measurement::{MeasurementPoint, MeasurementSet};
pub use profile::RadialProfile;
pub use range::StepRangeIncl;
pub use strategy::{strategy_for, Clamped, PlaneSymmetric, ReconstructionStrategy, SurfaceKind};

/// Version of anything in hemirec.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Patch version.
    pub patch: u8,
}

impl Version {
    /// Creates a new version.
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Version of this crate.
    pub fn current() -> Self {
        let parse = |s: &str| s.parse::<u8>().unwrap_or(0);
        Self::new(
            parse(env!("CARGO_PKG_VERSION_MAJOR")),
            parse(env!("CARGO_PKG_VERSION_MINOR")),
            parse(env!("CARGO_PKG_VERSION_PATCH")),
        )
    }

    /// Returns the version as a string.
    pub fn as_string(&self) -> String { format!("v{}.{}.{}", self.major, self.minor, self.patch) }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}
