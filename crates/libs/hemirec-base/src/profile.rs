//! Radial profile of the scattering value versus the exit polar angle.

use crate::{
    error::{Error, Result},
    measurement::MeasurementSet,
};

/// Piecewise linear function of the exit polar angle built from the in-plane
/// samples of one (incidence, wavelength) pair.
///
/// Outside the measured domain the first and last segments are extended
/// linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialProfile {
    /// Exit polar angles in degrees, strictly increasing.
    thetas: Vec<f64>,
    /// Values at the corresponding exit polar angles.
    values: Vec<f64>,
}

impl RadialProfile {
    /// Builds the profile of the given pair.
    ///
    /// Fails with [`Error::InsufficientMeasurementData`] if fewer than two
    /// samples match, and with [`Error::MeasurementOrdering`] if two samples
    /// share the same exit angle.
    pub fn build(measurements: &MeasurementSet, incidence: f64, wavelength: f64) -> Result<Self> {
        let mut samples: Vec<(f64, f64)> = measurements
            .pair(incidence, wavelength)
            .map(|p| (p.theta, p.value))
            .collect();
        if samples.len() < 2 {
            return Err(Error::InsufficientMeasurementData {
                incidence,
                wavelength,
                count: samples.len(),
            });
        }
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self::from_samples(samples.into_iter().unzip())
    }

    /// Creates a profile from exit angles sorted in strictly increasing order
    /// and their values.
    pub fn from_samples((thetas, values): (Vec<f64>, Vec<f64>)) -> Result<Self> {
        if thetas.len() != values.len() {
            return Err(Error::InvalidParameters(format!(
                "{} exit angles for {} values",
                thetas.len(),
                values.len()
            )));
        }
        if thetas.len() < 2 {
            return Err(Error::InvalidParameters(
                "a radial profile needs at least two samples".into(),
            ));
        }
        if let Some(index) = thetas.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(Error::MeasurementOrdering {
                axis: "theta",
                index: index + 1,
            });
        }
        Ok(Self { thetas, values })
    }

    /// Largest measured exit angle.
    pub fn max_theta(&self) -> f64 { self.thetas[self.thetas.len() - 1] }

    /// Evaluates the profile at the given exit angle (degrees).
    pub fn eval(&self, theta: f64) -> f64 {
        let n = self.thetas.len();
        // Index of the segment [i, i + 1] used for interpolation or
        // extrapolation.
        let i = match self.thetas.partition_point(|&t| t <= theta) {
            0 => 0,
            k if k >= n => n - 2,
            k => k - 1,
        };
        let (t0, t1) = (self.thetas[i], self.thetas[i + 1]);
        let (v0, v1) = (self.values[i], self.values[i + 1]);
        v0 + (v1 - v0) * (theta - t0) / (t1 - t0)
    }
}
