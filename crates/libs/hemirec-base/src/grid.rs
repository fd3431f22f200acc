//! Sampling grid over the exit hemisphere and the tables evaluated on it.

use crate::{
    error::{Error, Result},
    range::StepRangeIncl,
};

/// Exit directions at which the reconstruction is evaluated.
///
/// Both axes are in degrees and strictly increasing: θ is the exit polar
/// angle, φ the exit azimuth (φ = 0 is the plane of incidence).
#[derive(Debug, Clone, PartialEq)]
pub struct HemisphereGrid {
    thetas: Vec<f64>,
    phis: Vec<f64>,
}

impl HemisphereGrid {
    /// Default polar range, θ ∈ [0°, 90°].
    pub const THETA_RANGE: (f64, f64) = (0.0, 90.0);

    /// Default azimuthal range, φ ∈ [0°, 360°].
    pub const PHI_RANGE: (f64, f64) = (0.0, 360.0);

    /// Creates the full hemisphere grid sampled every `sampling` degrees on
    /// both axes.
    pub fn uniform(sampling: f64) -> Result<Self> {
        Self::from_ranges(
            StepRangeIncl::new(Self::THETA_RANGE.0, Self::THETA_RANGE.1, sampling),
            StepRangeIncl::new(Self::PHI_RANGE.0, Self::PHI_RANGE.1, sampling),
        )
    }

    /// Creates a grid from explicit polar and azimuthal ranges.
    ///
    /// Only the step sizes are free: the ranges must span exactly
    /// [`Self::THETA_RANGE`] and [`Self::PHI_RANGE`] so that the tables cover
    /// the whole hemisphere.
    pub fn from_ranges(theta: StepRangeIncl<f64>, phi: StepRangeIncl<f64>) -> Result<Self> {
        theta.validate("theta")?;
        phi.validate("phi")?;
        for (axis, range, (start, stop)) in [
            ("theta", &theta, Self::THETA_RANGE),
            ("phi", &phi, Self::PHI_RANGE),
        ] {
            if range.start != start || range.stop != stop {
                return Err(Error::InvalidParameters(format!(
                    "the {axis} axis must span [{start}°, {stop}°], got [{}°, {}°]",
                    range.start, range.stop
                )));
            }
        }
        Ok(Self {
            thetas: theta.values().collect(),
            phis: phi.values().collect(),
        })
    }

    /// Exit polar angles, in degrees.
    pub fn thetas(&self) -> &[f64] { &self.thetas }

    /// Exit azimuthal angles, in degrees.
    pub fn phis(&self) -> &[f64] { &self.phis }

    /// Number of polar samples.
    pub fn n_theta(&self) -> usize { self.thetas.len() }

    /// Number of azimuthal samples.
    pub fn n_phi(&self) -> usize { self.phis.len() }

    /// Evaluates `f(theta, phi)` at every grid point.
    pub fn tabulate<F>(&self, mut f: F) -> Table
    where
        F: FnMut(f64, f64) -> f64,
    {
        let mut values = Vec::with_capacity(self.n_theta() * self.n_phi());
        for &theta in &self.thetas {
            for &phi in &self.phis {
                values.push(f(theta, phi));
            }
        }
        Table {
            n_theta: self.n_theta(),
            n_phi: self.n_phi(),
            values,
        }
    }
}

/// Values of one (incidence, wavelength) pair over a [`HemisphereGrid`],
/// stored row-major: one row per θ, one column per φ.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    n_theta: usize,
    n_phi: usize,
    values: Vec<f64>,
}

impl Table {
    /// Number of rows (polar samples).
    pub fn n_theta(&self) -> usize { self.n_theta }

    /// Number of columns (azimuthal samples).
    pub fn n_phi(&self) -> usize { self.n_phi }

    /// Value at the given polar and azimuthal indices.
    pub fn get(&self, theta_idx: usize, phi_idx: usize) -> f64 {
        self.values[theta_idx * self.n_phi + phi_idx]
    }

    /// Values of the given polar row.
    pub fn row(&self, theta_idx: usize) -> &[f64] {
        &self.values[theta_idx * self.n_phi..(theta_idx + 1) * self.n_phi]
    }

    /// Iterates over the rows.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.values.chunks_exact(self.n_phi.max(1))
    }

    /// All values, row-major.
    pub fn as_slice(&self) -> &[f64] { &self.values }

    /// Returns whether every value is zero.
    pub fn is_zero(&self) -> bool { self.values.iter().all(|&v| v == 0.0) }

    /// Multiplies every value by `factor`.
    pub fn scale(&mut self, factor: f64) { self.values.iter_mut().for_each(|v| *v *= factor); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_grid_dimensions() {
        let grid = HemisphereGrid::uniform(1.0).unwrap();
        assert_eq!(grid.n_theta(), 91);
        assert_eq!(grid.n_phi(), 361);
        let grid = HemisphereGrid::uniform(10.0).unwrap();
        assert_eq!(grid.n_theta(), 10);
        assert_eq!(grid.n_phi(), 37);
        assert_eq!(grid.thetas().last(), Some(&90.0));
        assert_eq!(grid.phis().last(), Some(&360.0));
    }

    #[test]
    fn invalid_sampling() {
        assert!(matches!(
            HemisphereGrid::uniform(0.0),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            HemisphereGrid::uniform(-5.0),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn tabulate_is_row_major() {
        let grid = HemisphereGrid::from_ranges(
            StepRangeIncl::new(0.0, 90.0, 45.0),
            StepRangeIncl::new(0.0, 360.0, 180.0),
        )
        .unwrap();
        let table = grid.tabulate(|theta, phi| theta * 1000.0 + phi);
        assert_eq!(table.n_theta(), 3);
        assert_eq!(table.n_phi(), 3);
        assert_eq!(table.get(1, 2), 45360.0);
        assert_eq!(table.row(2), &[90000.0, 90180.0, 90360.0]);
        assert_eq!(table.rows().len(), 3);
    }

    #[test]
    fn scale_and_zero() {
        let grid = HemisphereGrid::uniform(45.0).unwrap();
        let mut table = grid.tabulate(|_, _| 2.0);
        assert!(!table.is_zero());
        table.scale(0.25);
        assert!(table.as_slice().iter().all(|&v| v == 0.5));
        table.scale(0.0);
        assert!(table.is_zero());
    }

    #[test]
    fn partial_axes_are_rejected() {
        let full_phi = StepRangeIncl::new(0.0, 360.0, 1.0);
        let full_theta = StepRangeIncl::new(0.0, 90.0, 1.0);
        assert!(matches!(
            HemisphereGrid::from_ranges(full_theta, StepRangeIncl::new(0.0, 180.0, 1.0)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            HemisphereGrid::from_ranges(StepRangeIncl::new(0.0, 60.0, 20.0), full_phi),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            HemisphereGrid::from_ranges(StepRangeIncl::new(10.0, 90.0, 5.0), full_phi),
            Err(Error::InvalidParameters(_))
        ));
        let grid = HemisphereGrid::from_ranges(StepRangeIncl::new(0.0, 90.0, 5.0), full_phi).unwrap();
        assert_eq!((grid.n_theta(), grid.n_phi()), (19, 361));
        assert_eq!(grid.thetas()[0], 0.0);
        assert_eq!(grid.phis().last(), Some(&360.0));
    }
}
