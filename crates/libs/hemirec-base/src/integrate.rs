//! Hemispherical integration of reconstructed tables and rescaling to a
//! target reflectance.
//!
//! The integrand is `(1/π) · value(θ, φ) · sin θ` over the grid, with angles
//! converted to radians. The table is interpolated bilinearly and every cell
//! is integrated in closed form, which makes the result linear in the table
//! values: scaling a table scales its integral by the same factor.
//!
//! An error estimate is obtained per axis by comparing against the integral
//! over every other sample along that axis.

use crate::{
    error::{Error, Result},
    grid::{HemisphereGrid, Table},
};
use std::f64::consts::PI;

/// Absolute error tolerance, in percentage points, accepted on each axis.
pub const INTEGRATION_TOLERANCE: f64 = 0.1;

/// Result of the hemispherical integration of one table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integral {
    /// Integral expressed as a percentage, before any clamping.
    pub percent: f64,
    /// Estimated absolute error along the polar axis, in percentage points.
    pub theta_error: f64,
    /// Estimated absolute error along the azimuthal axis, in percentage
    /// points.
    pub phi_error: f64,
}

impl Integral {
    /// Returns whether both per-axis error estimates are within
    /// [`INTEGRATION_TOLERANCE`].
    pub fn is_within_tolerance(&self) -> bool {
        self.theta_error <= INTEGRATION_TOLERANCE && self.phi_error <= INTEGRATION_TOLERANCE
    }

    /// Reflectance (or transmittance) percentage, clamped to [0, 100].
    pub fn reflectance(&self) -> f64 { self.percent.clamp(0.0, 100.0) }
}

/// Integrates the table over the grid and returns the result as a
/// percentage.
pub fn integrate(grid: &HemisphereGrid, table: &Table) -> Integral {
    let all_thetas: Vec<usize> = (0..grid.n_theta()).collect();
    let all_phis: Vec<usize> = (0..grid.n_phi()).collect();
    let percent = integrate_subset(grid, table, &all_thetas, &all_phis);
    let theta_error = error_estimate(percent, || {
        let coarse = every_other(grid.n_theta());
        integrate_subset(grid, table, &coarse, &all_phis)
    }, grid.n_theta());
    let phi_error = error_estimate(percent, || {
        let coarse = every_other(grid.n_phi());
        integrate_subset(grid, table, &all_thetas, &coarse)
    }, grid.n_phi());
    Integral {
        percent,
        theta_error,
        phi_error,
    }
}

/// Derives the single factor applied to every reconstructed table so that
/// the first (incidence, wavelength) pair integrates to the first target
/// reflectance.
///
/// `targets` are percentages ordered like the incidence angles; only the
/// first one is used. `first_percent` is the unclamped integral of the first
/// pair.
pub fn rescale_factor(targets: &[f64], first_percent: f64) -> Result<f64> {
    let target = *targets.first().ok_or_else(|| {
        Error::InvalidParameters("rescaling requires at least one target reflectance".into())
    })?;
    if !(target.is_finite() && (0.0..=100.0).contains(&target)) {
        return Err(Error::InvalidParameters(format!(
            "target reflectance must lie in [0, 100], got {target}"
        )));
    }
    if !(first_percent.is_finite() && first_percent > 0.0) {
        return Err(Error::DegenerateRescale(first_percent));
    }
    Ok(target / first_percent)
}

fn error_estimate<F: FnOnce() -> f64>(fine: f64, coarse: F, n: usize) -> f64 {
    // Two intervals are needed along the axis to halve the resolution.
    if n < 3 {
        return 0.0;
    }
    // Both estimates are second order, the error of the fine one is about a
    // third of their difference.
    (coarse() - fine).abs() / 3.0
}

fn every_other(n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).step_by(2).collect();
    if (n - 1) % 2 != 0 {
        indices.push(n - 1);
    }
    indices
}

/// Integrates the bilinear interpolant through the selected grid samples.
fn integrate_subset(
    grid: &HemisphereGrid,
    table: &Table,
    theta_idx: &[usize],
    phi_idx: &[usize],
) -> f64 {
    let thetas = grid.thetas();
    let phis = grid.phis();
    // Trapezoidal rule along φ is exact for the piecewise linear interpolant.
    let row_integral = |i: usize| -> f64 {
        phi_idx
            .windows(2)
            .map(|w| {
                let dphi = (phis[w[1]] - phis[w[0]]).to_radians();
                0.5 * dphi * (table.get(i, w[0]) + table.get(i, w[1]))
            })
            .sum()
    };
    let rows: Vec<f64> = theta_idx.iter().map(|&i| row_integral(i)).collect();
    let sum: f64 = theta_idx
        .windows(2)
        .zip(rows.windows(2))
        .map(|(t, r)| {
            let (lower, upper) = sine_weights(thetas[t[0]].to_radians(), thetas[t[1]].to_radians());
            lower * r[0] + upper * r[1]
        })
        .sum();
    100.0 * sum / PI
}

/// Integrals of the two linear hat functions of the interval [t0, t1]
/// multiplied by sin θ.
fn sine_weights(t0: f64, t1: f64) -> (f64, f64) {
    let h = t1 - t0;
    let (s0, c0) = t0.sin_cos();
    let (s1, c1) = t1.sin_cos();
    ((h * c0 + s0 - s1) / h, (s1 - s0 - h * c1) / h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::StepRangeIncl;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn sine_weights_sum_to_cosine_difference() {
        let (a, b) = sine_weights(0.1, 0.4);
        assert_abs_diff_eq!(a + b, 0.1f64.cos() - 0.4f64.cos(), epsilon = 1e-14);
    }

    #[test]
    fn constant_table() {
        // (1/π) ∫∫ c sin θ dθ dφ over the hemisphere is 2c.
        for sampling in [1.0, 5.0, 10.0, 30.0] {
            let grid = HemisphereGrid::uniform(sampling).unwrap();
            let table = grid.tabulate(|_, _| 0.25);
            let integral = integrate(&grid, &table);
            assert_relative_eq!(integral.percent, 50.0, max_relative = 1e-12);
            assert!(integral.is_within_tolerance());
        }
    }

    #[test]
    fn cosine_lobe() {
        // (1/π) ∫∫ cos θ sin θ dθ dφ = 1.
        let grid = HemisphereGrid::uniform(1.0).unwrap();
        let table = grid.tabulate(|theta, _| theta.to_radians().cos());
        let integral = integrate(&grid, &table);
        assert_abs_diff_eq!(integral.percent, 100.0, epsilon = 0.01);
        assert!(integral.is_within_tolerance());
    }

    #[test]
    fn coarse_grid_reports_large_error() {
        let grid = HemisphereGrid::from_ranges(
            StepRangeIncl::new(0.0, 90.0, 30.0),
            StepRangeIncl::new(0.0, 360.0, 90.0),
        )
        .unwrap();
        let table = grid.tabulate(|theta, _| (theta / 10.0).powi(4));
        let integral = integrate(&grid, &table);
        assert!(!integral.is_within_tolerance());
    }

    #[test]
    fn integral_is_linear() {
        let grid = HemisphereGrid::uniform(5.0).unwrap();
        let mut table = grid.tabulate(|theta, phi| 1.0 + theta / 90.0 + (phi / 360.0).powi(2));
        let raw = integrate(&grid, &table).percent;
        table.scale(0.3);
        assert_relative_eq!(integrate(&grid, &table).percent, 0.3 * raw, max_relative = 1e-12);
    }

    #[test]
    fn reflectance_is_clamped() {
        let integral = Integral {
            percent: 180.0,
            theta_error: 0.0,
            phi_error: 0.0,
        };
        assert_eq!(integral.reflectance(), 100.0);
        let integral = Integral {
            percent: -3.0,
            ..integral
        };
        assert_eq!(integral.reflectance(), 0.0);
    }

    #[test]
    fn rescale() {
        assert_relative_eq!(rescale_factor(&[40.0, 12.0], 80.0).unwrap(), 0.5);
        assert!(matches!(
            rescale_factor(&[], 80.0),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            rescale_factor(&[120.0], 80.0),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            rescale_factor(&[40.0], 0.0),
            Err(Error::DegenerateRescale(_))
        ));
    }

    #[test]
    fn every_other_keeps_endpoints() {
        assert_eq!(every_other(5), vec![0, 2, 4]);
        assert_eq!(every_other(6), vec![0, 2, 4, 5]);
        assert_eq!(every_other(2), vec![0, 1]);
    }
}
