//! Reconstruction engine turning in-plane measurements into hemispherical
//! scattering tables.

use crate::{
    error::{Error, Result},
    grid::{HemisphereGrid, Table},
    integrate::{self, Integral},
    measurement::{is_valid_wavelength, MeasurementSet},
    profile::RadialProfile,
    strategy::{ReconstructionStrategy, SurfaceKind},
};

/// Output of a conversion: the reconstructed tensor and its reflectances.
#[derive(Debug, Clone)]
struct Converted {
    grid: HemisphereGrid,
    /// Tables indexed by `incidence * n_wavelength + wavelength`.
    tables: Vec<Table>,
    /// Integrals of the tables, same indexing, after rescaling.
    integrals: Vec<Integral>,
    /// Factor applied to every table, if the tables were rescaled.
    scale: Option<f64>,
}

/// Scattering distribution reconstructed from in-plane measurements.
///
/// The incidence angles are given explicitly at construction; their order is
/// the positional index used by the exported file and by the target
/// reflectances handed to [`Distribution::convert_rescaled`].
#[derive(Debug)]
pub struct Distribution {
    strategy: Box<dyn ReconstructionStrategy>,
    measurements: MeasurementSet,
    wavelengths: Vec<f64>,
    incident_angles: Vec<f64>,
    comment: String,
    converted: Option<Converted>,
}

impl Distribution {
    /// Creates a new distribution.
    ///
    /// # Arguments
    ///
    /// * `measurements` - In-plane samples of every (incidence, wavelength)
    ///   pair.
    /// * `wavelengths` - Wavelengths in nm, strictly ascending and strictly
    ///   inside (360, 830).
    /// * `incident_angles` - Unique incidence angles in degrees, in the order
    ///   they are processed and exported.
    /// * `strategy` - How the hemisphere is reconstructed from a profile.
    pub fn new(
        measurements: impl Into<MeasurementSet>,
        wavelengths: Vec<f64>,
        incident_angles: Vec<f64>,
        strategy: Box<dyn ReconstructionStrategy>,
    ) -> Result<Self> {
        if let Some(&wavelength) = wavelengths.iter().find(|&&w| !is_valid_wavelength(w)) {
            return Err(Error::InvalidWavelengthRange(wavelength));
        }
        if wavelengths.is_empty() {
            return Err(Error::InvalidParameters("no wavelength given".into()));
        }
        if let Some(index) = wavelengths.windows(2).position(|w| w[0] >= w[1]) {
            return Err(Error::MeasurementOrdering {
                axis: "wavelength",
                index: index + 1,
            });
        }
        if incident_angles.is_empty() {
            return Err(Error::InvalidParameters("no incidence angle given".into()));
        }
        for (i, &incidence) in incident_angles.iter().enumerate() {
            if !(0.0..=90.0).contains(&incidence) {
                return Err(Error::InvalidParameters(format!(
                    "incidence angle {incidence}° is outside [0°, 90°]"
                )));
            }
            if incident_angles[..i].contains(&incidence) {
                return Err(Error::InvalidParameters(format!(
                    "incidence angle {incidence}° is listed twice"
                )));
            }
        }
        Ok(Self {
            strategy,
            measurements: measurements.into(),
            wavelengths,
            incident_angles,
            comment: String::new(),
            converted: None,
        })
    }

    /// Sets the free-text comment written in the exported file header.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        // The comment occupies exactly one line of the file.
        self.comment = comment.into().replace(['\r', '\n'], " ");
        self
    }

    /// Reconstructs every (incidence, wavelength) pair on the full hemisphere
    /// sampled every `sampling` degrees.
    pub fn convert(&mut self, sampling: f64) -> Result<()> {
        self.convert_with_grid(HemisphereGrid::uniform(sampling)?, None)
    }

    /// Same as [`Distribution::convert`], then rescales every table so that
    /// the first pair matches `targets[0]` (a percentage).
    ///
    /// `targets` are ordered like the incidence angles. Only the
    /// transmission strategy supports rescaling.
    pub fn convert_rescaled(&mut self, sampling: f64, targets: &[f64]) -> Result<()> {
        self.convert_with_grid(HemisphereGrid::uniform(sampling)?, Some(targets))
    }

    /// Reconstructs every pair on the given grid, optionally rescaling to the
    /// target reflectances.
    ///
    /// Converting again discards the previous result. On error the
    /// distribution is left untouched.
    pub fn convert_with_grid(
        &mut self,
        grid: HemisphereGrid,
        targets: Option<&[f64]>,
    ) -> Result<()> {
        if let Some(targets) = targets {
            if !self.strategy.supports_rescale() {
                return Err(Error::InvalidParameters(format!(
                    "rescaling is not supported for {} distributions",
                    self.kind()
                )));
            }
            if targets.len() != self.incident_angles.len() {
                log::warn!(
                    "{} target reflectance(s) given for {} incidence angle(s), only the first \
                     one is used",
                    targets.len(),
                    self.incident_angles.len()
                );
            }
        }

        log::info!(
            "Reconstructing {} incidence(s) x {} wavelength(s) on a {}x{} grid ({})",
            self.incident_angles.len(),
            self.wavelengths.len(),
            grid.n_theta(),
            grid.n_phi(),
            self.kind()
        );

        let mut tables = Vec::with_capacity(self.incident_angles.len() * self.wavelengths.len());
        let mut integrals = Vec::with_capacity(tables.capacity());
        for &incidence in &self.incident_angles {
            for &wavelength in &self.wavelengths {
                let profile = RadialProfile::build(&self.measurements, incidence, wavelength)?;
                let table = grid.tabulate(|theta, phi| {
                    self.strategy.evaluate(&profile, incidence, theta, phi)
                });
                let integral = integrate::integrate(&grid, &table);
                log::debug!(
                    "  - θi = {incidence}°, λ = {wavelength} nm: {:.4}% (error estimate θ {:.2e}, \
                     φ {:.2e})",
                    integral.percent,
                    integral.theta_error,
                    integral.phi_error
                );
                tables.push(table);
                integrals.push(integral);
            }
        }

        if tables.iter().all(Table::is_zero) {
            return Err(Error::EmptyReconstruction);
        }

        let scale = match targets {
            Some(targets) => {
                let factor = integrate::rescale_factor(targets, integrals[0].percent)?;
                log::info!(
                    "Rescaling to {}% at θi = {}°: factor {}",
                    targets[0],
                    self.incident_angles[0],
                    factor
                );
                for (table, integral) in tables.iter_mut().zip(integrals.iter_mut()) {
                    table.scale(factor);
                    *integral = integrate::integrate(&grid, table);
                }
                Some(factor)
            }
            None => None,
        };

        // A zero target wipes out every table.
        if tables.iter().all(Table::is_zero) {
            return Err(Error::EmptyReconstruction);
        }

        for ((i, w), integral) in self.pair_indices().zip(&integrals) {
            if !integral.is_within_tolerance() {
                log::warn!(
                    "Integral at θi = {}°, λ = {} nm may be inaccurate (error estimate θ {:.3}, φ \
                     {:.3}), consider a finer sampling",
                    self.incident_angles[i],
                    self.wavelengths[w],
                    integral.theta_error,
                    integral.phi_error
                );
            }
            if integral.percent > 100.0 || integral.percent < 0.0 {
                log::warn!(
                    "Integral at θi = {}°, λ = {} nm is {:.4}%, clamped to [0, 100]",
                    self.incident_angles[i],
                    self.wavelengths[w],
                    integral.percent
                );
            }
        }

        self.converted = Some(Converted {
            grid,
            tables,
            integrals,
            scale,
        });
        Ok(())
    }

    fn pair_indices(&self) -> impl Iterator<Item = (usize, usize)> {
        let n_wavelength = self.wavelengths.len();
        (0..self.incident_angles.len()).flat_map(move |i| (0..n_wavelength).map(move |w| (i, w)))
    }

    fn converted(&self) -> Result<&Converted> { self.converted.as_ref().ok_or(Error::NotConverted) }

    /// Side of the surface the distribution describes.
    pub fn kind(&self) -> SurfaceKind { self.strategy.kind() }

    /// Reconstruction strategy.
    pub fn strategy(&self) -> &dyn ReconstructionStrategy { self.strategy.as_ref() }

    /// Measurements the distribution is reconstructed from.
    pub fn measurements(&self) -> &MeasurementSet { &self.measurements }

    /// Wavelengths, in nm.
    pub fn wavelengths(&self) -> &[f64] { &self.wavelengths }

    /// Incidence angles in processing order, in degrees.
    pub fn incident_angles(&self) -> &[f64] { &self.incident_angles }

    /// Free-text comment of the exported file.
    pub fn comment(&self) -> &str { &self.comment }

    /// Returns whether the distribution has been converted.
    pub fn is_converted(&self) -> bool { self.converted.is_some() }

    /// Grid the tables were evaluated on.
    pub fn grid(&self) -> Result<&HemisphereGrid> { Ok(&self.converted()?.grid) }

    /// Reconstructed table of the pair at the given positional indices.
    pub fn table(&self, incidence_idx: usize, wavelength_idx: usize) -> Result<&Table> {
        let idx = self.flat_index(incidence_idx, wavelength_idx)?;
        Ok(&self.converted()?.tables[idx])
    }

    /// Integral of the pair at the given positional indices.
    pub fn integral(&self, incidence_idx: usize, wavelength_idx: usize) -> Result<Integral> {
        let idx = self.flat_index(incidence_idx, wavelength_idx)?;
        Ok(self.converted()?.integrals[idx])
    }

    /// Reflectance (or transmittance) percentage of the pair at the given
    /// positional indices.
    pub fn reflectance(&self, incidence_idx: usize, wavelength_idx: usize) -> Result<f64> {
        Ok(self.integral(incidence_idx, wavelength_idx)?.reflectance())
    }

    /// Reflectance table indexed by `[incidence][wavelength]`.
    pub fn reflectance_table(&self) -> Result<Vec<Vec<f64>>> {
        let converted = self.converted()?;
        Ok(converted
            .integrals
            .chunks(self.wavelengths.len())
            .map(|row| row.iter().map(Integral::reflectance).collect())
            .collect())
    }

    /// Factor applied to every table by the rescaling, if any.
    pub fn scale_factor(&self) -> Result<Option<f64>> { Ok(self.converted()?.scale) }

    fn flat_index(&self, incidence_idx: usize, wavelength_idx: usize) -> Result<usize> {
        if incidence_idx >= self.incident_angles.len() || wavelength_idx >= self.wavelengths.len()
        {
            return Err(Error::InvalidParameters(format!(
                "pair index ({incidence_idx}, {wavelength_idx}) out of bounds ({}, {})",
                self.incident_angles.len(),
                self.wavelengths.len()
            )));
        }
        Ok(incidence_idx * self.wavelengths.len() + wavelength_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        measurement::MeasurementPoint,
        strategy::{Clamped, PlaneSymmetric},
    };
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    fn profile_points(incidence: f64, wavelength: f64, samples: &[(f64, f64)]) -> Vec<MeasurementPoint> {
        samples
            .iter()
            .map(|&(theta, value)| MeasurementPoint::new(incidence, wavelength, theta, value))
            .collect()
    }

    fn flat_measurements(incidences: &[f64], wavelengths: &[f64], value: f64) -> Vec<MeasurementPoint> {
        let mut points = Vec::new();
        for &incidence in incidences {
            for &wavelength in wavelengths {
                points.extend(profile_points(
                    incidence,
                    wavelength,
                    &[(0.0, value), (30.0, value), (60.0, value), (90.0, value)],
                ));
            }
        }
        points
    }

    fn lobe(incidence: f64, wavelength: f64, peak: f64) -> Vec<MeasurementPoint> {
        profile_points(
            incidence,
            wavelength,
            &[
                (incidence, peak),
                (incidence + 10.0, 0.5 * peak),
                (incidence + 30.0, 0.2 * peak),
                (90.0, 0.0),
            ],
        )
    }

    proptest! {
        #[test]
        fn construction_fails_iff_wavelength_out_of_range(wavelength in 300.0f64..900.0) {
            let result = Distribution::new(
                flat_measurements(&[0.0], &[wavelength], 0.5),
                vec![wavelength],
                vec![0.0],
                Box::new(PlaneSymmetric),
            );
            if wavelength <= 360.0 || wavelength >= 830.0 {
                prop_assert!(matches!(result, Err(Error::InvalidWavelengthRange(w)) if w == wavelength));
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }

    #[test]
    fn wavelength_bounds_are_exclusive() {
        for wavelength in [360.0, 830.0] {
            assert!(matches!(
                Distribution::new(MeasurementSet::default(), vec![wavelength], vec![0.0], Box::new(PlaneSymmetric)),
                Err(Error::InvalidWavelengthRange(_))
            ));
        }
    }

    #[test]
    fn invalid_axes() {
        assert!(matches!(
            Distribution::new(MeasurementSet::default(), vec![650.0, 450.0], vec![0.0], Box::new(PlaneSymmetric)),
            Err(Error::MeasurementOrdering { axis: "wavelength", index: 1 })
        ));
        assert!(matches!(
            Distribution::new(MeasurementSet::default(), vec![450.0], vec![0.0, 30.0, 0.0], Box::new(PlaneSymmetric)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            Distribution::new(MeasurementSet::default(), vec![450.0], vec![], Box::new(PlaneSymmetric)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            Distribution::new(MeasurementSet::default(), vec![450.0], vec![95.0], Box::new(PlaneSymmetric)),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn normal_incidence_pole_row() {
        let mut dist = Distribution::new(
            profile_points(0.0, 450.0, &[(0.0, 1.0), (30.0, 0.8), (60.0, 0.4), (90.0, 0.0)]),
            vec![450.0],
            vec![0.0],
            Box::new(PlaneSymmetric),
        )
        .unwrap();
        dist.convert(10.0).unwrap();
        let table = dist.table(0, 0).unwrap();
        assert_eq!(table.n_theta(), 10);
        assert_eq!(table.n_phi(), 37);
        for &v in table.row(0) {
            assert_abs_diff_eq!(v, 1.0, epsilon = 1e-9);
        }
        let reflectance = dist.reflectance(0, 0).unwrap();
        assert!((0.0..=100.0).contains(&reflectance));
    }

    #[test]
    fn flat_profiles_reconstruct_flat_grids() {
        let incidences = [0.0, 30.0];
        let wavelengths = [450.0, 650.0];
        let mut dist = Distribution::new(
            flat_measurements(&incidences, &wavelengths, 0.5),
            wavelengths.to_vec(),
            incidences.to_vec(),
            Box::new(PlaneSymmetric),
        )
        .unwrap();
        dist.convert(5.0).unwrap();
        for i in 0..2 {
            for w in 0..2 {
                let table = dist.table(i, w).unwrap();
                assert!(table.as_slice().iter().all(|&v| (v - 0.5).abs() < 1e-12));
                // (1/π) ∫∫ 0.5 sin θ dθ dφ = 1, clamped to 100 %.
                assert_relative_eq!(dist.integral(i, w).unwrap().percent, 100.0, max_relative = 1e-9);
                assert!(dist.reflectance(i, w).unwrap() <= 100.0);
            }
        }
    }

    #[test]
    fn pole_and_cyclic_azimuth_hold_for_every_pair() {
        let mut points = lobe(0.0, 450.0, 2.0);
        points.extend(lobe(0.0, 650.0, 1.5));
        points.extend(lobe(40.0, 450.0, 3.0));
        points.extend(lobe(40.0, 650.0, 2.5));
        for strategy in [
            Box::new(PlaneSymmetric) as Box<dyn ReconstructionStrategy>,
            Box::new(Clamped::new(0.6).unwrap()),
        ] {
            let mut dist =
                Distribution::new(points.clone(), vec![450.0, 650.0], vec![0.0, 40.0], strategy)
                    .unwrap();
            dist.convert(3.0).unwrap();
            let n_phi = dist.grid().unwrap().n_phi();
            for i in 0..2 {
                for w in 0..2 {
                    let table = dist.table(i, w).unwrap();
                    let pole = table.get(0, 0);
                    assert!(table.row(0).iter().all(|&v| (v - pole).abs() < 1e-9));
                    for row in table.rows() {
                        assert_abs_diff_eq!(row[0], row[n_phi - 1], epsilon = 1e-9);
                    }
                    let reflectance = dist.reflectance(i, w).unwrap();
                    assert!((0.0..=100.0).contains(&reflectance));
                }
            }
        }
    }

    #[test]
    fn rescale_to_first_target() {
        let mut points = lobe(0.0, 450.0, 0.3);
        points.extend(lobe(0.0, 650.0, 0.2));
        points.extend(lobe(20.0, 450.0, 0.25));
        points.extend(lobe(20.0, 650.0, 0.1));
        let wavelengths = vec![450.0, 650.0];
        let incidences = vec![0.0, 20.0];

        let mut raw = Distribution::new(
            points.clone(),
            wavelengths.clone(),
            incidences.clone(),
            Box::new(Clamped::new(0.8).unwrap()),
        )
        .unwrap();
        raw.convert(2.0).unwrap();

        let mut scaled = Distribution::new(
            points,
            wavelengths,
            incidences,
            Box::new(Clamped::new(0.8).unwrap()),
        )
        .unwrap();
        scaled.convert_rescaled(2.0, &[40.0, 35.0]).unwrap();

        assert_abs_diff_eq!(scaled.reflectance(0, 0).unwrap(), 40.0, epsilon = 1e-6);
        let factor = scaled.scale_factor().unwrap().unwrap();
        assert_relative_eq!(factor, 40.0 / raw.integral(0, 0).unwrap().percent, max_relative = 1e-12);
        for (i, w) in [(0, 1), (1, 0), (1, 1)] {
            assert_relative_eq!(
                scaled.integral(i, w).unwrap().percent,
                raw.integral(i, w).unwrap().percent * factor,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn rescale_requires_transmission() {
        let mut dist = Distribution::new(
            flat_measurements(&[0.0], &[450.0], 0.1),
            vec![450.0],
            vec![0.0],
            Box::new(PlaneSymmetric),
        )
        .unwrap();
        assert!(matches!(
            dist.convert_rescaled(10.0, &[40.0]),
            Err(Error::InvalidParameters(_))
        ));
        assert!(!dist.is_converted());
    }

    #[test]
    fn zero_target_empties_the_reconstruction() {
        let mut points = lobe(0.0, 450.0, 0.3);
        points.extend(lobe(20.0, 450.0, 0.2));
        let mut dist = Distribution::new(
            points,
            vec![450.0],
            vec![0.0, 20.0],
            Box::new(Clamped::default()),
        )
        .unwrap();
        assert!(matches!(
            dist.convert_rescaled(10.0, &[0.0, 0.0]),
            Err(Error::EmptyReconstruction)
        ));
        assert!(!dist.is_converted());
    }

    #[test]
    fn all_zero_reconstruction_is_rejected() {
        let mut dist = Distribution::new(
            flat_measurements(&[0.0, 30.0], &[450.0], 0.0),
            vec![450.0],
            vec![0.0, 30.0],
            Box::new(Clamped::default()),
        )
        .unwrap();
        assert!(matches!(dist.convert(10.0), Err(Error::EmptyReconstruction)));
        assert!(matches!(dist.grid(), Err(Error::NotConverted)));
    }

    #[test]
    fn missing_pair_is_reported() {
        let mut dist = Distribution::new(
            flat_measurements(&[0.0], &[450.0], 0.5),
            vec![450.0, 550.0],
            vec![0.0],
            Box::new(PlaneSymmetric),
        )
        .unwrap();
        assert!(matches!(
            dist.convert(10.0),
            Err(Error::InsufficientMeasurementData { count: 0, .. })
        ));
    }

    #[test]
    fn converting_twice_gives_same_result() {
        let mut dist = Distribution::new(
            lobe(10.0, 500.0, 1.0),
            vec![500.0],
            vec![10.0],
            Box::new(PlaneSymmetric),
        )
        .unwrap();
        dist.convert(5.0).unwrap();
        let first = dist.table(0, 0).unwrap().clone();
        let reflectance = dist.reflectance_table().unwrap();
        dist.convert(5.0).unwrap();
        assert_eq!(dist.table(0, 0).unwrap(), &first);
        assert_eq!(dist.reflectance_table().unwrap(), reflectance);
    }

    #[test]
    fn out_of_bounds_pair() {
        let mut dist = Distribution::new(
            lobe(10.0, 500.0, 1.0),
            vec![500.0],
            vec![10.0],
            Box::new(PlaneSymmetric),
        )
        .unwrap();
        dist.convert(30.0).unwrap();
        assert!(dist.table(1, 0).is_err());
        assert!(dist.reflectance(0, 1).is_err());
    }
}
