//! In-plane scattering measurement records.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Lower bound (exclusive) of the accepted wavelengths, in nanometres.
pub const MIN_WAVELENGTH: f64 = 360.0;

/// Upper bound (exclusive) of the accepted wavelengths, in nanometres.
pub const MAX_WAVELENGTH: f64 = 830.0;

/// Returns whether the wavelength lies strictly inside (360, 830) nm.
pub fn is_valid_wavelength(wavelength: f64) -> bool {
    wavelength > MIN_WAVELENGTH && wavelength < MAX_WAVELENGTH
}

/// One sample of a 1-D polar profile measured in the plane of incidence.
///
/// Angles are in degrees, the wavelength in nanometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    /// Polar angle of the illuminating beam.
    pub incidence: f64,
    /// Wavelength of the illuminating beam.
    pub wavelength: f64,
    /// Exit polar angle.
    pub theta: f64,
    /// Measured scattering value.
    pub value: f64,
}

impl MeasurementPoint {
    /// Creates a new measurement point.
    pub const fn new(incidence: f64, wavelength: f64, theta: f64, value: f64) -> Self {
        Self {
            incidence,
            wavelength,
            theta,
            value,
        }
    }

    /// Returns whether the point belongs to the given (incidence, wavelength)
    /// pair. Matching is exact.
    pub fn matches(&self, incidence: f64, wavelength: f64) -> bool {
        self.incidence == incidence && self.wavelength == wavelength
    }
}

impl Display for MeasurementPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "θi = {}°, λ = {} nm, θo = {}°: {}",
            self.incidence, self.wavelength, self.theta, self.value
        )
    }
}

/// Summary of the samples measured for one (incidence, wavelength) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSummary {
    /// Incidence angle of the pair.
    pub incidence: f64,
    /// Wavelength of the pair.
    pub wavelength: f64,
    /// Number of samples.
    pub count: usize,
    /// Smallest measured exit angle.
    pub theta_min: f64,
    /// Largest measured exit angle.
    pub theta_max: f64,
    /// Largest measured value.
    pub value_max: f64,
}

/// Ordered collection of measurement points, as handed over by the ingestion
/// side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementSet {
    points: Vec<MeasurementPoint>,
}

impl MeasurementSet {
    /// Creates a measurement set from a list of points, keeping their order.
    pub fn new(points: Vec<MeasurementPoint>) -> Self { Self { points } }

    /// Returns all the points.
    pub fn points(&self) -> &[MeasurementPoint] { &self.points }

    /// Returns the number of points.
    pub fn len(&self) -> usize { self.points.len() }

    /// Returns whether the set holds no point.
    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    /// Iterates over the points of the given (incidence, wavelength) pair.
    pub fn pair(&self, incidence: f64, wavelength: f64) -> impl Iterator<Item = &MeasurementPoint> {
        self.points
            .iter()
            .filter(move |p| p.matches(incidence, wavelength))
    }

    /// Returns the unique incidence angles in order of first appearance.
    pub fn incident_angles(&self) -> Vec<f64> {
        let mut angles: Vec<f64> = Vec::new();
        for p in &self.points {
            if !angles.contains(&p.incidence) {
                angles.push(p.incidence);
            }
        }
        angles
    }

    /// Returns the unique wavelengths in ascending order.
    pub fn wavelengths(&self) -> Vec<f64> {
        let mut wavelengths: Vec<f64> = self.points.iter().map(|p| p.wavelength).collect();
        wavelengths.sort_by(f64::total_cmp);
        wavelengths.dedup();
        wavelengths
    }

    /// Summarises every (incidence, wavelength) pair present in the set, in
    /// incidence first-appearance order then ascending wavelength.
    pub fn summarise(&self) -> Vec<PairSummary> {
        let wavelengths = self.wavelengths();
        self.incident_angles()
            .into_iter()
            .flat_map(|incidence| {
                wavelengths
                    .iter()
                    .filter_map(move |&wavelength| self.summarise_pair(incidence, wavelength))
            })
            .collect()
    }

    fn summarise_pair(&self, incidence: f64, wavelength: f64) -> Option<PairSummary> {
        self.pair(incidence, wavelength).fold(None, |acc, p| {
            Some(match acc {
                None => PairSummary {
                    incidence,
                    wavelength,
                    count: 1,
                    theta_min: p.theta,
                    theta_max: p.theta,
                    value_max: p.value,
                },
                Some(s) => PairSummary {
                    count: s.count + 1,
                    theta_min: s.theta_min.min(p.theta),
                    theta_max: s.theta_max.max(p.theta),
                    value_max: s.value_max.max(p.value),
                    ..s
                },
            })
        })
    }
}

impl From<Vec<MeasurementPoint>> for MeasurementSet {
    fn from(points: Vec<MeasurementPoint>) -> Self { Self::new(points) }
}

impl FromIterator<MeasurementPoint> for MeasurementSet {
    fn from_iter<I: IntoIterator<Item = MeasurementPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
