//! Reconstruction of the full hemisphere from a radial profile.
//!
//! Both strategies revolve the in-plane lobe about the incidence direction:
//! each grid point is mapped to an angular distance from the incidence
//! direction, the profile is evaluated on both sides of the incidence at that
//! distance and the two evaluations are blended according to how close the
//! point lies to the forward-scatter direction.

use crate::{
    error::{Error, Result},
    profile::RadialProfile,
};
use std::fmt::{Debug, Display, Formatter};

/// Angular distances below this threshold (degrees) are replaced by 1° to
/// avoid the singularity at the specular direction.
pub const SPECULAR_EPSILON: f64 = 1e-6;

/// Which side of the surface the reconstructed distribution describes.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Light scattered back into the incident hemisphere.
    #[cfg_attr(feature = "cli", clap(alias = "brdf"))]
    Reflection,
    /// Light scattered through the surface.
    #[cfg_attr(feature = "cli", clap(alias = "btdf"))]
    Transmission,
}

impl SurfaceKind {
    /// Signature written on the first line of the exported file.
    pub const fn signature(&self) -> &'static str {
        match self {
            SurfaceKind::Reflection => "OPTIS - brdf surface file v9.0",
            SurfaceKind::Transmission => "OPTIS - brdf surface file v7.0",
        }
    }

    /// Extension of the exported file.
    pub const fn extension(&self) -> &'static str {
        match self {
            SurfaceKind::Reflection => "brdf",
            SurfaceKind::Transmission => "anisotropicbsdf",
        }
    }

    /// Returns the `(has_reflection, has_transmission)` flags.
    pub const fn flags(&self) -> (u8, u8) {
        match self {
            SurfaceKind::Reflection => (1, 0),
            SurfaceKind::Transmission => (0, 1),
        }
    }
}

impl Display for SurfaceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceKind::Reflection => write!(f, "reflection"),
            SurfaceKind::Transmission => write!(f, "transmission"),
        }
    }
}

/// Extends a radial profile into a value at any exit direction.
pub trait ReconstructionStrategy: Debug + Send + Sync {
    /// Side of the surface the strategy reconstructs.
    fn kind(&self) -> SurfaceKind;

    /// Whether the reconstructed grids may be rescaled to a target
    /// reflectance.
    fn supports_rescale(&self) -> bool { false }

    /// Evaluates the reconstructed distribution at the exit direction
    /// `(theta, phi)` for the given incidence. All angles are in degrees.
    fn evaluate(&self, profile: &RadialProfile, incidence: f64, theta: f64, phi: f64) -> f64;
}

/// Distance (degrees) between the incidence direction and the exit direction
/// `(theta, phi)`, with the azimuthal component stretched by `1 / ratio`.
pub fn angular_distance(incidence: f64, theta: f64, phi: f64, ratio: f64) -> f64 {
    let (sin_phi, cos_phi) = phi.to_radians().sin_cos();
    let d = ((incidence - theta * cos_phi).powi(2) + (theta * sin_phi / ratio).powi(2)).sqrt();
    if d < SPECULAR_EPSILON {
        1.0
    } else {
        d
    }
}

/// Weight of the evaluation at `incidence - distance` in the blend.
fn blend_weight(incidence: f64, distance: f64, theta: f64, phi: f64, max_theta: f64) -> f64 {
    if incidence + distance > max_theta {
        return 1.0;
    }
    (incidence + distance - theta * phi.to_radians().cos()) / (2.0 * distance)
}

/// Plane-symmetric reconstruction used for reflection.
///
/// The lobe is revolved without stretching and profile evaluations are used
/// as they are, extrapolated values included.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaneSymmetric;

impl ReconstructionStrategy for PlaneSymmetric {
    fn kind(&self) -> SurfaceKind { SurfaceKind::Reflection }

    fn evaluate(&self, profile: &RadialProfile, incidence: f64, theta: f64, phi: f64) -> f64 {
        let d = angular_distance(incidence, theta, phi, 1.0);
        let weight = blend_weight(incidence, d, theta, phi, profile.max_theta());
        let left = profile.eval(incidence - d);
        let right = profile.eval(incidence + d);
        weight * left + (1.0 - weight) * right
    }
}

/// Asymmetric reconstruction used for transmission.
///
/// The lobe is elliptic with the given aspect ratio (minor over major axis)
/// and both profile evaluations are floored at zero before blending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    ratio: f64,
}

impl Clamped {
    /// Creates the strategy for the given lobe aspect ratio.
    pub fn new(ratio: f64) -> Result<Self> {
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(Error::InvalidParameters(format!(
                "lobe aspect ratio must be a positive number, got {ratio}"
            )));
        }
        Ok(Self { ratio })
    }

    /// Lobe aspect ratio.
    pub fn ratio(&self) -> f64 { self.ratio }
}

impl Default for Clamped {
    fn default() -> Self { Self { ratio: 1.0 } }
}

impl ReconstructionStrategy for Clamped {
    fn kind(&self) -> SurfaceKind { SurfaceKind::Transmission }

    fn supports_rescale(&self) -> bool { true }

    fn evaluate(&self, profile: &RadialProfile, incidence: f64, theta: f64, phi: f64) -> f64 {
        let d = angular_distance(incidence, theta, phi, self.ratio);
        let weight = blend_weight(incidence, d, theta, phi, profile.max_theta());
        let left = profile.eval(incidence - d).max(0.0);
        let right = profile.eval(incidence + d).max(0.0);
        weight * left + (1.0 - weight) * right
    }
}

/// Creates the strategy reconstructing the given side of the surface.
///
/// `ratio` is only used by the transmission strategy.
pub fn strategy_for(kind: SurfaceKind, ratio: f64) -> Result<Box<dyn ReconstructionStrategy>> {
    match kind {
        SurfaceKind::Reflection => Ok(Box::new(PlaneSymmetric)),
        SurfaceKind::Transmission => Ok(Box::new(Clamped::new(ratio)?)),
    }
}
