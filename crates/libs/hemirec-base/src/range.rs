//! Inclusive ranges of values defined by a step size, used for the angular
//! sampling axes of the reconstruction grid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

/// Defines a right inclusive range [a, b] of values with a given step.
///
/// The range is always inclusive, even if the step size does not divide the
/// range evenly: the last value is clamped to `stop`.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct StepRangeIncl<T: Copy + Clone> {
    /// Initial value of the range.
    pub start: T,
    /// Final value of the range.
    pub stop: T,
    /// Step size.
    pub step_size: T,
}

impl<T: Copy + Clone + Debug> Debug for StepRangeIncl<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRangeIncl")
            .field("start", &self.start)
            .field("stop", &self.stop)
            .field("step_size", &self.step_size)
            .finish()
    }
}

impl<T: Copy + Clone> StepRangeIncl<T> {
    /// Creates a new range with the given start, stop and step size.
    pub const fn new(start: T, stop: T, step_size: T) -> Self {
        Self {
            start,
            stop,
            step_size,
        }
    }
}

impl StepRangeIncl<f64> {
    /// Returns the span of the range.
    pub fn span(&self) -> f64 { self.stop - self.start }

    /// Returns the step count of the range.
    pub fn step_count(&self) -> usize {
        let span = self.span();
        if span.abs() <= f64::EPSILON * self.stop.abs().max(1.0) {
            1
        } else if (self.step_size - span).abs() <= f64::EPSILON * span.abs() {
            2
        } else {
            ((span / self.step_size).round() as usize).max(1) + 1
        }
    }

    /// Returns all possible values of the range.
    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> {
        let Self {
            start,
            stop,
            step_size,
        } = *self;
        let count = self.step_count();
        (0..count).map(move |i| {
            if i + 1 == count {
                stop
            } else {
                (start + step_size * i as f64).min(stop)
            }
        })
    }

    /// Checks that the range describes a usable, strictly increasing axis.
    pub fn validate(&self, axis: &'static str) -> Result<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(Error::InvalidParameters(format!(
                "step size of the {axis} axis must be a positive number, got {}",
                self.step_size
            )));
        }
        if !(self.start.is_finite() && self.stop.is_finite()) || self.stop < self.start {
            return Err(Error::MeasurementOrdering { axis, index: 1 });
        }
        Ok(())
    }
}

impl<T> Display for StepRangeIncl<T>
where
    T: Display + Copy + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. ={} / {}", self.start, self.stop, self.step_size)
    }
}

impl<'a, T> TryFrom<&'a str> for StepRangeIncl<T>
where
    T: Copy + Clone + FromStr,
{
    type Error = String;

    fn try_from(value: &'a str) -> std::result::Result<Self, Self::Error> {
        let mut parts = value.split("..");
        let start = parts
            .next()
            .ok_or_else(|| format!("Invalid range: {value}"))?
            .trim()
            .parse::<T>()
            .map_err(|_| format!("Invalid range start value: {value}"))?;
        let mut parts = parts
            .next()
            .ok_or_else(|| format!("Invalid range: {value}"))?
            .trim()
            .split('/');
        let stop = parts
            .next()
            .ok_or_else(|| format!("Invalid range: {value}"))?
            .trim()
            .trim_start_matches('=')
            .trim()
            .parse::<T>()
            .map_err(|_| format!("Invalid range stop value: {value}"))?;
        let step = parts
            .next()
            .ok_or_else(|| format!("Invalid range: {value}"))?
            .trim()
            .parse::<T>()
            .map_err(|_| format!("Invalid range step size value: {value}"))?;
        Ok(Self::new(start, stop, step))
    }
}

impl<T> FromStr for StepRangeIncl<T>
where
    T: Copy + Clone + FromStr,
{
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> { Self::try_from(s) }
}

impl<T> Serialize for StepRangeIncl<T>
where
    T: Serialize + Copy + Display + Clone,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{}", self))
    }
}

impl<'d, T> Deserialize<'d> for StepRangeIncl<T>
where
    T: Deserialize<'d> + Copy + FromStr + Clone,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'d>,
    {
        struct RangeVisitor<T>(std::marker::PhantomData<T>);

        impl<'de, T> serde::de::Visitor<'de> for RangeVisitor<T>
        where
            T: Copy + Deserialize<'de> + FromStr,
        {
            type Value = StepRangeIncl<T>;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                write!(
                    formatter,
                    "an inclusive range by step size in the form of \"start .. =stop / step\""
                )
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                StepRangeIncl::<T>::try_from(v).map_err(E::custom)
            }
        }
        deserializer.deserialize_str(RangeVisitor::<T>(std::marker::PhantomData))
    }
}
