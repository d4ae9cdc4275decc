//! Inclusive `[min, max]` ranges for age, income, and rent filters.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ModelError;

/// An inclusive range with `min <= max`.
///
/// Serialized as a two-element JSON array, matching the frontend's
/// `[min, max]` tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Copy + std::fmt::Display> ValueRange<T> {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidRange`] if `min > max` or the bounds
    /// are not comparable (NaN).
    pub fn new(min: T, max: T) -> Result<Self, ModelError> {
        if min <= max {
            Ok(Self { min, max })
        } else {
            Err(ModelError::InvalidRange {
                min: min.to_string(),
                max: max.to_string(),
            })
        }
    }

    /// Creates a range from two bounds in either order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidRange`] if the bounds are not
    /// comparable (NaN).
    pub fn ordered(a: T, b: T) -> Result<Self, ModelError> {
        if b < a { Self::new(b, a) } else { Self::new(a, b) }
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> T {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> T {
        self.max
    }

    /// Whether `value` lies within the range, bounds included.
    #[must_use]
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Whether this range shares at least one point with `[lo, hi]`.
    #[must_use]
    pub fn overlaps(&self, lo: T, hi: T) -> bool {
        self.min <= hi && self.max >= lo
    }
}

impl<T: Serialize> Serialize for ValueRange<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.min, &self.max).serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for ValueRange<T>
where
    T: Deserialize<'de> + PartialOrd + Copy + std::fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (min, max) = <(T, T)>::deserialize(deserializer)?;
        Self::new(min, max).map_err(D::Error::custom)
    }
}
