//! Range validation for bounded settings.
//!
//! A bounded setting carries a [`Bounds`] value decided at construction. Checks
//! are exact: a value is accepted only when `min <= value && value <= max`
//! holds under the type's own `PartialOrd`. Floats get no tolerance, and NaN
//! (unordered against everything) is always rejected.

/// Validation policy of a valued setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds<T> {
    /// Every value is accepted.
    Unbounded,
    /// Values must satisfy `min <= value <= max`.
    Inclusive {
        /// Lower bound (inclusive).
        min: T,
        /// Upper bound (inclusive).
        max: T,
    },
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Bounds::Unbounded
    }
}

/// A value that fell outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutOfBounds<T> {
    /// The rejected value.
    pub value: T,
    /// Lower bound in force.
    pub min: T,
    /// Upper bound in force.
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// No bounds.
    pub fn unbounded() -> Self {
        Bounds::Unbounded
    }

    /// Inclusive `[min, max]` bounds.
    pub fn inclusive(min: T, max: T) -> Self {
        Bounds::Inclusive { min, max }
    }

    /// Whether min/max are enforced.
    pub fn has_min_max(&self) -> bool {
        matches!(self, Bounds::Inclusive { .. })
    }

    /// Lower bound, if any.
    pub fn min(&self) -> Option<T> {
        match self {
            Bounds::Unbounded => None,
            Bounds::Inclusive { min, .. } => Some(*min),
        }
    }

    /// Upper bound, if any.
    pub fn max(&self) -> Option<T> {
        match self {
            Bounds::Unbounded => None,
            Bounds::Inclusive { max, .. } => Some(*max),
        }
    }

    /// Check a candidate value.
    pub fn check(&self, value: T) -> Result<(), OutOfBounds<T>> {
        match *self {
            Bounds::Unbounded => Ok(()),
            Bounds::Inclusive { min, max } => {
                if min <= value && value <= max {
                    Ok(())
                } else {
                    Err(OutOfBounds { value, min, max })
                }
            }
        }
    }
}
