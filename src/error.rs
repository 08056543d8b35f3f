//! Error types for the compass
//!
//! Only orientation extraction can fail. The failure is recoverable: the
//! estimator keeps its previous bearing and reports the rejection.

use core::fmt;

/// Result type for compass operations
pub type Result<T> = core::result::Result<T, CompassError>;

/// Compass errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompassError {
    /// Gravity and magnetic vectors do not define an orientation
    DegenerateOrientation(DegenerateCause),
}

/// Why a rotation matrix could not be built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DegenerateCause {
    /// Gravity vector is too short, e.g. the device is falling or the reading is zero
    FreeFall,
    /// Magnetic field has no usable horizontal component
    WeakHorizontalField,
    /// A reading is so large that its products overflow `f32`
    Overflow,
}

impl fmt::Display for CompassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompassError::DegenerateOrientation(cause) => {
                write!(f, "degenerate orientation: {}", cause)
            }
        }
    }
}

impl fmt::Display for DegenerateCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateCause::FreeFall => write!(f, "gravity below free-fall threshold"),
            DegenerateCause::WeakHorizontalField => {
                write!(f, "horizontal magnetic field too weak")
            }
            DegenerateCause::Overflow => write!(f, "sensor reading out of range"),
        }
    }
}

impl core::error::Error for CompassError {}
