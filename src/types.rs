//! Settings and value types for the compass

use crate::axes::AxesAlignment;
use crate::math::STANDARD_GRAVITY;

/// Compass settings
///
/// Thresholds used to reject degenerate orientations, and the sensor mounting.
/// Units follow the sensors: the defaults assume an accelerometer in m/s² and a
/// magnetometer in µT.
///
/// # Example
/// ```
/// use fusion_compass::{AxesAlignment, CompassSettings};
///
/// // Accelerometer reporting in g rather than m/s²
/// let settings = CompassSettings {
///     free_fall_gravity: 0.1,
///     axes_alignment: AxesAlignment::PyNxPz,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompassSettings {
    /// Remap applied to raw accelerometer and magnetometer vectors before filtering
    pub axes_alignment: AxesAlignment,
    /// Gravity magnitude below which the device is considered in free fall
    ///
    /// The rotation matrix is rejected when the filtered gravity vector is
    /// shorter than this.
    pub free_fall_gravity: f32,
    /// Minimum norm of `magnetic × gravity`
    ///
    /// Below this the horizontal field is too weak to define north: the vectors
    /// are nearly parallel, the device is near a magnetic pole, or there is no field.
    pub min_horizontal_field: f32,
}

impl Default for CompassSettings {
    fn default() -> Self {
        Self {
            axes_alignment: AxesAlignment::default(),
            free_fall_gravity: 0.1 * STANDARD_GRAVITY,
            min_horizontal_field: 0.1,
        }
    }
}

/// Which north a bearing is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum North {
    /// Geographic north: a declination correction was applied
    True,
    /// Magnetic north: no location fix has produced a declination yet
    Magnetic,
}

/// Device orientation angles in radians, as extracted from a rotation matrix
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Orientation {
    /// Rotation around -z from magnetic north to the device y axis, in (-π, π]
    pub azimuth: f32,
    /// Rotation around x, in [-π/2, π/2]
    pub pitch: f32,
    /// Rotation around y, in (-π, π]
    pub roll: f32,
}

impl Orientation {
    /// Azimuth in degrees, wrapped into [0, 360)
    pub fn azimuth_degrees(&self) -> f32 {
        crate::math::normalize_degrees(self.azimuth.to_degrees())
    }
}

/// Location fix used to derive a declination
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocationFix {
    /// Geodetic latitude in degrees, north positive
    pub latitude: f32,
    /// Longitude in degrees, east positive
    pub longitude: f32,
    /// Altitude above the ellipsoid in metres
    pub altitude: f32,
    /// Unix time of the fix in milliseconds
    pub timestamp_ms: i64,
}

/// Eight-point compass rose label for a bearing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CardinalDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CardinalDirection {
    const ROSE: [CardinalDirection; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Nearest rose point for a bearing in [0, 360)
    ///
    /// # Example
    /// ```
    /// use fusion_compass::CardinalDirection;
    ///
    /// assert_eq!(CardinalDirection::from_bearing(350.0), CardinalDirection::North);
    /// assert_eq!(CardinalDirection::from_bearing(100.0), CardinalDirection::East);
    /// ```
    pub fn from_bearing(bearing: f32) -> Self {
        let sector = ((bearing + 22.5) / 45.0) as usize % 8;
        Self::ROSE[sector]
    }

    /// Short label such as `"NE"`
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::NorthEast => "NE",
            Self::East => "E",
            Self::SouthEast => "SE",
            Self::South => "S",
            Self::SouthWest => "SW",
            Self::West => "W",
            Self::NorthWest => "NW",
        }
    }
}
