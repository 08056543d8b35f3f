//! Angle constants and wraparound helpers

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Wrap an angle into [0, 360) degrees with a single correction step.
///
/// Inputs are expected within (-360, 720), which holds for an azimuth in
/// [0, 360) shifted by any declination of magnitude below 360°.
///
/// # Example
/// ```
/// use fusion_compass::normalize_degrees;
///
/// assert_eq!(normalize_degrees(-5.0), 355.0);
/// assert_eq!(normalize_degrees(365.0), 5.0);
/// assert_eq!(normalize_degrees(42.0), 42.0);
/// ```
#[inline]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = if degrees < 0.0 {
        degrees + 360.0
    } else if degrees >= 360.0 {
        degrees - 360.0
    } else {
        degrees
    };

    // -tiny + 360 rounds to exactly 360 in f32; adding 0.0 turns -0.0 into 0.0
    if wrapped >= 360.0 { 0.0 } else { wrapped + 0.0 }
}

/// Convert a magnetic bearing into a true bearing.
///
/// Declination is the angle from true north to magnetic north (east positive),
/// so it is subtracted from the magnetic bearing.
#[inline]
pub fn apply_declination(magnetic_bearing: f32, declination: f32) -> f32 {
    normalize_degrees(magnetic_bearing - declination)
}

/// Inverse of [`apply_declination`]: recover the magnetic bearing from a true bearing.
#[inline]
pub fn remove_declination(true_bearing: f32, declination: f32) -> f32 {
    normalize_degrees(true_bearing + declination)
}

/// Rotation in degrees to apply to a north-up needle graphic so it points at
/// the given bearing's reference north.
#[inline]
pub fn needle_rotation(bearing: f32) -> f32 {
    -bearing
}
