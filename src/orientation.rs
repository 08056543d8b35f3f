//! Rotation matrix and orientation angles from gravity and magnetic field
//!
//! The rotation matrix maps device coordinates into a world frame with
//! x pointing east, y pointing to magnetic north and z pointing up. Its rows are
//! the world axes expressed in device coordinates:
//!
//! ```text
//! H = normalize(magnetic × gravity)   east
//! A = normalize(gravity)              up
//! M = A × H                           magnetic north
//! R = [H; M; A]
//! ```

use crate::error::{CompassError, DegenerateCause, Result};
use crate::types::{CompassSettings, Orientation};
use nalgebra::{ComplexField, Matrix3, RealField, Vector3};

/// Build the rotation matrix for a gravity and geomagnetic reading.
///
/// Fails when gravity is shorter than `settings.free_fall_gravity`, or when the
/// horizontal component of the field (`|magnetic × gravity|`) is below
/// `settings.min_horizontal_field`. Readings large enough to overflow either
/// product are rejected with [`DegenerateCause::Overflow`].
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use fusion_compass::{CompassSettings, orientation::rotation_matrix};
///
/// let gravity = Vector3::new(0.0, 0.0, 9.8);   // lying flat, screen up
/// let magnetic = Vector3::new(0.0, 30.0, -40.0); // top edge towards magnetic north
///
/// let r = rotation_matrix(gravity, magnetic, &CompassSettings::default()).unwrap();
/// assert!((r.determinant() - 1.0).abs() < 1e-5);
/// ```
pub fn rotation_matrix(
    gravity: Vector3<f32>,
    magnetic: Vector3<f32>,
    settings: &CompassSettings,
) -> Result<Matrix3<f32>> {
    let gravity_squared = gravity.magnitude_squared();
    let free_fall = settings.free_fall_gravity;
    if !(gravity_squared >= free_fall * free_fall) {
        return Err(CompassError::DegenerateOrientation(DegenerateCause::FreeFall));
    }
    if gravity_squared.is_infinite() {
        return Err(CompassError::DegenerateOrientation(DegenerateCause::Overflow));
    }

    let horizontal = magnetic.cross(&gravity);
    let horizontal_norm = horizontal.magnitude();
    if !(horizontal_norm >= settings.min_horizontal_field) {
        return Err(CompassError::DegenerateOrientation(
            DegenerateCause::WeakHorizontalField,
        ));
    }
    if horizontal_norm.is_infinite() {
        return Err(CompassError::DegenerateOrientation(DegenerateCause::Overflow));
    }

    let east = horizontal / horizontal_norm;
    let up = gravity / gravity_squared.sqrt();
    let north = up.cross(&east);

    Ok(Matrix3::from_rows(&[
        east.transpose(),
        north.transpose(),
        up.transpose(),
    ]))
}

/// Extract azimuth, pitch and roll from a rotation matrix.
///
/// Azimuth is zero when the device y axis points to magnetic north and grows
/// clockwise when viewed from above.
pub fn orientation(rotation: &Matrix3<f32>) -> Orientation {
    Orientation {
        azimuth: rotation[(0, 1)].atan2(rotation[(1, 1)]),
        pitch: (-rotation[(2, 1)]).clamp(-1.0, 1.0).asin(),
        roll: (-rotation[(2, 0)]).atan2(rotation[(2, 2)]),
    }
}

/// Magnetic azimuth in degrees, wrapped into [0, 360).
///
/// Convenience for [`rotation_matrix`] followed by [`orientation`].
pub fn magnetic_azimuth(
    gravity: Vector3<f32>,
    magnetic: Vector3<f32>,
    settings: &CompassSettings,
) -> Result<f32> {
    let rotation = rotation_matrix(gravity, magnetic, settings)?;
    Ok(orientation(&rotation).azimuth_degrees())
}
