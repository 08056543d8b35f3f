//! Sensor-to-device axes remapping
//!
//! Accelerometer and magnetometer dies are not always soldered with their axes
//! matching the display: a watch face with `y` towards 12 o'clock and `z` out of
//! the glass. An [`AxesAlignment`] describes how to read device axes out of
//! sensor axes, and is applied to every raw vector before filtering.
//!
//! ```
//! use nalgebra::Vector3;
//! use fusion_compass::AxesAlignment;
//!
//! // Sensor x points to 12 o'clock, sensor y points to 9 o'clock
//! let device = AxesAlignment::NyPxPz.apply(Vector3::new(1.0, 2.0, 3.0));
//! assert_eq!(device, Vector3::new(-2.0, 1.0, 3.0));
//! ```

use nalgebra::{Matrix3, Vector3};

/// Signed permutation from sensor axes to device axes.
///
/// Read the variant name as three pairs giving the source of device x, y and z
/// in turn: `P`/`N` for the sign and `x`/`y`/`z` for the sensor axis. `PyNxPz`
/// reads device x from +sensor y, device y from -sensor x and device z from
/// +sensor z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxesAlignment {
    /// +X+Y+Z (sensor axes already match the device)
    #[default]
    PxPyPz,
    PxNzPy,
    PxNyNz,
    PxPzNy,
    NxPyNz,
    NxPzPy,
    NxNyPz,
    NxNzNy,
    PyNxPz,
    PyNzNx,
    PyPxNz,
    PyPzPx,
    NyPxPz,
    NyNzPx,
    NyNxNz,
    NyPzNx,
    PzPyNx,
    PzPxPy,
    PzNyPx,
    PzNxNy,
    NzPyPx,
    NzNxPy,
    NzNyNx,
    NzPxNy,
}

/// Sensor axis index and sign feeding one device axis
type Source = (usize, f32);

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

impl AxesAlignment {
    /// Every alignment, identity first
    pub const ALL: [AxesAlignment; 24] = [
        Self::PxPyPz,
        Self::PxNzPy,
        Self::PxNyNz,
        Self::PxPzNy,
        Self::NxPyNz,
        Self::NxPzPy,
        Self::NxNyPz,
        Self::NxNzNy,
        Self::PyNxPz,
        Self::PyNzNx,
        Self::PyPxNz,
        Self::PyPzPx,
        Self::NyPxPz,
        Self::NyNzPx,
        Self::NyNxNz,
        Self::NyPzNx,
        Self::PzPyNx,
        Self::PzPxPy,
        Self::PzNyPx,
        Self::PzNxNy,
        Self::NzPyPx,
        Self::NzNxPy,
        Self::NzNyNx,
        Self::NzPxNy,
    ];

    const fn sources(self) -> [Source; 3] {
        match self {
            Self::PxPyPz => [(X, 1.0), (Y, 1.0), (Z, 1.0)],
            Self::PxNzPy => [(X, 1.0), (Z, -1.0), (Y, 1.0)],
            Self::PxNyNz => [(X, 1.0), (Y, -1.0), (Z, -1.0)],
            Self::PxPzNy => [(X, 1.0), (Z, 1.0), (Y, -1.0)],
            Self::NxPyNz => [(X, -1.0), (Y, 1.0), (Z, -1.0)],
            Self::NxPzPy => [(X, -1.0), (Z, 1.0), (Y, 1.0)],
            Self::NxNyPz => [(X, -1.0), (Y, -1.0), (Z, 1.0)],
            Self::NxNzNy => [(X, -1.0), (Z, -1.0), (Y, -1.0)],
            Self::PyNxPz => [(Y, 1.0), (X, -1.0), (Z, 1.0)],
            Self::PyNzNx => [(Y, 1.0), (Z, -1.0), (X, -1.0)],
            Self::PyPxNz => [(Y, 1.0), (X, 1.0), (Z, -1.0)],
            Self::PyPzPx => [(Y, 1.0), (Z, 1.0), (X, 1.0)],
            Self::NyPxPz => [(Y, -1.0), (X, 1.0), (Z, 1.0)],
            Self::NyNzPx => [(Y, -1.0), (Z, -1.0), (X, 1.0)],
            Self::NyNxNz => [(Y, -1.0), (X, -1.0), (Z, -1.0)],
            Self::NyPzNx => [(Y, -1.0), (Z, 1.0), (X, -1.0)],
            Self::PzPyNx => [(Z, 1.0), (Y, 1.0), (X, -1.0)],
            Self::PzPxPy => [(Z, 1.0), (X, 1.0), (Y, 1.0)],
            Self::PzNyPx => [(Z, 1.0), (Y, -1.0), (X, 1.0)],
            Self::PzNxNy => [(Z, 1.0), (X, -1.0), (Y, -1.0)],
            Self::NzPyPx => [(Z, -1.0), (Y, 1.0), (X, 1.0)],
            Self::NzNxPy => [(Z, -1.0), (X, -1.0), (Y, 1.0)],
            Self::NzNyNx => [(Z, -1.0), (Y, -1.0), (X, -1.0)],
            Self::NzPxNy => [(Z, -1.0), (X, 1.0), (Y, -1.0)],
        }
    }

    /// Remap a sensor-frame vector into the device frame
    #[inline]
    pub fn apply(self, sensor: Vector3<f32>) -> Vector3<f32> {
        let [x, y, z] = self.sources();
        Vector3::new(sensor[x.0] * x.1, sensor[y.0] * y.1, sensor[z.0] * z.1)
    }

    /// The remap as a matrix, so that `matrix * sensor == apply(sensor)`
    pub fn matrix(self) -> Matrix3<f32> {
        let mut matrix = Matrix3::zeros();
        for (row, (column, sign)) in self.sources().into_iter().enumerate() {
            matrix[(row, column)] = sign;
        }
        matrix
    }

    /// The alignment that undoes this one
    pub fn inverse(self) -> AxesAlignment {
        // Signed permutation matrices are orthogonal: the inverse is the transpose
        let transposed = self.matrix().transpose();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.matrix() == transposed)
            .unwrap_or(Self::PxPyPz)
    }

    /// Whether the remap preserves handedness
    pub fn is_proper_rotation(self) -> bool {
        self.matrix().determinant() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_alignment() {
        let sensor = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(AxesAlignment::default().apply(sensor), sensor);
    }

    #[test]
    fn test_specific_alignments() {
        let sensor = Vector3::new(1.0, 2.0, 3.0);

        assert_eq!(AxesAlignment::PxNzPy.apply(sensor), Vector3::new(1.0, -3.0, 2.0));
        assert_eq!(AxesAlignment::PyNxPz.apply(sensor), Vector3::new(2.0, -1.0, 3.0));
        assert_eq!(AxesAlignment::NxNyPz.apply(sensor), Vector3::new(-1.0, -2.0, 3.0));
        assert_eq!(AxesAlignment::PzPxPy.apply(sensor), Vector3::new(3.0, 1.0, 2.0));
    }

    #[test]
    fn test_matrix_agrees_with_apply() {
        let sensor = Vector3::new(0.5, -7.0, 2.25);
        for alignment in AxesAlignment::ALL {
            assert_eq!(
                alignment.matrix() * sensor,
                alignment.apply(sensor),
                "{:?}",
                alignment
            );
        }
    }

    #[test]
    fn test_every_alignment_is_a_rotation() {
        // All 24 variants are the proper rotations of the cube
        for alignment in AxesAlignment::ALL {
            assert!(alignment.is_proper_rotation(), "{:?}", alignment);
        }
    }

    #[test]
    fn test_inverse_round_trip() {
        let sensor = Vector3::new(1.0, -2.0, 3.0);
        for alignment in AxesAlignment::ALL {
            let recovered = alignment.inverse().apply(alignment.apply(sensor));
            assert_eq!(recovered, sensor, "{:?}", alignment);
        }

        assert_eq!(AxesAlignment::PyNxPz.inverse(), AxesAlignment::NyPxPz);
        assert_eq!(AxesAlignment::NxNyPz.inverse(), AxesAlignment::NxNyPz);
    }
}
