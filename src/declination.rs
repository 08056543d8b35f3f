//! Magnetic declination from a location fix
//!
//! Declination is the angle from true north to magnetic north, east positive.
//! A [`DeclinationModel`] holds the value for the most recent location fix; it is
//! produced by any [`GeomagneticModel`], such as a full World Magnetic Model
//! supplied by the host platform, or the built-in [`DipoleModel`].

use crate::math::{RAD_TO_DEG, apply_declination};
use crate::types::LocationFix;
use nalgebra::{ComplexField, RealField};

const MS_PER_JULIAN_YEAR: f64 = 365.25 * 86_400_000.0;

/// Source of magnetic declination for a location and time
pub trait GeomagneticModel {
    /// Declination in degrees, east positive, for the given fix
    fn declination(&self, fix: &LocationFix) -> f32;
}

impl<F: Fn(&LocationFix) -> f32> GeomagneticModel for F {
    fn declination(&self, fix: &LocationFix) -> f32 {
        self(fix)
    }
}

/// Declination correction for the current location.
///
/// Absence of a model means bearings are reported against magnetic north.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeclinationModel {
    declination_degrees: f32,
}

impl DeclinationModel {
    /// Wrap a declination value, reduced into (-180, 180] degrees
    ///
    /// # Example
    /// ```
    /// use fusion_compass::DeclinationModel;
    ///
    /// let model = DeclinationModel::new(5.0);
    /// assert!((model.correct(0.0) - 355.0).abs() < 1e-4);
    /// ```
    pub fn new(declination_degrees: f32) -> Self {
        let mut reduced = declination_degrees % 360.0;
        if reduced > 180.0 {
            reduced -= 360.0;
        } else if reduced <= -180.0 {
            reduced += 360.0;
        }

        Self {
            declination_degrees: reduced,
        }
    }

    /// Evaluate a geomagnetic model at a location fix
    pub fn from_fix<M: GeomagneticModel + ?Sized>(model: &M, fix: &LocationFix) -> Self {
        let model = Self::new(model.declination(fix));
        log_info!(
            "declination {} deg at lat {} lon {}",
            model.declination_degrees,
            fix.latitude,
            fix.longitude
        );
        model
    }

    /// Declination in degrees, east positive
    pub fn declination_degrees(&self) -> f32 {
        self.declination_degrees
    }

    /// Convert a magnetic bearing in [0, 360) into a true bearing in [0, 360)
    pub fn correct(&self, magnetic_bearing: f32) -> f32 {
        apply_declination(magnetic_bearing, self.declination_degrees)
    }
}

/// Centred dipole approximation of the main geomagnetic field.
///
/// Uses only the first-degree Gauss coefficients and their secular variation,
/// so declination errors of several degrees (tens near the poles) are normal.
/// Prefer a full spherical-harmonic model where one is available; this exists
/// for devices that have nothing better.
///
/// Altitude does not change the declination of a centred dipole and is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DipoleModel {
    /// Reference epoch as a decimal year
    pub epoch: f32,
    /// Last decimal year the coefficients are meant for
    pub valid_until: f32,
    /// g(1,0), g(1,1), h(1,1) in nT at the epoch
    pub coefficients: [f32; 3],
    /// Secular variation of the coefficients in nT/year
    pub secular_variation: [f32; 3],
}

impl DipoleModel {
    /// First-degree terms of WMM2025
    pub const WMM2025: DipoleModel = DipoleModel {
        epoch: 2025.0,
        valid_until: 2030.0,
        coefficients: [-29351.8, -1410.8, 4545.4],
        secular_variation: [12.0, 9.7, -21.5],
    };

    /// Coefficients propagated to a decimal year
    pub fn coefficients_at(&self, year: f32) -> [f32; 3] {
        let elapsed = year - self.epoch;
        let [g10, g11, h11] = self.coefficients;
        let [dg10, dg11, dh11] = self.secular_variation;
        [g10 + dg10 * elapsed, g11 + dg11 * elapsed, h11 + dh11 * elapsed]
    }

    /// Geographic latitude and longitude of the northern geomagnetic pole, degrees
    pub fn pole_at(&self, year: f32) -> (f32, f32) {
        let [g10, g11, h11] = self.coefficients_at(year);
        let horizontal = (g11 * g11 + h11 * h11).sqrt();
        let colatitude = horizontal.atan2(-g10);
        let longitude = (-h11).atan2(-g11);
        (90.0 - colatitude * RAD_TO_DEG, longitude * RAD_TO_DEG)
    }

    fn field_at(&self, fix: &LocationFix) -> (f32, f32) {
        let year = decimal_year(fix.timestamp_ms);
        if year < self.epoch || year > self.valid_until {
            log_warn!(
                "dipole model epoch {} evaluated outside its validity at {}",
                self.epoch,
                year
            );
        }

        let [g10, g11, h11] = self.coefficients_at(year);
        let colatitude = (90.0 - fix.latitude).to_radians();
        let longitude = fix.longitude.to_radians();
        let (sin_theta, cos_theta) = colatitude.sin_cos();
        let (sin_phi, cos_phi) = longitude.sin_cos();

        let north = -g10 * sin_theta + (g11 * cos_phi + h11 * sin_phi) * cos_theta;
        let east = g11 * sin_phi - h11 * cos_phi;
        (north, east)
    }
}

impl Default for DipoleModel {
    fn default() -> Self {
        Self::WMM2025
    }
}

impl GeomagneticModel for DipoleModel {
    fn declination(&self, fix: &LocationFix) -> f32 {
        let (north, east) = self.field_at(fix);
        east.atan2(north) * RAD_TO_DEG
    }
}

/// Unix milliseconds to a decimal (Julian) year
pub fn decimal_year(timestamp_ms: i64) -> f32 {
    (1970.0 + timestamp_ms as f64 / MS_PER_JULIAN_YEAR) as f32
}
