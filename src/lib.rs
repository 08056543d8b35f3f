#![no_std]

//! [![github]](https://github.com/wboayue/fusion-compass)&ensp;[![crates-io]](https://crates.io/crates/fusion-compass)&ensp;[![license]](https://opensource.org/licenses/MIT)
//!
//! [github]: https://img.shields.io/badge/github-8da0cb?style=for-the-badge&labelColor=555555&logo=github
//! [crates-io]: https://img.shields.io/badge/crates.io-fc8d62?style=for-the-badge&labelColor=555555&logo=rust
//! [license]: https://img.shields.io/badge/License-MIT-blue.svg?style=for-the-badge&labelColor=555555
//!
//! Fusion Compass - a tilt-compensated heading estimator for wearable compasses
//!
//! Raw accelerometer and magnetometer vectors are smoothed by an exponential
//! low-pass filter, fused into a rotation matrix, and reduced to a bearing in
//! degrees clockwise from north. When a location fix is available the bearing is
//! corrected for magnetic declination and refers to true north.
//!
//! # Features
//!
//! - Single-pole low-pass filtering of both sensors (`ALPHA = 0.25`)
//! - Rotation matrix and azimuth/pitch/roll extraction with degenerate-input rejection
//! - Declination correction from any geomagnetic model, with a built-in dipole approximation
//! - Sensor axes remapping for arbitrary mounting
//! - Push (observer) or pull access to the bearing
//! - `#![no_std]` compatible; logging through `log` or `defmt`
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use fusion_compass::{Compass, DeclinationModel};
//!
//! let mut compass = Compass::new();
//!
//! // Sensor callbacks
//! compass.on_gravity(Vector3::new(0.0, 0.0, 9.8));     // m/s²
//! compass.on_magnetic(Vector3::new(-30.0, 0.0, -40.0)); // µT
//!
//! // Location callback
//! compass.set_declination_model(DeclinationModel::new(-2.0));
//!
//! if let Some(bearing) = compass.bearing() {
//!     // rotate the needle graphic by -bearing
//!     let rotation = fusion_compass::needle_rotation(bearing);
//!     assert!((rotation + 90.0).abs() < 0.5);
//! }
//! ```

#[macro_use]
mod fmt;

pub mod axes;
pub mod compass;
pub mod declination;
mod error;
pub mod filter;
mod math;
pub mod orientation;
mod types;

pub use axes::AxesAlignment;
pub use compass::{BearingObserver, Compass, CompassEvent, FusionOutcome, NoObserver};
pub use declination::{DeclinationModel, DipoleModel, GeomagneticModel, decimal_year};
pub use error::{CompassError, DegenerateCause, Result};
pub use filter::{ALPHA, LowPassFilter, low_pass};
pub use math::{
    DEG_TO_RAD, RAD_TO_DEG, STANDARD_GRAVITY, apply_declination, needle_rotation,
    normalize_degrees, remove_declination,
};
pub use types::*;
