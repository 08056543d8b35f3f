//! Heading estimator: filtered gravity and magnetic field fused into a bearing
//!
//! The [`Compass`] owns all mutable session state: both filter states, the
//! current declination model and the last bearing. Every update goes through
//! [`Compass::handle`], so a host that delivers sensor callbacks and location
//! results on different contexts only needs to serialise calls to that one
//! method (for example by keeping the compass behind a single mutex).

use crate::declination::{DeclinationModel, GeomagneticModel};
use crate::error::CompassError;
use crate::filter::LowPassFilter;
use crate::orientation::{orientation, rotation_matrix};
use crate::types::{CompassSettings, LocationFix, North, Orientation};
use nalgebra::Vector3;

/// Input delivered to the compass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompassEvent {
    /// Raw accelerometer sample, sensor axes
    Gravity(Vector3<f32>),
    /// Raw magnetometer sample, sensor axes
    Magnetic(Vector3<f32>),
    /// Declination for a new location fix
    Declination(DeclinationModel),
}

/// Result of handling one event
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FusionOutcome {
    /// A new bearing was computed
    Updated {
        /// Bearing in [0, 360) degrees
        bearing: f32,
        /// North the bearing is measured from
        reference: North,
    },
    /// One of the two sensors has not produced a sample yet
    AwaitingInput,
    /// Orientation could not be extracted; the previous bearing is kept
    Rejected(CompassError),
    /// A declination model was installed; it applies from the next fusion
    DeclinationChanged,
}

/// Receives every new bearing
pub trait BearingObserver {
    /// Called after each successful fusion
    fn on_bearing(&mut self, bearing: f32, reference: North);
}

impl<F: FnMut(f32, North)> BearingObserver for F {
    fn on_bearing(&mut self, bearing: f32, reference: North) {
        self(bearing, reference)
    }
}

/// Observer that ignores updates, for hosts that poll [`Compass::bearing`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl BearingObserver for NoObserver {
    fn on_bearing(&mut self, _bearing: f32, _reference: North) {}
}

/// Heading estimator state
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use fusion_compass::{Compass, DeclinationModel, FusionOutcome, North};
///
/// let mut compass = Compass::new();
///
/// assert_eq!(compass.on_gravity(Vector3::new(0.0, 0.0, 9.8)), FusionOutcome::AwaitingInput);
/// compass.on_magnetic(Vector3::new(0.0, 30.0, -40.0));
/// assert!(compass.bearing().unwrap() < 0.5 || compass.bearing().unwrap() > 359.5);
///
/// // 5° east declination takes effect on the next sample
/// compass.set_declination_model(DeclinationModel::new(5.0));
/// let outcome = compass.on_magnetic(Vector3::new(0.0, 30.0, -40.0));
///
/// let FusionOutcome::Updated { bearing, reference } = outcome else { unreachable!() };
/// assert_eq!(reference, North::True);
/// assert!((bearing - 355.0).abs() < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Compass<O = NoObserver> {
    /// Thresholds and sensor mounting
    settings: CompassSettings,
    /// Low-pass state of the gravity vector, device axes
    gravity: LowPassFilter,
    /// Low-pass state of the magnetic vector, device axes
    magnetic: LowPassFilter,
    /// Declination for the latest location fix
    declination: Option<DeclinationModel>,
    /// Last successful fusion result
    orientation: Option<Orientation>,
    /// Last magnetic bearing in [0, 360)
    magnetic_bearing: Option<f32>,
    /// Last bearing in [0, 360) and the north it refers to
    bearing: Option<(f32, North)>,
    /// Fusions rejected as degenerate since creation
    rejected: u32,
    /// Notified on every new bearing
    observer: O,
}

impl Compass {
    /// Create a compass with default settings and no observer
    pub fn new() -> Self {
        Self::with_settings(CompassSettings::default())
    }

    /// Create a compass with the given settings and no observer
    pub fn with_settings(settings: CompassSettings) -> Self {
        Self::with_observer(settings, NoObserver)
    }
}

impl Default for Compass {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: BearingObserver> Compass<O> {
    /// Create a compass that notifies `observer` of every new bearing
    pub fn with_observer(settings: CompassSettings, observer: O) -> Self {
        Self {
            settings,
            gravity: LowPassFilter::new(),
            magnetic: LowPassFilter::new(),
            declination: None,
            orientation: None,
            magnetic_bearing: None,
            bearing: None,
            rejected: 0,
            observer,
        }
    }

    /// Apply one event. This is the single entry point for all state changes.
    pub fn handle(&mut self, event: CompassEvent) -> FusionOutcome {
        match event {
            CompassEvent::Gravity(sample) => {
                if !self.gravity.is_initialised() {
                    log_debug!("gravity filter initialised");
                }
                self.gravity.update(self.settings.axes_alignment.apply(sample));
                self.fuse()
            }
            CompassEvent::Magnetic(sample) => {
                if !self.magnetic.is_initialised() {
                    log_debug!("magnetic filter initialised");
                }
                self.magnetic.update(self.settings.axes_alignment.apply(sample));
                self.fuse()
            }
            CompassEvent::Declination(model) => {
                log_info!(
                    "declination model set to {} deg",
                    model.declination_degrees()
                );
                self.declination = Some(model);
                FusionOutcome::DeclinationChanged
            }
        }
    }

    /// Feed an accelerometer sample
    pub fn on_gravity(&mut self, sample: Vector3<f32>) -> FusionOutcome {
        self.handle(CompassEvent::Gravity(sample))
    }

    /// Feed a magnetometer sample
    pub fn on_magnetic(&mut self, sample: Vector3<f32>) -> FusionOutcome {
        self.handle(CompassEvent::Magnetic(sample))
    }

    /// Replace the declination model. The bearing is not recomputed until the
    /// next sensor sample.
    pub fn set_declination_model(&mut self, model: DeclinationModel) {
        self.handle(CompassEvent::Declination(model));
    }

    /// Derive and install a declination model for a location fix
    pub fn update_location<M: GeomagneticModel + ?Sized>(&mut self, model: &M, fix: &LocationFix) {
        self.set_declination_model(DeclinationModel::from_fix(model, fix));
    }

    /// Latest bearing in [0, 360) degrees, or `None` before the first fusion
    pub fn bearing(&self) -> Option<f32> {
        self.bearing.map(|(bearing, _)| bearing)
    }

    /// North that [`Compass::bearing`] is measured from
    pub fn bearing_reference(&self) -> Option<North> {
        self.bearing.map(|(_, reference)| reference)
    }

    /// Latest bearing against magnetic north, regardless of declination
    pub fn magnetic_bearing(&self) -> Option<f32> {
        self.magnetic_bearing
    }

    /// Latest azimuth, pitch and roll
    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    /// Installed declination model
    pub fn declination_model(&self) -> Option<DeclinationModel> {
        self.declination
    }

    /// Filtered gravity vector in device axes
    pub fn filtered_gravity(&self) -> Option<Vector3<f32>> {
        self.gravity.state()
    }

    /// Filtered magnetic vector in device axes
    pub fn filtered_magnetic(&self) -> Option<Vector3<f32>> {
        self.magnetic.state()
    }

    /// Number of fusions rejected as degenerate
    pub fn rejected_count(&self) -> u32 {
        self.rejected
    }

    /// Current settings
    pub fn settings(&self) -> CompassSettings {
        self.settings
    }

    /// Replace settings; filter state and bearing are kept
    pub fn set_settings(&mut self, settings: CompassSettings) {
        self.settings = settings;
    }

    /// Borrow the observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutably borrow the observer
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    fn fuse(&mut self) -> FusionOutcome {
        let (Some(gravity), Some(magnetic)) = (self.gravity.state(), self.magnetic.state()) else {
            return FusionOutcome::AwaitingInput;
        };

        let rotation = match rotation_matrix(gravity, magnetic, &self.settings) {
            Ok(rotation) => rotation,
            Err(error) => {
                self.rejected = self.rejected.wrapping_add(1);
                match error {
                    CompassError::DegenerateOrientation(cause) => {
                        log_warn!("orientation rejected: {}", cause);
                    }
                }
                return FusionOutcome::Rejected(error);
            }
        };

        let angles = orientation(&rotation);
        let magnetic_bearing = angles.azimuth_degrees();

        let (bearing, reference) = match self.declination {
            Some(model) => (model.correct(magnetic_bearing), North::True),
            None => (magnetic_bearing, North::Magnetic),
        };

        self.orientation = Some(angles);
        self.magnetic_bearing = Some(magnetic_bearing);
        self.bearing = Some((bearing, reference));
        self.observer.on_bearing(bearing, reference);

        log_trace!("bearing {}", bearing);
        FusionOutcome::Updated { bearing, reference }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::AxesAlignment;
    use crate::error::DegenerateCause;

    const FLAT_GRAVITY: Vector3<f32> = Vector3::new(0.0, 0.0, 9.8);
    const NORTH_FIELD: Vector3<f32> = Vector3::new(0.0, 30.0, -40.0);
    const EAST_FIELD: Vector3<f32> = Vector3::new(-30.0, 0.0, -40.0);

    fn angle_difference(a: f32, b: f32) -> f32 {
        ((a - b + 540.0) % 360.0 - 180.0).abs()
    }

    #[test]
    fn test_new_compass() {
        let compass = Compass::new();
        assert_eq!(compass.bearing(), None);
        assert_eq!(compass.filtered_gravity(), None);
        assert_eq!(compass.filtered_magnetic(), None);
        assert_eq!(compass.declination_model(), None);
        assert_eq!(compass.rejected_count(), 0);
    }

    #[test]
    fn test_awaits_both_sensors() {
        let mut compass = Compass::new();
        assert_eq!(compass.on_gravity(FLAT_GRAVITY), FusionOutcome::AwaitingInput);
        assert_eq!(compass.on_gravity(FLAT_GRAVITY), FusionOutcome::AwaitingInput);
        assert_eq!(compass.bearing(), None);

        let outcome = compass.on_magnetic(NORTH_FIELD);
        assert!(matches!(
            outcome,
            FusionOutcome::Updated {
                reference: North::Magnetic,
                ..
            }
        ));
    }

    #[test]
    fn test_facing_north_then_declination() {
        let mut compass = Compass::new();
        compass.on_gravity(FLAT_GRAVITY);
        compass.on_magnetic(NORTH_FIELD);
        let bearing = compass.bearing().unwrap();
        assert!(angle_difference(bearing, 0.0) < 0.5);
        assert!(bearing.is_sign_positive(), "bearing {}", bearing);
        assert_eq!(compass.bearing_reference(), Some(North::Magnetic));

        compass.set_declination_model(DeclinationModel::new(5.0));
        // Not recomputed until the next sample
        assert!(angle_difference(compass.bearing().unwrap(), 0.0) < 0.5);

        compass.on_gravity(FLAT_GRAVITY);
        assert!((compass.bearing().unwrap() - 355.0).abs() < 0.5);
        assert_eq!(compass.bearing_reference(), Some(North::True));
        assert!(angle_difference(compass.magnetic_bearing().unwrap(), 0.0) < 0.5);
    }

    #[test]
    fn test_declination_event_outcome() {
        let mut compass = Compass::new();
        let outcome = compass.handle(CompassEvent::Declination(DeclinationModel::new(-3.0)));
        assert_eq!(outcome, FusionOutcome::DeclinationChanged);
        assert_eq!(compass.declination_model(), Some(DeclinationModel::new(-3.0)));
        assert_eq!(compass.bearing(), None);
    }

    #[test]
    fn test_degenerate_keeps_previous_bearing() {
        let mut compass = Compass::new();
        compass.on_gravity(FLAT_GRAVITY);
        compass.on_magnetic(EAST_FIELD);
        let before = compass.bearing().unwrap();
        assert!(angle_difference(before, 90.0) < 0.5, "bearing {}", before);

        let mut degenerate = Compass::new();
        assert_eq!(degenerate.on_gravity(Vector3::zeros()), FusionOutcome::AwaitingInput);
        assert_eq!(
            degenerate.on_magnetic(NORTH_FIELD),
            FusionOutcome::Rejected(CompassError::DegenerateOrientation(DegenerateCause::FreeFall))
        );
        assert_eq!(degenerate.bearing(), None);
        assert_eq!(degenerate.rejected_count(), 1);

        // Field swung parallel to gravity: filtered horizontal component collapses
        let mut previous = compass.bearing();
        let mut rejected = false;
        for _ in 0..200 {
            if let FusionOutcome::Rejected(_) = compass.on_magnetic(Vector3::new(0.0, 0.0, -50.0)) {
                rejected = true;
                assert_eq!(compass.bearing(), previous);
            }
            previous = compass.bearing();
        }
        assert!(rejected);
        assert!(compass.rejected_count() > 0);
        assert!(previous.is_some());
    }

    #[test]
    fn test_overflowing_field_keeps_previous_bearing() {
        let mut compass = Compass::new();
        compass.on_gravity(FLAT_GRAVITY);
        compass.on_magnetic(EAST_FIELD);
        let before = compass.bearing();
        assert!(before.is_some());

        let outcome = compass.on_magnetic(Vector3::new(0.0, 1e38, 0.0));
        assert!(matches!(outcome, FusionOutcome::Rejected(_)), "outcome {:?}", outcome);
        assert_eq!(compass.bearing(), before);
        assert_eq!(compass.rejected_count(), 1);

        let mut compass = Compass::new();
        compass.on_gravity(FLAT_GRAVITY);
        compass.on_magnetic(NORTH_FIELD);
        let before = compass.bearing();

        let outcome = compass.on_gravity(Vector3::new(0.0, 0.0, 1e20));
        assert_eq!(
            outcome,
            FusionOutcome::Rejected(CompassError::DegenerateOrientation(DegenerateCause::Overflow))
        );
        assert_eq!(compass.bearing(), before);
    }

    #[test]
    fn test_filtering_smooths_step() {
        let mut compass = Compass::new();
        compass.on_gravity(FLAT_GRAVITY);
        compass.on_magnetic(NORTH_FIELD);

        // Step to east: the filtered field turns gradually
        compass.on_magnetic(EAST_FIELD);
        let first = compass.bearing().unwrap();
        assert!(first > 5.0 && first < 85.0, "first step bearing {}", first);

        for _ in 0..80 {
            compass.on_magnetic(EAST_FIELD);
        }
        assert!(angle_difference(compass.bearing().unwrap(), 90.0) < 0.5);
    }

    #[test]
    fn test_filtered_state_matches_formula() {
        let mut compass = Compass::new();
        compass.on_gravity(Vector3::new(1.0, 0.0, 0.0));
        compass.on_gravity(Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(compass.filtered_gravity(), Some(Vector3::new(0.75, 0.25, 0.0)));
    }

    #[test]
    fn test_axes_alignment_applied_before_filtering() {
        let settings = CompassSettings {
            axes_alignment: AxesAlignment::NxNyPz,
            ..Default::default()
        };
        let mut compass = Compass::with_settings(settings);
        compass.on_gravity(FLAT_GRAVITY);
        compass.on_magnetic(NORTH_FIELD);

        // Sensor mounted rotated 180° about z: sensor north is device south
        assert_eq!(compass.filtered_magnetic(), Some(Vector3::new(0.0, -30.0, -40.0)));
        assert!(angle_difference(compass.bearing().unwrap(), 180.0) < 0.5);
    }

    #[test]
    fn test_observer_notified() {
        let mut updates = 0u32;
        let mut last = None;
        {
            let mut compass = Compass::with_observer(CompassSettings::default(), |bearing: f32, reference: North| {
                updates += 1;
                last = Some((bearing, reference));
            });
            compass.on_gravity(FLAT_GRAVITY);
            compass.on_magnetic(EAST_FIELD);
            compass.on_magnetic(EAST_FIELD);
            compass.set_declination_model(DeclinationModel::new(10.0));
        }

        assert_eq!(updates, 2);
        let (bearing, reference) = last.unwrap();
        assert!(angle_difference(bearing, 90.0) < 0.5);
        assert_eq!(reference, North::Magnetic);
    }

    #[test]
    fn test_update_location() {
        let mut compass = Compass::new();
        let fixed = |_: &LocationFix| -> f32 { -7.0 };
        let fix = LocationFix {
            latitude: 47.6,
            longitude: -122.3,
            altitude: 50.0,
            timestamp_ms: 0,
        };

        compass.update_location(&fixed, &fix);
        assert_eq!(compass.declination_model(), Some(DeclinationModel::new(-7.0)));

        compass.on_gravity(FLAT_GRAVITY);
        compass.on_magnetic(NORTH_FIELD);
        assert!(angle_difference(compass.bearing().unwrap(), 7.0) < 0.5);
    }
}
