//! Exponential low-pass filtering of raw sensor vectors
//!
//! Accelerometer and magnetometer readings are smoothed independently before
//! they are fused into a heading. The filter is a single-pole IIR:
//!
//! ```text
//! output = previous + ALPHA * (sample - previous)
//! ```
//!
//! Samples are assumed finite. NaN or infinite components propagate into the
//! filter state unchanged; they are not clamped.

use nalgebra::Vector3;

/// Smoothing factor shared by both sensor types.
///
/// Larger values react faster but pass more noise.
pub const ALPHA: f32 = 0.25;

/// Apply one low-pass step to `sample` given the previous filter output.
///
/// With no previous output the sample passes through unchanged, which also
/// seeds the state for subsequent calls.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use fusion_compass::filter::low_pass;
///
/// let first = low_pass(Vector3::new(1.0, 0.0, 0.0), None);
/// assert_eq!(first, Vector3::new(1.0, 0.0, 0.0));
///
/// let second = low_pass(Vector3::new(0.0, 1.0, 0.0), Some(first));
/// assert_eq!(second, Vector3::new(0.75, 0.25, 0.0));
/// ```
#[inline]
pub fn low_pass(sample: Vector3<f32>, previous: Option<Vector3<f32>>) -> Vector3<f32> {
    match previous {
        None => sample,
        Some(previous) => previous + (sample - previous) * ALPHA,
    }
}

/// Low-pass filter that owns its state.
///
/// The state is `None` until the first sample arrives and is only ever
/// overwritten by the filter afterwards, unless [`LowPassFilter::reset`] is
/// called explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LowPassFilter {
    state: Option<Vector3<f32>>,
}

impl LowPassFilter {
    /// Create an empty filter
    pub const fn new() -> Self {
        Self { state: None }
    }

    /// Feed a sample and return the new filtered vector
    pub fn update(&mut self, sample: Vector3<f32>) -> Vector3<f32> {
        let filtered = low_pass(sample, self.state);
        self.state = Some(filtered);
        filtered
    }

    /// Current filtered vector, if any sample has been seen
    pub fn state(&self) -> Option<Vector3<f32>> {
        self.state
    }

    /// Whether the filter has been seeded
    pub fn is_initialised(&self) -> bool {
        self.state.is_some()
    }

    /// Forget the filter state so the next sample passes through unchanged
    pub fn reset(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_first_sample_passes_through() {
        let sample = Vector3::new(0.3, -9.7, 1.2);
        assert_eq!(low_pass(sample, None), sample);
    }

    #[test]
    fn test_step_formula() {
        let previous = Vector3::new(4.0, -8.0, 2.0);
        let sample = Vector3::new(0.0, 0.0, 10.0);
        let filtered = low_pass(sample, Some(previous));

        // previous + 0.25 * (sample - previous)
        let expected = Vector3::new(3.0, -6.0, 4.0);
        assert!((filtered - expected).magnitude() < EPSILON);
    }

    #[test]
    fn test_constant_input_is_fixed_point() {
        let sample = Vector3::new(1.5, 2.5, -3.5);
        let mut filtered = sample;
        for _ in 0..100 {
            filtered = low_pass(sample, Some(filtered));
        }
        assert_eq!(filtered, sample);
    }

    #[test]
    fn test_stateful_filter_sequence() {
        let mut filter = LowPassFilter::new();
        assert!(!filter.is_initialised());

        assert_eq!(filter.update(Vector3::new(1.0, 0.0, 0.0)), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(filter.update(Vector3::new(0.0, 1.0, 0.0)), Vector3::new(0.75, 0.25, 0.0));
        assert_eq!(filter.state(), Some(Vector3::new(0.75, 0.25, 0.0)));
    }

    #[test]
    fn test_converges_towards_step_input() {
        let mut filter = LowPassFilter::new();
        filter.update(Vector3::zeros());

        let target = Vector3::new(0.0, 0.0, 9.8);
        for _ in 0..60 {
            filter.update(target);
        }

        let state = filter.state().unwrap();
        assert!((state - target).magnitude() < 1e-3);
    }

    #[test]
    fn test_reset() {
        let mut filter = LowPassFilter::new();
        filter.update(Vector3::new(1.0, 1.0, 1.0));
        filter.reset();

        assert_eq!(filter.state(), None);
        let sample = Vector3::new(-2.0, 0.0, 5.0);
        assert_eq!(filter.update(sample), sample);
    }
}
