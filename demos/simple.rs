use fusion_compass::{CardinalDirection, Compass, LocationFix, North, needle_rotation};
use nalgebra::Vector3;

fn main() {
    let mut compass = Compass::new();

    // Location services delivered a fix: Hamilton, Ontario
    let fix = LocationFix {
        latitude: 43.26,
        longitude: -79.92,
        altitude: 85.0,
        timestamp_ms: 1_782_864_000_000,
    };

    // Stand-in for the platform's World Magnetic Model lookup
    let geomagnetic_field = |_: &LocationFix| -> f32 { -9.9 };
    compass.update_location(&geomagnetic_field, &fix);

    for _ in 0..10 {
        // this loop should repeat each time new sensor data is available
        let accelerometer = Vector3::new(0.0, 0.0, 9.81); // replace this with actual accelerometer data in m/s²
        let magnetometer = Vector3::new(-14.0, 14.0, -40.0); // replace this with actual magnetometer data in µT

        compass.on_gravity(accelerometer);
        compass.on_magnetic(magnetometer);

        if let (Some(bearing), Some(reference)) = (compass.bearing(), compass.bearing_reference()) {
            println!(
                "Bearing: {:.1}° {} ({}), needle rotation {:.1}°",
                bearing,
                CardinalDirection::from_bearing(bearing).abbreviation(),
                match reference {
                    North::True => "true",
                    North::Magnetic => "magnetic",
                },
                needle_rotation(bearing)
            );
        }
    }
}
