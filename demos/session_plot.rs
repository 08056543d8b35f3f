//! Replays `testdata/wrist_session.csv` through the compass and plots the
//! bearing against the recorded heading.

use fusion_compass::{Compass, FusionOutcome};
use nalgebra::Vector3;
use plotters::prelude::*;
use serde::Deserialize;
use std::error::Error;

#[derive(Debug, Deserialize)]
struct SessionRow {
    #[serde(rename = "Time (s)")]
    time: f32,
    #[serde(rename = "Accelerometer X (m/s^2)")]
    accel_x: f32,
    #[serde(rename = "Accelerometer Y (m/s^2)")]
    accel_y: f32,
    #[serde(rename = "Accelerometer Z (m/s^2)")]
    accel_z: f32,
    #[serde(rename = "Magnetometer X (uT)")]
    mag_x: f32,
    #[serde(rename = "Magnetometer Y (uT)")]
    mag_y: f32,
    #[serde(rename = "Magnetometer Z (uT)")]
    mag_z: f32,
    #[serde(rename = "Heading (deg)")]
    heading: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut reader = csv::Reader::from_path("testdata/wrist_session.csv")?;
    let mut session = Vec::new();
    for result in reader.deserialize() {
        let row: SessionRow = result?;
        session.push(row);
    }

    println!("Replaying {} samples...", session.len());

    let mut compass = Compass::new();
    let mut bearings = Vec::with_capacity(session.len());
    let mut rejections = Vec::new();

    for row in &session {
        let gravity = compass.on_gravity(Vector3::new(row.accel_x, row.accel_y, row.accel_z));
        let magnetic = compass.on_magnetic(Vector3::new(row.mag_x, row.mag_y, row.mag_z));

        if matches!(gravity, FusionOutcome::Rejected(_)) || matches!(magnetic, FusionOutcome::Rejected(_)) {
            rejections.push(row.time);
        }
        bearings.push(compass.bearing().unwrap_or(0.0));
    }

    println!("{} samples rejected as degenerate", rejections.len());

    let root = BitMapBackend::new("session_plot.png", (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let end = session.last().map(|row| row.time).unwrap_or(1.0);
    let mut chart = ChartBuilder::on(&root)
        .caption("Wrist session", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f32..end, 0f32..360f32)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Degrees")
        .draw()?;

    chart
        .draw_series(PointSeries::of_element(
            session.iter().map(|row| (row.time, row.heading)),
            1,
            &BLACK,
            &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style.filled()),
        ))?
        .label("Recorded heading")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLACK));

    chart
        .draw_series(PointSeries::of_element(
            session.iter().zip(bearings.iter()).map(|(row, &bearing)| (row.time, bearing)),
            1,
            &RED,
            &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style.filled()),
        ))?
        .label("Bearing")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RED));

    for &time in &rejections {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(time, 0.0), (time, 360.0)],
            RGBColor(255, 165, 0),
        )))?;
    }

    chart.configure_series_labels().border_style(BLACK).draw()?;
    root.present()?;

    println!("✓ Plot saved to session_plot.png");
    Ok(())
}
