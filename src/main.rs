//! Example usage of the gmphd-fusion library
//!
//! Follows one constant velocity target through a short scan sequence with
//! missed detections and a clutter return, records the accepted estimates on
//! a track and prints the resulting timeline.
//!
//! Run with `cargo run --features demo`; set `RUST_LOG=trace` to see the
//! filter internals.

use gmphd_fusion::prelude::*;

/// Squared Mahalanobis gate (chi-squared, 2 dof, ~99%)
const GATE: f64 = 9.21;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let filter = KalmanFilter::new();
    let motion = ConstantVelocity2D::new(0.5)?;
    let sensor = LinearCoordinateMeasurementModel::position_2d(2.0)?;

    // Initial state: [x, y, vx, vy]
    let mut state = StateEstimate::with_diagonal_covariance(
        StateVector::from_array([0.0, 0.0, 2.0, 1.0]),
        &nalgebra::vector![25.0, 25.0, 4.0, 4.0],
    );

    // Scans per time step; empty scans are missed detections
    let scans: [&[[f64; 2]]; 8] = [
        &[[0.5, -0.3]],
        &[[2.2, 1.1], [60.0, -40.0]],
        &[],
        &[[6.1, 3.2]],
        &[],
        &[],
        &[[12.3, 5.8]],
        &[[13.9, 7.1]],
    ];

    let start_time = 100;
    let mut track = Track::new(1, start_time);
    let dt = 1.0;

    for (step, scan) in scans.iter().enumerate() {
        let time = start_time + step as u32;
        if step > 0 {
            state = filter.predict(&state, &motion, dt)?;
        }

        let z_pred = filter.predict_measurement(&state, &sensor)?;

        // Nearest measurement inside the gate
        let mut best: Option<(f64, Measurement<f64, 2>)> = None;
        for &raw in scan.iter() {
            let z = Measurement::from_array(raw);
            let d2 = filter.mahalanobis_distance_squared(&z_pred, &z)?;
            if d2 < GATE && best.map_or(true, |(d, _)| d2 < d) {
                best = Some((d2, z));
            }
        }

        match best {
            Some((d2, z)) => {
                let likelihood = filter.measurement_likelihood(&z_pred, &z)?;
                state = filter.update(&state, &z, &sensor, MeasurementPrediction::Reuse(&z_pred))?;
                track.add_estimate(state.mean, time)?;
                log::info!(
                    "t={} detection d2={:.2} g={:.2e} pos=({:.1}, {:.1}) trace(P)={:.2}",
                    time,
                    d2,
                    likelihood,
                    state.mean[0],
                    state.mean[1],
                    state.uncertainty()
                );
            }
            None => {
                log::info!(
                    "t={} missed, coasting pos=({:.1}, {:.1}) trace(P)={:.2}",
                    time,
                    state.mean[0],
                    state.mean[1],
                    state.uncertainty()
                );
            }
        }
    }

    track.finish(start_time + scans.len() as u32)?;

    println!(
        "Track {}: {} slots, {} detections",
        track.label(),
        track.len(),
        track.detection_count()
    );
    for (offset, slot) in track.estimates().iter().enumerate() {
        let time = track.start_time() + offset as u32;
        match slot {
            Some(estimate) => println!(
                "  t={}: ({:.2}, {:.2}, {:.2}, {:.2})",
                time, estimate[0], estimate[1], estimate[2], estimate[3]
            ),
            None => println!("  t={}: -", time),
        }
    }

    if let Some(mean) = track.mean_estimate() {
        println!("Mean estimate: ({:.2}, {:.2})", mean[0], mean[1]);
    }

    Ok(())
}
