//! Scripted walk demonstration
//!
//! Walks the built-in Tel Aviv path with a jittery scripted provider while the
//! tracking frame follows the true path, and prints the notifications a
//! renderer would receive.

use geoscene::algorithms::{geodesy, path::path_length};
use geoscene::{
    path_segments, Anchor, Annotation, GeoPoint, MockLocationSet, SceneEvent, SceneSession, ScriptedProvider,
    SessionConfig, TrackingPose, TrackingVector,
};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Geo Scene - Mock Walk Demo ===\n");

    let location_set = MockLocationSet::TelAvivOfficeToAzrieli;
    let origin = location_set.start_location();
    let positions: Vec<TrackingVector> = location_set
        .path_points()
        .iter()
        .map(|point| geodesy::translation(&origin, point).to_tracking())
        .collect();

    demo_path_geometry(&positions);
    demo_session(location_set, &positions)?;

    println!("Mock walk demo completed successfully!");
    Ok(())
}

fn demo_path_geometry(positions: &[TrackingVector]) {
    println!("--- Path Geometry ---");

    let mut points = vec![TrackingVector::zeros()];
    points.extend_from_slice(positions);

    for (index, segment) in path_segments(&points).iter().enumerate() {
        println!(
            "Segment {}: {:.1} m, midpoint ({:.1}, {:.1})",
            index + 1,
            segment.length,
            segment.midpoint.x,
            segment.midpoint.z
        );
    }
    println!("Total walk: {:.1} m\n", path_length(&points));
}

fn demo_session(location_set: MockLocationSet, positions: &[TrackingVector]) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Scene Session ---");

    let provider = ScriptedProvider::new(location_set).with_jitter(4.0, 42);
    let config = SessionConfig::default();
    let step_ms = config.update_interval_ms;
    let mut session = SceneSession::new(config, Box::new(provider))?;

    session.register_event_callback(Box::new(|event| match event {
        SceneEvent::EstimateAdded { location, .. } => {
            println!("  estimate added (±{:.0} m)", location.horizontal_accuracy)
        }
        SceneEvent::EstimateRemoved { position, .. } => {
            println!("  estimate dropped at ({:.1}, {:.1})", position.x, position.z)
        }
        SceneEvent::AnchorConfirmed { id, location } => println!(
            "  {} confirmed at lat={:.7} lon={:.7}",
            id, location.latitude, location.longitude
        ),
        SceneEvent::AnchorPoseUpdated(update) => println!(
            "  {} scale={:.3} distance={:.1} m",
            update.id, update.scale, update.distance
        ),
        SceneEvent::HeadingUpdated { heading, accuracy } => {
            println!("  heading {:.0}° (±{:.0}°)", heading, accuracy)
        }
        SceneEvent::StateChanged { running } => println!("  running: {}", running),
    }));

    session.run()?;
    session.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));

    let tagged = session.tag_current_location(Anchor::unplaced());
    println!("Tagged start: {:?}", tagged.map(|id| id.to_string()));

    let tower = Anchor::confirmed(GeoPoint::new(32.0744, 34.7920, 0.0)).with_annotation(Annotation::new(false));
    println!("Placed Azrieli: {:?}", session.add_confirmed(tower).map(|id| id.to_string()));

    let start = Instant::now();
    for (index, position) in positions.iter().enumerate() {
        println!("Step {}:", index + 1);
        let now = start + Duration::from_millis((index as u64 + 1) * step_ms);
        session.step(Some(TrackingPose::at(*position)), now);
    }

    if let Some(location) = session.current_location() {
        println!(
            "Fused location: lat={:.7}, lon={:.7} (±{:.1} m)",
            location.latitude, location.longitude, location.horizontal_accuracy
        );
    }

    for (id, anchor) in session.anchors() {
        println!(
            "{}: confirmed={} position=({:.1}, {:.1}, {:.1})",
            id,
            anchor.confirmed_location,
            anchor.position().x,
            anchor.position().y,
            anchor.position().z
        );
    }

    session.pause();
    println!();
    Ok(())
}
