use geoscene::algorithms::geodesy;
use geoscene::{
    channel, Anchor, Annotation, GeoPoint, HeadingReading, MockLocationSet, SceneSession, ScriptedProvider,
    SessionConfig, TickSummary, TrackingPose, TrackingVector,
};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Azrieli Center, the destination of the built-in walk
const AZRIELI: (f64, f64) = (32.0744, 34.7920);

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    config: SessionConfig,
    steps: Vec<ScenarioStep>,
}

#[derive(Debug, Deserialize)]
struct ScenarioStep {
    /// Simulated time of the step (milliseconds since start)
    at_ms: u64,
    #[serde(flatten)]
    event: ScenarioEvent,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ScenarioEvent {
    Frame {
        position: [f64; 3],
    },
    Fix {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        altitude: f64,
        #[serde(default = "default_accuracy")]
        accuracy: f64,
    },
    Heading {
        heading: f64,
        #[serde(default)]
        accuracy: f64,
    },
    Tag {
        #[serde(default)]
        annotation: bool,
    },
    Place {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        altitude: f64,
        #[serde(default)]
        annotation: bool,
    },
    RemoveAll,
}

fn default_accuracy() -> f64 {
    5.0
}

fn with_annotation(anchor: Anchor, annotation: bool) -> Anchor {
    if annotation {
        anchor.with_annotation(Annotation::new(false))
    } else {
        anchor
    }
}

fn print_tick(at_ms: u64, summary: &TickSummary) {
    for id in &summary.confirmed {
        println!("[{:>6} ms] {} confirmed", at_ms, id);
    }
    for update in &summary.updates {
        println!(
            "[{:>6} ms] {} at ({:.2}, {:.2}, {:.2}) scale={:.3} distance={:.1}m",
            at_ms,
            update.id,
            update.position.x,
            update.position.y,
            update.position.z,
            update.scale,
            update.distance
        );
    }
}

fn print_location(session: &SceneSession) {
    match session.current_location() {
        Some(location) => println!(
            "Current location: lat={:.7}, lon={:.7} (±{:.1} m)",
            location.latitude, location.longitude, location.horizontal_accuracy
        ),
        None => println!("Current location: unknown"),
    }
}

fn replay(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json_data = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&json_data)?;

    let (feed, provider) = channel();
    let mut session = SceneSession::new(scenario.config, Box::new(provider))?;
    session.run()?;

    let start = Instant::now();
    for step in &scenario.steps {
        match step.event {
            ScenarioEvent::Frame { position } => {
                let position = TrackingVector::new(position[0], position[1], position[2]);
                session.on_tracking_frame(TrackingPose::at(position));
            }
            ScenarioEvent::Fix {
                latitude,
                longitude,
                altitude,
                accuracy,
            } => {
                let fix = GeoPoint::new(latitude, longitude, altitude)
                    .with_accuracy(accuracy, accuracy)
                    .with_timestamp(step.at_ms);
                feed.push_fix(fix)?;
            }
            ScenarioEvent::Heading { heading, accuracy } => {
                feed.push_heading(HeadingReading::new(heading, heading, accuracy))?;
            }
            ScenarioEvent::Tag { annotation } => {
                match session.tag_current_location(with_annotation(Anchor::unplaced(), annotation)) {
                    Some(id) => println!("[{:>6} ms] tagged {}", step.at_ms, id),
                    None => println!("[{:>6} ms] cannot tag: no pose or location yet", step.at_ms),
                }
            }
            ScenarioEvent::Place {
                latitude,
                longitude,
                altitude,
                annotation,
            } => {
                let anchor = Anchor::confirmed(GeoPoint::new(latitude, longitude, altitude));
                match session.add_confirmed(with_annotation(anchor, annotation)) {
                    Some(id) => println!("[{:>6} ms] placed {}", step.at_ms, id),
                    None => println!("[{:>6} ms] cannot place anchor", step.at_ms),
                }
            }
            ScenarioEvent::RemoveAll => {
                let removed = session.remove_all_anchors();
                println!("[{:>6} ms] removed {} anchors", step.at_ms, removed.len());
            }
        }

        if let Some(summary) = session.step(None, start + Duration::from_millis(step.at_ms)) {
            print_tick(step.at_ms, &summary);
        }
    }

    print_location(&session);
    Ok(())
}

fn mock_walk() -> Result<(), Box<dyn std::error::Error>> {
    let location_set = MockLocationSet::TelAvivOfficeToAzrieli;
    let origin = location_set.start_location();
    let provider = ScriptedProvider::new(location_set);
    let config = SessionConfig::default();
    let step_ms = config.update_interval_ms;
    let mut session = SceneSession::new(config, Box::new(provider))?;
    session.run()?;

    // Bootstraps the first estimate at the start location
    session.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));

    if let Some(id) = session.tag_current_location(Anchor::unplaced()) {
        println!("Tagged start as {}", id);
    }
    let azrieli = Anchor::confirmed(GeoPoint::new(AZRIELI.0, AZRIELI.1, 0.0))
        .with_annotation(Annotation::new(false));
    if let Some(id) = session.add_confirmed(azrieli) {
        println!("Placed Azrieli as {}", id);
    }

    // Tracking follows the scripted path exactly
    let start = Instant::now();
    for (index, point) in location_set.path_points().iter().enumerate() {
        let position = geodesy::translation(&origin, point).to_tracking();
        let at_ms = (index as u64 + 1) * step_ms;

        if let Some(summary) = session.step(Some(TrackingPose::at(position)), start + Duration::from_millis(at_ms)) {
            print_tick(at_ms, &summary);
        }
    }

    print_location(&session);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("geoscene", |s| s.as_str());

    if args.len() == 2 && args[1] == "--mock-walk" {
        return mock_walk();
    }

    if args.len() != 2 {
        eprintln!("Usage: {} <scenario.json>", program);
        eprintln!("   or: {} --mock-walk", program);
        return Err("Invalid arguments".into());
    }

    replay(&args[1])
}
