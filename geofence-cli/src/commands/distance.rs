//! Distance command - great-circle distance between two points.

use geofence::coord::{haversine_distance, Coordinate};

use crate::error::CliError;

/// Arguments for the distance command.
pub struct DistanceArgs {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// Run the distance command.
pub fn run(args: DistanceArgs) -> Result<(), CliError> {
    let from = Coordinate::try_from(args.from)?;
    let to = Coordinate::try_from(args.to)?;

    println!("{}", format_distance(haversine_distance(&from, &to)));
    Ok(())
}

fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.3} m ({:.2} km)", meters, meters / 1000.0)
    } else {
        format!("{:.3} m", meters)
    }
}
