//! Recorded track files.
//!
//! One `latitude,longitude` pair per line, in degrees. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! # morning walk
//! 37.0000,-122.0000
//! 37.0100,-122.0000
//! ```

use std::path::{Path, PathBuf};

use geofence::coord::Coordinate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: {reason}")]
    Line { line: usize, reason: String },

    #[error("Track contains no samples")]
    Empty,
}

/// Load a track file from disk.
pub fn load_track(path: &Path) -> Result<Vec<Coordinate>, TrackError> {
    let text = std::fs::read_to_string(path).map_err(|source| TrackError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_track(&text)
}

/// Parse track text. Fails on the first malformed line.
pub fn parse_track(text: &str) -> Result<Vec<Coordinate>, TrackError> {
    let mut track = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        track.push(parse_line(line).map_err(|reason| TrackError::Line {
            line: index + 1,
            reason,
        })?);
    }

    if track.is_empty() {
        return Err(TrackError::Empty);
    }
    Ok(track)
}

fn parse_line(line: &str) -> Result<Coordinate, String> {
    let mut fields = line.split(',').map(str::trim);
    let (Some(lat), Some(lon), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(format!("expected 'latitude,longitude', got '{}'", line));
    };

    let lat: f64 = lat
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat))?;
    let lon: f64 = lon
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon))?;

    Coordinate::new(lat, lon).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# header\n\n37.0,-122.0\n  37.01 , -122.0  \n# trailing\n";
        let track = parse_track(text).unwrap();

        assert_eq!(track.len(), 2);
        assert_eq!(track[1].latitude(), 37.01);
        assert_eq!(track[1].longitude(), -122.0);
    }

    #[test]
    fn test_reports_line_number() {
        let err = parse_track("37.0,-122.0\n\nnorth,east\n").unwrap_err();
        match err {
            TrackError::Line { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("latitude"));
            }
            other => panic!("Unexpected error: {}", other),
        }
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        assert!(matches!(
            parse_track("37.0\n"),
            Err(TrackError::Line { line: 1, .. })
        ));
        assert!(matches!(
            parse_track("37.0,-122.0,15\n"),
            Err(TrackError::Line { line: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = parse_track("91.0,0.0\n").unwrap_err();
        assert!(err.to_string().contains("Invalid latitude"));
    }

    #[test]
    fn test_only_comments_is_empty() {
        assert!(matches!(parse_track("# nothing\n"), Err(TrackError::Empty)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "37.0,-122.0").unwrap();
        writeln!(file, "37.01,-122.0").unwrap();

        assert_eq!(load_track(file.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_track(Path::new("/nonexistent/track.csv")).unwrap_err();
        assert!(matches!(err, TrackError::Read { .. }));
    }
}
