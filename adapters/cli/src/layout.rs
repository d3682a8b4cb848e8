//! Town layout files.
//!
//! A layout file is TOML describing the player start, the goal, spawn points
//! and wall boxes, with an optional `[session]` table:
//!
//! ```toml
//! player_start = [0.0, 0.0, -50.0]
//! goal = [0.0, 0.0, 50.0]
//! spawn_points = [[-45.0, 0.0, -45.0], [45.0, 0.0, 45.0]]
//!
//! [session]
//! difficulty = "hard"
//! seed = 7
//!
//! [[walls]]
//! min = [-20.0, 0.0, -25.0]
//! max = [-8.0, 5.0, -15.0]
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use sundown_core::{Difficulty, Layout};
use thiserror::Error;

/// Errors raised while loading a layout file.
#[derive(Debug, Error)]
pub(crate) enum LayoutError {
    /// The file could not be read.
    #[error("could not read layout file {}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid layout TOML.
    #[error("could not parse layout file")]
    Parse(#[from] toml::de::Error),
    /// The player would start inside a wall.
    #[error("player start lies inside wall {wall}")]
    StartInsideWall {
        /// Index of the offending wall.
        wall: usize,
    },
    /// A spawn point lies inside a wall.
    #[error("spawn point {point} lies inside wall {wall}")]
    SpawnInsideWall {
        /// Index of the offending spawn point.
        point: usize,
        /// Index of the offending wall.
        wall: usize,
    },
}

/// Optional session settings carried by a layout file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct SessionSettings {
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) seed: Option<u64>,
}

/// Parsed layout file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct LayoutFile {
    #[serde(default)]
    pub(crate) session: SessionSettings,
    #[serde(flatten)]
    pub(crate) layout: Layout,
}

/// Reads and validates a layout file from disk.
pub(crate) fn load(path: &Path) -> Result<LayoutFile, LayoutError> {
    let contents = fs::read_to_string(path).map_err(|source| LayoutError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents)
}

/// Parses and validates layout TOML.
pub(crate) fn parse(contents: &str) -> Result<LayoutFile, LayoutError> {
    let file: LayoutFile = toml::from_str(contents)?;
    validate(&file.layout)?;
    Ok(file)
}

fn validate(layout: &Layout) -> Result<(), LayoutError> {
    for (wall, bounds) in layout.walls.iter().enumerate() {
        if bounds.contains(layout.player_start) {
            return Err(LayoutError::StartInsideWall { wall });
        }
        if let Some(point) = layout
            .spawn_points
            .iter()
            .position(|spawn| bounds.contains(*spawn))
        {
            return Err(LayoutError::SpawnInsideWall { point, wall });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sundown_core::Vec3;

    const TOWN: &str = r#"
player_start = [0.0, 0.0, -50.0]
goal = [0.0, 0.0, 50.0]
spawn_points = [[-45.0, 0.0, -45.0], [45.0, 0.0, 45.0]]

[session]
difficulty = "hard"
seed = 7

[[walls]]
min = [-20.0, 0.0, -25.0]
max = [-8.0, 5.0, -15.0]
"#;

    #[test]
    fn parses_layout_with_session_settings() {
        let file = parse(TOWN).expect("layout parses");

        assert_eq!(file.layout.player_start, Vec3::new(0.0, 0.0, -50.0));
        assert_eq!(file.layout.goal, Some(Vec3::new(0.0, 0.0, 50.0)));
        assert_eq!(file.layout.spawn_points.len(), 2);
        assert_eq!(file.layout.walls.len(), 1);
        assert_eq!(
            file.session,
            SessionSettings {
                difficulty: Some(Difficulty::Hard),
                seed: Some(7),
            }
        );
    }

    #[test]
    fn optional_sections_default_to_empty() {
        let file = parse("player_start = [1.0, 0.0, 2.0]").expect("layout parses");

        assert_eq!(file.session, SessionSettings::default());
        assert!(file.layout.goal.is_none());
        assert!(file.layout.spawn_points.is_empty());
        assert!(file.layout.walls.is_empty());
    }

    #[test]
    fn rejects_spawn_points_inside_walls() {
        let contents = r#"
player_start = [0.0, 0.0, 0.0]
spawn_points = [[30.0, 0.0, 30.0], [10.0, 1.0, 10.0]]

[[walls]]
min = [5.0, 0.0, 5.0]
max = [15.0, 4.0, 15.0]
"#;

        let error = parse(contents).expect_err("spawn inside wall is rejected");

        assert!(matches!(
            error,
            LayoutError::SpawnInsideWall { point: 1, wall: 0 }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let error = parse("player_start = \"north\"").expect_err("malformed layout is rejected");

        assert!(matches!(error, LayoutError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = Path::new("does/not/exist.toml");

        let error = load(path).expect_err("missing file is rejected");

        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
