//! Run configuration.
//!
//! Built in three pure steps: parse the raw document ([`RawConfig`]), fill
//! the gaps from the built-in defaults ([`BoardConfig::from_raw`]), then apply
//! command-line overrides ([`BoardConfig::with_overrides`]). A missing or
//! unreadable file is not an error; the run continues on defaults.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::family::TagFamily;
use crate::geometry::{BoardSpec, BoardSpecError};
use crate::layout::{BoardRange, BoardRangeError, Decorations};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Spec(#[from] BoardSpecError),
    #[error("board '{name}': {source}")]
    Range {
        name: String,
        #[source]
        source: BoardRangeError,
    },
}

/// Document syntax, chosen from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON, everything else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawAprilTag {
    pub family: Option<String>,
    pub grid_x: Option<u32>,
    pub grid_y: Option<u32>,
    pub tag_size_mm: Option<f64>,
    pub spacing_mm: Option<f64>,
    pub border_mm: Option<f64>,
    pub dpi: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawBoard {
    #[serde(default)]
    pub name: Option<String>,
    pub start_id: u32,
    pub end_id: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawOutput {
    pub directory: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawFeatures {
    pub corner_markers: Option<bool>,
    pub corner_marker_size_mm: Option<f64>,
    pub corner_marker_thickness_mm: Option<f64>,
    pub black_corner_squares: Option<bool>,
    pub corner_square_size_mm: Option<f64>,
}

/// Configuration document exactly as written; every key optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub apriltag: Option<RawAprilTag>,
    #[serde(default)]
    pub boards: Option<Vec<RawBoard>>,
    #[serde(default)]
    pub output: Option<RawOutput>,
    #[serde(default)]
    pub features: Option<RawFeatures>,
}

impl RawConfig {
    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::from_str(text)?,
            ConfigFormat::Json => serde_json::from_str(text)?,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, ConfigFormat::from_path(path))
    }
}

/// Marker grid settings (`apriltag` section).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AprilTagSettings {
    pub family: String,
    pub grid_x: u32,
    pub grid_y: u32,
    pub tag_size_mm: f64,
    pub spacing_mm: f64,
    pub border_mm: f64,
    pub dpi: u32,
}

impl Default for AprilTagSettings {
    fn default() -> Self {
        Self {
            family: TagFamily::Tag36h11.name().to_string(),
            grid_x: 7,
            grid_y: 7,
            tag_size_mm: 40.0,
            spacing_mm: 10.0,
            border_mm: 10.0,
            dpi: 300,
        }
    }
}

/// One board of the batch (`boards[]` entry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSettings {
    pub name: String,
    pub start_id: u32,
    pub end_id: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("apriltag_boards"),
        }
    }
}

/// Named board with a validated id range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardEntry {
    pub name: String,
    pub range: BoardRange,
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub dpi: Option<u32>,
    pub grid_x: Option<u32>,
    pub grid_y: Option<u32>,
    pub tag_size_mm: Option<f64>,
    pub spacing_mm: Option<f64>,
}

/// Fully resolved run configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub apriltag: AprilTagSettings,
    pub boards: Vec<BoardSettings>,
    pub output: OutputSettings,
    pub features: Decorations,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            apriltag: AprilTagSettings::default(),
            boards: vec![
                board("Board 1", 0, 48),
                board("Board 2", 49, 97),
                board("Board 3", 98, 146),
            ],
            output: OutputSettings::default(),
            features: Decorations::default(),
        }
    }
}

fn board(name: &str, start_id: u32, end_id: u32) -> BoardSettings {
    BoardSettings {
        name: name.to_string(),
        start_id,
        end_id,
    }
}

impl BoardConfig {
    /// Fill every key missing from `raw` with its built-in default.
    ///
    /// Sections merge key by key; a `boards` list replaces the default list.
    pub fn from_raw(raw: RawConfig) -> Self {
        let defaults = Self::default();

        let tag = raw.apriltag.unwrap_or_default();
        let d = defaults.apriltag;
        let apriltag = AprilTagSettings {
            family: tag.family.unwrap_or(d.family),
            grid_x: tag.grid_x.unwrap_or(d.grid_x),
            grid_y: tag.grid_y.unwrap_or(d.grid_y),
            tag_size_mm: tag.tag_size_mm.unwrap_or(d.tag_size_mm),
            spacing_mm: tag.spacing_mm.unwrap_or(d.spacing_mm),
            border_mm: tag.border_mm.unwrap_or(d.border_mm),
            dpi: tag.dpi.unwrap_or(d.dpi),
        };

        let boards = match raw.boards {
            Some(list) => list
                .into_iter()
                .enumerate()
                .map(|(i, b)| BoardSettings {
                    name: b.name.unwrap_or_else(|| format!("Board {}", i + 1)),
                    start_id: b.start_id,
                    end_id: b.end_id,
                })
                .collect(),
            None => defaults.boards,
        };

        let output = OutputSettings {
            directory: raw
                .output
                .and_then(|o| o.directory)
                .unwrap_or(defaults.output.directory),
        };

        let f = raw.features.unwrap_or_default();
        let d = defaults.features;
        let features = Decorations {
            corner_markers: f.corner_markers.unwrap_or(d.corner_markers),
            corner_marker_size_mm: f.corner_marker_size_mm.unwrap_or(d.corner_marker_size_mm),
            corner_marker_thickness_mm: f
                .corner_marker_thickness_mm
                .unwrap_or(d.corner_marker_thickness_mm),
            black_corner_squares: f.black_corner_squares.unwrap_or(d.black_corner_squares),
            corner_square_size_mm: f.corner_square_size_mm.unwrap_or(d.corner_square_size_mm),
        };

        Self {
            apriltag,
            boards,
            output,
            features,
        }
    }

    /// Load `path`, falling back to [`BoardConfig::default`] with a warning
    /// when the file is missing or cannot be parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match RawConfig::load(path) {
            Ok(raw) => {
                log::info!("loaded configuration from {}", path.display());
                Self::from_raw(raw)
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                log::warn!(
                    "config file '{}' not found, using defaults",
                    path.display()
                );
                Self::default()
            }
            Err(err) => {
                log::warn!(
                    "failed to load config '{}': {err}; using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Apply command-line values on top of the file values.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(dir) = &overrides.output {
            self.output.directory = dir.clone();
        }
        if let Some(dpi) = overrides.dpi {
            self.apriltag.dpi = dpi;
        }
        if let Some(grid_x) = overrides.grid_x {
            self.apriltag.grid_x = grid_x;
        }
        if let Some(grid_y) = overrides.grid_y {
            self.apriltag.grid_y = grid_y;
        }
        if let Some(tag_size) = overrides.tag_size_mm {
            self.apriltag.tag_size_mm = tag_size;
        }
        if let Some(spacing) = overrides.spacing_mm {
            self.apriltag.spacing_mm = spacing;
        }
        self
    }

    /// Resolve the family and validate the physical board description.
    pub fn board_spec(&self) -> Result<BoardSpec, ConfigError> {
        let a = &self.apriltag;
        let spec = BoardSpec {
            family: TagFamily::from_name(&a.family),
            grid_x: a.grid_x,
            grid_y: a.grid_y,
            tag_size_mm: a.tag_size_mm,
            spacing_mm: a.spacing_mm,
            border_mm: a.border_mm,
            dpi: a.dpi,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Validated boards in configuration order.
    pub fn board_entries(&self) -> Result<Vec<BoardEntry>, ConfigError> {
        self.boards
            .iter()
            .map(|b| -> Result<BoardEntry, ConfigError> {
                let range =
                    BoardRange::new(b.start_id, b.end_id).map_err(|source| ConfigError::Range {
                        name: b.name.clone(),
                        source,
                    })?;
                Ok(BoardEntry {
                    name: b.name.clone(),
                    range,
                })
            })
            .collect()
    }

    /// Write this configuration as YAML.
    pub fn write_yaml(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn partial_sections_merge_with_defaults() {
        let yaml = r#"
apriltag:
  family: 25h9
  grid_x: 5
  tag_size_mm: 30
features:
  corner_markers: false
"#;
        let cfg = BoardConfig::from_raw(RawConfig::parse(yaml, ConfigFormat::Yaml).expect("yaml"));
        assert_eq!(cfg.apriltag.family, "25h9");
        assert_eq!(cfg.apriltag.grid_x, 5);
        assert_eq!(cfg.apriltag.grid_y, 7);
        assert_relative_eq!(cfg.apriltag.tag_size_mm, 30.0);
        assert_relative_eq!(cfg.apriltag.border_mm, 10.0);
        assert_eq!(cfg.apriltag.dpi, 300);
        assert!(!cfg.features.corner_markers);
        assert!(cfg.features.black_corner_squares);
        assert_eq!(cfg.boards, BoardConfig::default().boards);
        assert_eq!(cfg.output.directory, PathBuf::from("apriltag_boards"));
    }

    #[test]
    fn boards_list_replaces_defaults() {
        let yaml = r#"
boards:
  - name: Left
    start_id: 0
    end_id: 10
  - start_id: 11
    end_id: 20
output:
  directory: out/boards
"#;
        let cfg = BoardConfig::from_raw(RawConfig::parse(yaml, ConfigFormat::Yaml).expect("yaml"));
        assert_eq!(
            cfg.boards,
            vec![board("Left", 0, 10), board("Board 2", 11, 20)]
        );
        assert_eq!(cfg.output.directory, PathBuf::from("out/boards"));
    }

    #[test]
    fn json_documents_are_accepted() {
        let json = r#"{"apriltag": {"dpi": 600}, "boards": [{"start_id": 3, "end_id": 4}]}"#;
        let raw = RawConfig::parse(json, ConfigFormat::Json).expect("json");
        let cfg = BoardConfig::from_raw(raw);
        assert_eq!(cfg.apriltag.dpi, 600);
        assert_eq!(cfg.boards, vec![board("Board 1", 3, 4)]);
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let raw = RawConfig::parse("  \n", ConfigFormat::Yaml).expect("empty");
        assert_eq!(BoardConfig::from_raw(raw), BoardConfig::default());
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Yaml);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = BoardConfig::load_or_default(dir.path().join("nope.yaml"));
        assert_eq!(cfg, BoardConfig::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "apriltag: [1, 2\n  grid_x: -3").expect("write");
        let cfg = BoardConfig::load_or_default(&path);
        assert_eq!(cfg, BoardConfig::default());
    }

    #[test]
    fn yaml_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        let mut cfg = BoardConfig::default();
        cfg.apriltag.grid_x = 3;
        cfg.boards = vec![board("Only", 5, 9)];
        cfg.write_yaml(&path).expect("write");
        assert_eq!(BoardConfig::load_or_default(&path), cfg);
    }

    #[test]
    fn overrides_take_precedence() {
        let cfg = BoardConfig::default().with_overrides(&Overrides {
            output: Some(PathBuf::from("elsewhere")),
            dpi: Some(150),
            grid_x: Some(4),
            grid_y: None,
            tag_size_mm: Some(25.0),
            spacing_mm: Some(5.0),
        });
        assert_eq!(cfg.output.directory, PathBuf::from("elsewhere"));
        assert_eq!(cfg.apriltag.dpi, 150);
        assert_eq!(cfg.apriltag.grid_x, 4);
        assert_eq!(cfg.apriltag.grid_y, 7);
        assert_relative_eq!(cfg.apriltag.tag_size_mm, 25.0);
        assert_relative_eq!(cfg.apriltag.spacing_mm, 5.0);
        assert_relative_eq!(cfg.apriltag.border_mm, 10.0);

        let untouched = BoardConfig::default().with_overrides(&Overrides::default());
        assert_eq!(untouched, BoardConfig::default());
    }

    #[test]
    fn unknown_family_resolves_to_36h11() {
        let mut cfg = BoardConfig::default();
        cfg.apriltag.family = "tag99h1".into();
        let spec = cfg.board_spec().expect("spec");
        assert_eq!(spec.family, TagFamily::Tag36h11);
    }

    #[test]
    fn invalid_values_are_reported() {
        let cfg = BoardConfig::default().with_overrides(&Overrides {
            grid_y: Some(0),
            ..Overrides::default()
        });
        assert!(matches!(
            cfg.board_spec(),
            Err(ConfigError::Spec(BoardSpecError::InvalidGrid { .. }))
        ));

        let mut cfg = BoardConfig::default();
        cfg.boards = vec![board("Backwards", 9, 2)];
        assert!(matches!(
            cfg.board_entries(),
            Err(ConfigError::Range { ref name, .. }) if name == "Backwards"
        ));
    }

    #[test]
    fn default_entries_partition_147_ids() {
        let entries = BoardConfig::default().board_entries().expect("entries");
        let ranges: Vec<(u32, u32)> = entries
            .iter()
            .map(|e| (e.range.start, e.range.end))
            .collect();
        assert_eq!(ranges, vec![(0, 48), (49, 97), (98, 146)]);
        assert!(entries.iter().all(|e| e.range.count() == 49));
    }
}
