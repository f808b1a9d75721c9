//! Batch generation: compose and export every configured board.

use std::fs;
use std::path::PathBuf;

use crate::config::{BoardConfig, ConfigError};
use crate::export::{export_board, BoardOutput, ExportCapabilities, ExportError, ExportedFiles};
use crate::layout::{BoardLayout, ComposeError};
use crate::marker::MarkerSource;
use crate::report::write_specifications;

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("board {index} ({name}): {source}")]
    Compose {
        index: usize,
        name: String,
        #[source]
        source: ComposeError,
    },
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Files produced for one board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedBoard {
    pub index: usize,
    pub name: String,
    pub files: ExportedFiles,
}

/// Everything written by [`generate_boards`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationSummary {
    pub output_dir: PathBuf,
    pub boards: Vec<GeneratedBoard>,
    pub specifications: PathBuf,
}

/// Generate every board of `cfg` into its output directory.
///
/// Boards are processed in order; the first failure stops the batch and
/// files already written are left in place.
pub fn generate_boards(
    cfg: &BoardConfig,
    caps: &ExportCapabilities,
    markers: &dyn MarkerSource,
) -> Result<GenerationSummary, GenerateError> {
    let spec = cfg.board_spec()?;
    let entries = cfg.board_entries()?;
    let layout = BoardLayout::new(spec, cfg.features).map_err(ConfigError::from)?;
    let geom = layout.geometry();

    log::info!(
        "family {} (OpenCV ID {}), grid {}x{}, tag {}mm ({}px), spacing {}mm ({}px), border {}mm ({}px)",
        spec.family,
        spec.family.opencv_id(),
        spec.grid_x,
        spec.grid_y,
        spec.tag_size_mm,
        geom.tag_size_px,
        spec.spacing_mm,
        geom.spacing_px,
        spec.border_mm,
        geom.border_px
    );
    log::info!(
        "board {:.1}x{:.1}mm at {} DPI -> {}x{}px",
        geom.board_width_mm,
        geom.board_height_mm,
        spec.dpi,
        geom.board_width_px,
        geom.board_height_px
    );

    let dir = cfg.output.directory.clone();
    fs::create_dir_all(&dir).map_err(|source| GenerateError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    if entries.is_empty() {
        log::warn!("no boards configured; writing the specification sheet only");
    }

    let mut boards = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let index = i + 1;
        log::info!(
            "generating board {index} '{}' (ids {}-{})",
            entry.name,
            entry.range.start,
            entry.range.end
        );
        let canvas =
            layout
                .compose(entry.range, markers)
                .map_err(|source| GenerateError::Compose {
                    index,
                    name: entry.name.clone(),
                    source,
                })?;
        let output = BoardOutput::new(index, entry, canvas);
        let files = export_board(&output, &layout, &dir, caps)?;
        boards.push(GeneratedBoard {
            index,
            name: entry.name.clone(),
            files,
        });
    }

    let specifications = write_specifications(&dir, &layout, &entries)?;

    Ok(GenerationSummary {
        output_dir: dir,
        boards,
        specifications,
    })
}
