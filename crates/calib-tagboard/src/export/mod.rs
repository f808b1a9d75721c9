//! File export for finished boards.

mod raster;
#[cfg(feature = "pdf")]
mod pdf;

use std::path::{Path, PathBuf};

use crate::config::BoardEntry;
use crate::image::GrayImage;
use crate::layout::{BoardLayout, BoardRange};

pub use self::raster::write_png;
#[cfg(feature = "pdf")]
pub use self::pdf::{write_pdf, PdfInfo};

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[cfg(feature = "pdf")]
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[cfg(feature = "pdf")]
    #[error("PDF write failed: {0}")]
    PdfWrite(#[from] std::io::Error),
}

/// Optional exporters available in this build.
///
/// Produced once at startup and handed to the pipeline; nothing queries
/// feature availability later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportCapabilities {
    pub pdf: bool,
}

impl ExportCapabilities {
    /// Capabilities compiled into this binary.
    pub fn detect() -> Self {
        Self {
            pdf: cfg!(feature = "pdf"),
        }
    }

    /// Raster output only.
    pub fn png_only() -> Self {
        Self { pdf: false }
    }
}

/// A composed board ready for export.
#[derive(Clone, Debug)]
pub struct BoardOutput {
    /// 1-based position in the batch.
    pub index: usize,
    pub name: String,
    pub range: BoardRange,
    pub canvas: GrayImage,
}

impl BoardOutput {
    pub fn new(index: usize, entry: &BoardEntry, canvas: GrayImage) -> Self {
        Self {
            index,
            name: entry.name.clone(),
            range: entry.range,
            canvas,
        }
    }

    /// `board_{n}_ids_{start}-{end}`
    pub fn file_stem(&self) -> String {
        file_stem(self.index, self.range)
    }
}

pub(crate) fn file_stem(index: usize, range: BoardRange) -> String {
    format!("board_{}_ids_{}-{}", index, range.start, range.end)
}

/// Files written for one board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportedFiles {
    pub png: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

/// Write the PNG and, when available, the PDF for `output` into `dir`.
pub fn export_board(
    output: &BoardOutput,
    layout: &BoardLayout,
    dir: &Path,
    caps: &ExportCapabilities,
) -> Result<ExportedFiles, ExportError> {
    let stem = output.file_stem();

    let png_path = dir.join(format!("{stem}.png"));
    write_png(&output.canvas, layout.spec().dpi, &png_path)?;
    log::info!("saved {}", png_path.display());

    let pdf = if caps.pdf {
        export_pdf(output, layout, &dir.join(format!("{stem}.pdf")))?
    } else {
        log::warn!("PDF export unavailable in this build, skipping {stem}.pdf");
        None
    };

    Ok(ExportedFiles {
        png: Some(png_path),
        pdf,
    })
}

#[cfg(feature = "pdf")]
fn export_pdf(
    output: &BoardOutput,
    layout: &BoardLayout,
    path: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    write_pdf(output, layout, path)?;
    log::info!("saved {}", path.display());
    Ok(Some(path.to_path_buf()))
}

#[cfg(not(feature = "pdf"))]
fn export_pdf(
    _output: &BoardOutput,
    _layout: &BoardLayout,
    path: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    log::warn!(
        "PDF support not compiled in, skipping {}",
        path.display()
    );
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_encodes_index_and_range() {
        let range = BoardRange::new(49, 97).expect("range");
        assert_eq!(file_stem(2, range), "board_2_ids_49-97");
    }

    #[test]
    fn detected_capabilities_follow_features() {
        assert_eq!(ExportCapabilities::detect().pdf, cfg!(feature = "pdf"));
        assert!(!ExportCapabilities::png_only().pdf);
    }
}
