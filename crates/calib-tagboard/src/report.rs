//! Human-readable board specification sheet.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BoardEntry;
use crate::export::{file_stem, ExportError};
use crate::layout::BoardLayout;

/// File name of the sheet inside the output directory.
pub const SPECIFICATIONS_FILE: &str = "board_specifications.txt";

const RULE: usize = 60;
const SUBRULE: usize = 30;

/// Render the specification sheet for a batch of boards.
pub fn render_specifications(layout: &BoardLayout, boards: &[BoardEntry]) -> String {
    let spec = layout.spec();
    let geom = layout.geometry();
    let rule = "=".repeat(RULE);
    let subrule = "-".repeat(SUBRULE);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "APRILTAG CALIBRATION BOARD SPECIFICATIONS");
    let _ = writeln!(out, "{rule}\n");

    let _ = writeln!(out, "GENERAL SPECIFICATIONS:");
    let _ = writeln!(out, "{subrule}");
    let _ = writeln!(
        out,
        "AprilTag Family: {} (OpenCV ID: {})",
        spec.family,
        spec.family.opencv_id()
    );
    let _ = writeln!(out, "Grid Layout: {} x {} tags", spec.grid_x, spec.grid_y);
    let _ = writeln!(
        out,
        "Tag Size: {}mm x {}mm",
        spec.tag_size_mm, spec.tag_size_mm
    );
    let _ = writeln!(out, "Tag Spacing: {}mm (edge to edge)", spec.spacing_mm);
    let _ = writeln!(out, "Board Border: {}mm", spec.border_mm);
    let _ = writeln!(
        out,
        "Total Board Size: {:.1}mm x {:.1}mm",
        geom.board_width_mm, geom.board_height_mm
    );
    let _ = writeln!(out, "Image Resolution: {} DPI", spec.dpi);
    let _ = writeln!(
        out,
        "Image Size: {} x {} pixels",
        geom.board_width_px, geom.board_height_px
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "BOARD CONFIGURATIONS:");
    let _ = writeln!(out, "{subrule}");
    for (i, board) in boards.iter().enumerate() {
        let stem = file_stem(i + 1, board.range);
        let _ = writeln!(out, "Board {}:", i + 1);
        let _ = writeln!(out, "  - Name: {}", board.name);
        let _ = writeln!(
            out,
            "  - AprilTag ID Range: {} to {}",
            board.range.start, board.range.end
        );
        let _ = writeln!(out, "  - Number of Tags: {}", board.range.count());
        let _ = writeln!(out, "  - File Names:");
        let _ = writeln!(out, "    * PNG: {stem}.png");
        let _ = writeln!(out, "    * PDF: {stem}.pdf");
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "PRINTING INSTRUCTIONS:");
    let _ = writeln!(out, "{subrule}");
    let _ = writeln!(
        out,
        "1. Print the PDF files at 100% scale (no scaling/fit to page)"
    );
    let _ = writeln!(
        out,
        "2. Verify the printed size: each tag must measure {}mm",
        spec.tag_size_mm
    );
    let _ = writeln!(out, "3. Mount the printed boards on rigid, flat surfaces");
    let _ = writeln!(out, "4. Ensure boards are clean and free from reflections");
    let _ = writeln!(out, "5. Use corner markers for precise alignment if needed");
    let _ = writeln!(out);

    let _ = writeln!(out, "CALIBRATION CONFIGURATION:");
    let _ = writeln!(out, "{subrule}");
    let _ = writeln!(out, "Add the following to your calibration YAML file:\n");
    let _ = writeln!(out, "board_type: 2  # AprilTag board");
    let _ = writeln!(
        out,
        "apriltag_family: {}  # {}",
        spec.family.opencv_id(),
        spec.family
    );
    let _ = writeln!(out, "apriltag_grid_x: {}", spec.grid_x);
    let _ = writeln!(out, "apriltag_grid_y: {}", spec.grid_y);
    let _ = writeln!(
        out,
        "apriltag_size: {:.3}  # in meters",
        spec.tag_size_mm / 1000.0
    );
    let _ = writeln!(
        out,
        "apriltag_spacing: {:.3}  # in meters",
        spec.spacing_mm / 1000.0
    );
    let _ = writeln!(out, "apriltag_board_id_ranges:");
    for board in boards {
        let _ = writeln!(out, "  - [{}, {}]", board.range.start, board.range.end);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "USAGE NOTES:");
    let _ = writeln!(out, "{subrule}");
    let _ = writeln!(out, "- Each board can be used independently or together");
    let _ = writeln!(out, "- Ensure adequate lighting for tag detection");
    let _ = writeln!(out, "- Maintain a reasonable distance for camera resolution");
    let _ = writeln!(out, "- Tags should occupy at least 5x5 pixels in the image");
    let _ = writeln!(out);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Generated by calib-tagboard");
    let _ = writeln!(out, "{rule}");
    out
}

/// Write the sheet to `dir/board_specifications.txt`.
pub fn write_specifications(
    dir: &Path,
    layout: &BoardLayout,
    boards: &[BoardEntry],
) -> Result<PathBuf, ExportError> {
    let path = dir.join(SPECIFICATIONS_FILE);
    fs::write(&path, render_specifications(layout, boards)).map_err(|source| {
        ExportError::Io {
            path: path.clone(),
            source,
        }
    })?;
    log::info!("saved specifications {}", path.display());
    Ok(path)
}
