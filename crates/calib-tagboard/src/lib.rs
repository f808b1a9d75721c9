//! Printable AprilTag calibration boards.
//!
//! A board is a `grid_x x grid_y` grid of AprilTag markers with consecutive
//! ids, black separator squares on every tag junction and L-shaped corner
//! brackets for print alignment. Sizes are given in millimeters and
//! rasterized at a chosen DPI.
//!
//! Marker bit patterns come from the embedded dictionaries of
//! `calib-targets-aruco`; this crate does the layout, compositing and export
//! (PNG, optional PDF, plain-text specification sheet).
//!
//! ## Quickstart
//!
//! ```no_run
//! use calib_tagboard::{
//!     generate_boards, BoardConfig, DictionaryMarkers, ExportCapabilities,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = BoardConfig::load_or_default("config.yaml");
//! let markers = DictionaryMarkers::for_family(cfg.board_spec()?.family)?;
//! let summary = generate_boards(&cfg, &ExportCapabilities::detect(), &markers)?;
//! println!("wrote {} boards", summary.boards.len());
//! # Ok(())
//! # }
//! ```

mod config;
mod export;
mod family;
mod geometry;
mod image;
mod layout;
mod logger;
mod marker;
mod pipeline;
mod report;

pub use config::{
    AprilTagSettings, BoardConfig, BoardEntry, BoardSettings, ConfigError, ConfigFormat,
    OutputSettings, Overrides, RawConfig,
};
pub use export::{
    export_board, write_png, BoardOutput, ExportCapabilities, ExportError, ExportedFiles,
};
#[cfg(feature = "pdf")]
pub use export::{write_pdf, PdfInfo};
pub use family::TagFamily;
pub use geometry::{BoardGeometry, BoardSpec, BoardSpecError, MM_PER_INCH};
pub use image::{GrayImage, GrayImageView, PixelRect, INK, WHITE};
pub use layout::{
    Axis, BoardLayout, BoardRange, BoardRangeError, CellPlacement, ComposeError, CornerMark,
    Decorations, Segment, CORNER_MARK_INSET_PX, SEPARATOR_SQUARE_MM,
};
pub use marker::{render_code, DictionaryMarkers, MarkerError, MarkerSource, BORDER_BITS};
pub use pipeline::{generate_boards, GenerateError, GeneratedBoard, GenerationSummary};
pub use report::{render_specifications, write_specifications, SPECIFICATIONS_FILE};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_for_verbosity};
