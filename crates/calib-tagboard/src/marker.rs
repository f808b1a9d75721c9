//! Marker bitmap generation.
//!
//! Bit patterns come from the embedded dictionaries of `calib-targets-aruco`;
//! this module only rasterizes them.

use calib_targets_aruco::{builtins, Dictionary};

use crate::family::TagFamily;
use crate::image::{GrayImage, INK, WHITE};

/// Width of the black frame around the data bits, in cells.
pub const BORDER_BITS: usize = 1;

/// Errors produced while rendering a marker.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("dictionary {name} is not available")]
    UnknownDictionary { name: &'static str },
    #[error("marker id {id} exceeds {family} capacity of {capacity} codes")]
    IdOutOfRange {
        id: u32,
        family: TagFamily,
        capacity: usize,
    },
    #[error("marker side must be > 0 pixels")]
    ZeroSize,
}

/// Source of square monochrome marker bitmaps.
pub trait MarkerSource {
    /// Render marker `id` as a `side_px x side_px` image.
    fn render(&self, id: u32, side_px: usize) -> Result<GrayImage, MarkerError>;
}

/// [`MarkerSource`] backed by a built-in AprilTag dictionary.
#[derive(Clone, Copy, Debug)]
pub struct DictionaryMarkers {
    family: TagFamily,
    dict: Dictionary,
}

impl DictionaryMarkers {
    pub fn for_family(family: TagFamily) -> Result<Self, MarkerError> {
        let name = family.dictionary_name();
        let dict =
            builtins::builtin_dictionary(name).ok_or(MarkerError::UnknownDictionary { name })?;
        Ok(Self { family, dict })
    }

    #[inline]
    pub fn family(&self) -> TagFamily {
        self.family
    }

    /// Number of distinct marker ids in the family.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.dict.codes.len()
    }

    /// Side of the marker in cells, border included.
    #[inline]
    pub fn cells_per_side(&self) -> usize {
        self.dict.marker_size + 2 * BORDER_BITS
    }
}

impl MarkerSource for DictionaryMarkers {
    fn render(&self, id: u32, side_px: usize) -> Result<GrayImage, MarkerError> {
        let code = self
            .dict
            .codes
            .get(id as usize)
            .copied()
            .ok_or(MarkerError::IdOutOfRange {
                id,
                family: self.family,
                capacity: self.capacity(),
            })?;
        render_code(code, self.dict.marker_size, side_px)
    }
}

/// Rasterize a row-major code (`bit y*n + x` set = black) with a one-cell
/// black border, scaled to `side_px` by nearest neighbour.
pub fn render_code(code: u64, marker_size: usize, side_px: usize) -> Result<GrayImage, MarkerError> {
    if side_px == 0 {
        return Err(MarkerError::ZeroSize);
    }
    let cells = marker_size + 2 * BORDER_BITS;

    let mut grid = vec![INK; cells * cells];
    for by in 0..marker_size {
        for bx in 0..marker_size {
            let idx = by * marker_size + bx;
            if (code >> idx) & 1 == 0 {
                grid[(by + BORDER_BITS) * cells + bx + BORDER_BITS] = WHITE;
            }
        }
    }

    // Cell index per output pixel, shared by rows and columns.
    let lookup: Vec<usize> = (0..side_px).map(|p| p * cells / side_px).collect();
    let mut data = Vec::with_capacity(side_px * side_px);
    for &cy in &lookup {
        let row = &grid[cy * cells..(cy + 1) * cells];
        data.extend(lookup.iter().map(|&cx| row[cx]));
    }

    Ok(GrayImage {
        width: side_px,
        height: side_px,
        data,
    })
}
