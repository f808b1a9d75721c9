//! Board layout and compositing.
//!
//! [`BoardLayout`] owns the validated spec and its pixel geometry and turns an
//! ID range into a finished canvas:
//! - one marker per grid cell, row-major, starting at the range start,
//! - black separator squares on every tag junction (borders included),
//! - L-shaped alignment brackets near the four canvas corners.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoardGeometry, BoardSpec, BoardSpecError};
use crate::image::{GrayImage, PixelRect, INK, WHITE};
use crate::marker::{MarkerError, MarkerSource};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Side of the separator squares in millimeters.
///
/// Fixed; [`Decorations::corner_square_size_mm`] does not change it.
pub const SEPARATOR_SQUARE_MM: f64 = 10.0;

/// Distance in pixels between each canvas corner and its bracket.
pub const CORNER_MARK_INSET_PX: i64 = 5;

/// Inclusive range of marker ids assigned to one board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardRange {
    pub start: u32,
    pub end: u32,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardRangeError {
    #[error("id range start {start} is greater than end {end}")]
    Inverted { start: u32, end: u32 },
}

impl BoardRange {
    pub fn new(start: u32, end: u32) -> Result<Self, BoardRangeError> {
        if start > end {
            return Err(BoardRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of ids in the range.
    #[inline]
    pub fn count(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }

    #[inline]
    pub fn contains(&self, id: u64) -> bool {
        id >= u64::from(self.start) && id <= u64::from(self.end)
    }
}

/// Optional overlays drawn after the markers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decorations {
    pub corner_markers: bool,
    pub corner_marker_size_mm: f64,
    pub corner_marker_thickness_mm: f64,
    pub black_corner_squares: bool,
    /// Carried through from configuration; separator squares always use
    /// [`SEPARATOR_SQUARE_MM`].
    pub corner_square_size_mm: f64,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            corner_markers: true,
            corner_marker_size_mm: 5.0,
            corner_marker_thickness_mm: 1.0,
            black_corner_squares: true,
            corner_square_size_mm: 10.0,
        }
    }
}

/// Errors produced while composing a board.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    #[error("marker {id} at row {row}, col {col}: {source}")]
    Marker {
        id: u32,
        row: u32,
        col: u32,
        #[source]
        source: MarkerError,
    },
}

/// One grid cell and the marker placed in it, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPlacement {
    pub row: u32,
    pub col: u32,
    /// `None` when the id range ran out before this cell.
    pub id: Option<u32>,
    /// Top-left pixel of the tag.
    pub x: usize,
    pub y: usize,
}

/// Axis of a corner-mark segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Straight segment between two pixel positions, both end points included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub axis: Axis,
    pub from: (i64, i64),
    pub to: (i64, i64),
    pub thickness: i64,
}

impl Segment {
    /// Filled rectangle covered by the segment.
    pub fn rect(&self) -> PixelRect {
        let half = self.thickness / 2;
        let (x0, x1) = (self.from.0.min(self.to.0), self.from.0.max(self.to.0));
        let (y0, y1) = (self.from.1.min(self.to.1), self.from.1.max(self.to.1));
        match self.axis {
            Axis::Horizontal => PixelRect::new(x0, y0 - half, x1 - x0 + 1, self.thickness),
            Axis::Vertical => PixelRect::new(x0 - half, y0, self.thickness, y1 - y0 + 1),
        }
    }

    /// Distance between the end points.
    #[inline]
    pub fn length(&self) -> i64 {
        (self.to.0 - self.from.0).abs() + (self.to.1 - self.from.1).abs()
    }
}

/// L-shaped bracket at one canvas corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CornerMark {
    /// Shared end point of both segments.
    pub anchor: (i64, i64),
    pub horizontal: Segment,
    pub vertical: Segment,
}

/// Validated board layout engine.
#[derive(Clone, Debug)]
pub struct BoardLayout {
    spec: BoardSpec,
    geometry: BoardGeometry,
    decorations: Decorations,
}

impl BoardLayout {
    /// Validate `spec` and derive its geometry.
    pub fn new(spec: BoardSpec, decorations: Decorations) -> Result<Self, BoardSpecError> {
        spec.validate()?;
        let geometry = BoardGeometry::from_spec(&spec);
        if decorations.black_corner_squares
            && decorations.corner_square_size_mm != SEPARATOR_SQUARE_MM
        {
            log::debug!(
                "corner_square_size_mm = {} is ignored; separator squares are {} mm",
                decorations.corner_square_size_mm,
                SEPARATOR_SQUARE_MM
            );
        }
        Ok(Self {
            spec,
            geometry,
            decorations,
        })
    }

    #[inline]
    pub fn spec(&self) -> &BoardSpec {
        &self.spec
    }

    #[inline]
    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    #[inline]
    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    /// All grid cells in row-major order with the id each one receives.
    ///
    /// Cell `(row, col)` gets `start + row * grid_x + col` if that id is
    /// still inside `range`, and stays empty otherwise.
    pub fn cells(&self, range: BoardRange) -> impl Iterator<Item = CellPlacement> + '_ {
        let grid_x = self.spec.grid_x;
        let grid_y = self.spec.grid_y;
        let pitch = self.geometry.pitch_px();
        let border = self.geometry.border_px;
        (0..grid_y).flat_map(move |row| {
            (0..grid_x).map(move |col| {
                let candidate =
                    u64::from(range.start) + u64::from(row) * u64::from(grid_x) + u64::from(col);
                let id = range.contains(candidate).then_some(candidate as u32);
                CellPlacement {
                    row,
                    col,
                    id,
                    x: border + col as usize * pitch,
                    y: border + row as usize * pitch,
                }
            })
        })
    }

    /// Separator squares on the `(grid_y + 1) x (grid_x + 1)` junction lattice,
    /// row-major, before clipping.
    pub fn separator_squares(&self) -> Vec<PixelRect> {
        let side = self.geometry.mm_to_px(SEPARATOR_SQUARE_MM) as i64;
        let mut out = Vec::with_capacity(
            (self.spec.grid_x as usize + 1) * (self.spec.grid_y as usize + 1),
        );
        for row in 0..=self.spec.grid_y {
            let y = self.junction_offset(row, self.spec.grid_y, self.geometry.board_height_px, side);
            for col in 0..=self.spec.grid_x {
                let x =
                    self.junction_offset(col, self.spec.grid_x, self.geometry.board_width_px, side);
                out.push(PixelRect::new(x, y, side, side));
            }
        }
        out
    }

    /// Top/left coordinate of a separator square along one axis.
    ///
    /// The first and last squares sit flush with the canvas edges; interior
    /// squares start where the preceding tag ends.
    fn junction_offset(&self, index: u32, count: u32, extent_px: usize, side: i64) -> i64 {
        if index == 0 {
            0
        } else if index == count {
            extent_px as i64 - side
        } else {
            let index = i64::from(index);
            self.geometry.border_px as i64
                + index * self.geometry.tag_size_px as i64
                + (index - 1) * self.geometry.spacing_px as i64
        }
    }

    /// The four corner brackets: top-left, top-right, bottom-left, bottom-right.
    pub fn corner_marks(&self) -> [CornerMark; 4] {
        let len = self.geometry.mm_to_px(self.decorations.corner_marker_size_mm) as i64;
        let thickness = (self
            .geometry
            .mm_to_px(self.decorations.corner_marker_thickness_mm) as i64)
            .max(1);
        let right = self.geometry.board_width_px as i64 - CORNER_MARK_INSET_PX;
        let bottom = self.geometry.board_height_px as i64 - CORNER_MARK_INSET_PX;
        let left = CORNER_MARK_INSET_PX;
        let top = CORNER_MARK_INSET_PX;

        let bracket = |x: i64, y: i64, dx: i64, dy: i64| CornerMark {
            anchor: (x, y),
            horizontal: Segment {
                axis: Axis::Horizontal,
                from: (x, y),
                to: (x + dx * len, y),
                thickness,
            },
            vertical: Segment {
                axis: Axis::Vertical,
                from: (x, y),
                to: (x, y + dy * len),
                thickness,
            },
        };

        [
            bracket(left, top, 1, 1),
            bracket(right, top, -1, 1),
            bracket(left, bottom, 1, -1),
            bracket(right, bottom, -1, -1),
        ]
    }

    /// Render the board for `range`.
    ///
    /// Fails on the first marker the source cannot produce; no placeholder
    /// is drawn.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, markers), fields(start = range.start, end = range.end))
    )]
    pub fn compose(
        &self,
        range: BoardRange,
        markers: &dyn MarkerSource,
    ) -> Result<GrayImage, ComposeError> {
        let geom = &self.geometry;
        let mut canvas = GrayImage::filled(geom.board_width_px, geom.board_height_px, WHITE);

        let capacity = self.spec.capacity();
        if range.count() > capacity {
            log::warn!(
                "id range {}-{} holds {} ids but the {}x{} grid has {} cells; extra ids are dropped",
                range.start,
                range.end,
                range.count(),
                self.spec.grid_x,
                self.spec.grid_y,
                capacity
            );
        }

        let mut placed = 0usize;
        for cell in self.cells(range) {
            let Some(id) = cell.id else {
                continue;
            };
            let tag = markers
                .render(id, geom.tag_size_px)
                .map_err(|source| ComposeError::Marker {
                    id,
                    row: cell.row,
                    col: cell.col,
                    source,
                })?;
            canvas.blit(&tag.view(), cell.x as i64, cell.y as i64);
            placed += 1;
        }
        log::debug!("placed {placed} markers");

        if self.decorations.black_corner_squares {
            let painted: usize = self
                .separator_squares()
                .into_iter()
                .map(|sq| canvas.fill_rect(sq, INK))
                .sum();
            log::trace!("separator squares painted {painted} px");
        }

        if self.decorations.corner_markers {
            for mark in self.corner_marks() {
                canvas.fill_rect(mark.horizontal.rect(), INK);
                canvas.fill_rect(mark.vertical.rect(), INK);
            }
        }

        Ok(canvas)
    }
}
