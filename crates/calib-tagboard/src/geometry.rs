//! Physical board specification and its pixel geometry.

use serde::{Deserialize, Serialize};

use crate::family::TagFamily;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Static board specification in physical units.
///
/// `grid_x`/`grid_y` are **tag counts**, all lengths are millimeters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSpec {
    pub family: TagFamily,
    pub grid_x: u32,
    pub grid_y: u32,
    pub tag_size_mm: f64,
    pub spacing_mm: f64,
    pub border_mm: f64,
    pub dpi: u32,
}

/// Board specification validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BoardSpecError {
    #[error("grid_x and grid_y must be >= 1 (got {grid_x}x{grid_y})")]
    InvalidGrid { grid_x: u32, grid_y: u32 },
    #[error("{field} must be > 0 (got {value})")]
    NonPositiveLength { field: &'static str, value: f64 },
    #[error("dpi must be > 0")]
    ZeroDpi,
}

impl BoardSpec {
    pub fn validate(&self) -> Result<(), BoardSpecError> {
        if self.grid_x == 0 || self.grid_y == 0 {
            return Err(BoardSpecError::InvalidGrid {
                grid_x: self.grid_x,
                grid_y: self.grid_y,
            });
        }
        for (field, value) in [
            ("tag_size_mm", self.tag_size_mm),
            ("spacing_mm", self.spacing_mm),
            ("border_mm", self.border_mm),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BoardSpecError::NonPositiveLength { field, value });
            }
        }
        if self.dpi == 0 {
            return Err(BoardSpecError::ZeroDpi);
        }
        Ok(())
    }

    /// Number of tag cells on one board.
    #[inline]
    pub fn capacity(&self) -> u64 {
        u64::from(self.grid_x) * u64::from(self.grid_y)
    }
}

/// Pixel geometry derived once from a [`BoardSpec`].
///
/// Every millimeter length is converted and truncated on its own, so the
/// canvas size (converted from the millimeter total) can exceed the extent
/// covered by the placed tags by a few pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardGeometry {
    pub pixels_per_mm: f64,
    pub tag_size_px: usize,
    pub spacing_px: usize,
    pub border_px: usize,
    pub board_width_mm: f64,
    pub board_height_mm: f64,
    pub board_width_px: usize,
    pub board_height_px: usize,
}

impl BoardGeometry {
    pub fn from_spec(spec: &BoardSpec) -> Self {
        let pixels_per_mm = f64::from(spec.dpi) / MM_PER_INCH;
        let to_px = |mm: f64| (mm * pixels_per_mm) as usize;

        let board_width_mm = extent_mm(spec.grid_x, spec.tag_size_mm, spec.spacing_mm, spec.border_mm);
        let board_height_mm =
            extent_mm(spec.grid_y, spec.tag_size_mm, spec.spacing_mm, spec.border_mm);

        Self {
            pixels_per_mm,
            tag_size_px: to_px(spec.tag_size_mm),
            spacing_px: to_px(spec.spacing_mm),
            border_px: to_px(spec.border_mm),
            board_width_mm,
            board_height_mm,
            board_width_px: to_px(board_width_mm),
            board_height_px: to_px(board_height_mm),
        }
    }

    /// Convert a length with the same truncation as the board fields.
    #[inline]
    pub fn mm_to_px(&self, mm: f64) -> usize {
        (mm * self.pixels_per_mm) as usize
    }

    /// Distance between the top-left corners of neighbouring tags.
    #[inline]
    pub fn pitch_px(&self) -> usize {
        self.tag_size_px + self.spacing_px
    }

    /// Horizontal/vertical extent covered by `count` tags plus both borders
    /// when summed from the truncated per-field pixel sizes.
    pub fn placed_extent_px(&self, count: u32) -> usize {
        let count = count as usize;
        2 * self.border_px + count * self.tag_size_px + count.saturating_sub(1) * self.spacing_px
    }

    /// Page size in inches, used for print export.
    pub fn size_inches(&self) -> (f64, f64) {
        (
            self.board_width_mm / MM_PER_INCH,
            self.board_height_mm / MM_PER_INCH,
        )
    }
}

fn extent_mm(count: u32, tag_size_mm: f64, spacing_mm: f64, border_mm: f64) -> f64 {
    let count = f64::from(count);
    count * tag_size_mm + (count - 1.0) * spacing_mm + 2.0 * border_mm
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn default_spec() -> BoardSpec {
        BoardSpec {
            family: TagFamily::Tag36h11,
            grid_x: 7,
            grid_y: 7,
            tag_size_mm: 40.0,
            spacing_mm: 10.0,
            border_mm: 10.0,
            dpi: 300,
        }
    }

    #[test]
    fn default_board_geometry_at_300_dpi() {
        let geom = BoardGeometry::from_spec(&default_spec());
        assert_relative_eq!(geom.pixels_per_mm, 11.811, epsilon = 1e-3);
        assert_eq!(geom.tag_size_px, 472);
        assert_eq!(geom.spacing_px, 118);
        assert_eq!(geom.border_px, 118);
        assert_relative_eq!(geom.board_width_mm, 360.0);
        assert_relative_eq!(geom.board_height_mm, 360.0);
        // floor(360 * 300 / 25.4) = floor(4251.97)
        assert_eq!(geom.board_width_px, 4251);
        assert_eq!(geom.board_height_px, 4251);
    }

    #[test]
    fn canvas_size_comes_from_mm_total_not_placed_sum() {
        let spec = default_spec();
        let geom = BoardGeometry::from_spec(&spec);
        let expected = (geom.board_width_mm * f64::from(spec.dpi) / MM_PER_INCH).floor() as usize;
        assert_eq!(geom.board_width_px, expected);

        let placed = geom.placed_extent_px(spec.grid_x);
        assert_eq!(placed, 4248);
        assert_ne!(placed, geom.board_width_px);
        assert!(placed <= geom.board_width_px);
    }

    #[test]
    fn rectangular_grid_uses_per_axis_counts() {
        let spec = BoardSpec {
            grid_x: 4,
            grid_y: 2,
            dpi: 254,
            ..default_spec()
        };
        let geom = BoardGeometry::from_spec(&spec);
        // 254 dpi => exactly 10 px/mm
        assert_eq!(geom.tag_size_px, 400);
        assert_relative_eq!(geom.board_width_mm, 4.0 * 40.0 + 3.0 * 10.0 + 20.0);
        assert_relative_eq!(geom.board_height_mm, 2.0 * 40.0 + 10.0 + 20.0);
        assert_eq!(geom.board_width_px, 2100);
        assert_eq!(geom.board_height_px, 1100);
        assert_eq!(geom.placed_extent_px(4), 2100);
    }

    #[test]
    fn validation_rejects_degenerate_specs() {
        assert!(default_spec().validate().is_ok());

        let bad = BoardSpec {
            grid_x: 0,
            ..default_spec()
        };
        assert!(matches!(
            bad.validate(),
            Err(BoardSpecError::InvalidGrid { grid_x: 0, .. })
        ));

        let bad = BoardSpec {
            spacing_mm: -1.0,
            ..default_spec()
        };
        assert!(matches!(
            bad.validate(),
            Err(BoardSpecError::NonPositiveLength {
                field: "spacing_mm",
                ..
            })
        ));

        let bad = BoardSpec {
            tag_size_mm: f64::NAN,
            ..default_spec()
        };
        assert!(bad.validate().is_err());

        let bad = BoardSpec {
            dpi: 0,
            ..default_spec()
        };
        assert_eq!(bad.validate(), Err(BoardSpecError::ZeroDpi));
    }
}
