/// Pixel value used for the board background.
pub const WHITE: u8 = 255;
/// Pixel value used for markers, separator squares and corner marks.
pub const INK: u8 = 0;

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

/// Owned single-channel 8-bit image, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Axis-aligned pixel rectangle in signed canvas coordinates.
///
/// May extend past the canvas; painting clips it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

impl GrayImage {
    /// Allocate a `width x height` image with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Number of pixels equal to `value`.
    pub fn count(&self, value: u8) -> usize {
        self.data.iter().filter(|&&p| p == value).count()
    }

    /// Intersect `rect` with the image bounds, returning `(x0, y0, x1, y1)`
    /// with exclusive upper bounds, or `None` when nothing is visible.
    fn clip(&self, rect: PixelRect) -> Option<(usize, usize, usize, usize)> {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.width).min(self.width as i64);
        let y1 = (rect.y + rect.height).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    /// Paint the visible part of `rect` with `value`.
    ///
    /// Returns the number of pixels written; zero when `rect` lies fully
    /// outside the image.
    pub fn fill_rect(&mut self, rect: PixelRect, value: u8) -> usize {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return 0;
        };
        for y in y0..y1 {
            let row = y * self.width;
            self.data[row + x0..row + x1].fill(value);
        }
        (x1 - x0) * (y1 - y0)
    }

    /// Copy `src` with its top-left corner at `(x, y)`, row by row.
    ///
    /// Parts of `src` falling outside this image are dropped.
    pub fn blit(&mut self, src: &GrayImageView<'_>, x: i64, y: i64) -> usize {
        let rect = PixelRect::new(x, y, src.width as i64, src.height as i64);
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return 0;
        };
        let sx0 = (x0 as i64 - x) as usize;
        for dy in y0..y1 {
            let sy = (dy as i64 - y) as usize;
            let src_row = &src.data[sy * src.width + sx0..sy * src.width + sx0 + (x1 - x0)];
            let row = dy * self.width;
            self.data[row + x0..row + x1].copy_from_slice(src_row);
        }
        (x1 - x0) * (y1 - y0)
    }
}
