use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::ExportError;
use crate::geometry::MM_PER_INCH;
use crate::image::GrayImage;

/// Write `canvas` as an 8-bit grayscale PNG.
///
/// The `pHYs` chunk records `dpi` so viewers and print dialogs pick up the
/// physical size.
pub fn write_png(canvas: &GrayImage, dpi: u32, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        canvas.width as u32,
        canvas.height as u32,
    );
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let ppm = dots_per_meter(dpi);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&canvas.data)?;
    writer.finish()?;
    Ok(())
}

fn dots_per_meter(dpi: u32) -> u32 {
    (f64::from(dpi) * 1000.0 / MM_PER_INCH).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{INK, WHITE};

    #[test]
    fn dpi_converts_to_pixels_per_meter() {
        assert_eq!(dots_per_meter(300), 11811);
        assert_eq!(dots_per_meter(254), 10000);
    }

    #[test]
    fn written_png_decodes_to_same_pixels() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("board.png");
        let mut canvas = GrayImage::filled(7, 5, WHITE);
        canvas.data[3] = INK;
        canvas.data[34] = 17;
        write_png(&canvas, 300, &path).expect("write");

        let decoder = png::Decoder::new(std::io::BufReader::new(File::open(&path).expect("open")));
        let mut reader = decoder.read_info().expect("info");
        let info = reader.info();
        assert_eq!((info.width, info.height), (7, 5));
        assert_eq!(info.color_type, png::ColorType::Grayscale);
        assert_eq!(info.pixel_dims.map(|d| d.xppu), Some(11811));

        let mut buf = vec![0; canvas.width * canvas.height];
        let frame = reader.next_frame(&mut buf).expect("frame");
        assert_eq!(&buf[..frame.buffer_size()], canvas.data.as_slice());
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("board.png");
        let err = write_png(&GrayImage::filled(2, 2, WHITE), 300, &path).expect_err("must fail");
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
