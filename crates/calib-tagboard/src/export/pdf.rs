//! Single-page print PDF sized to the physical board.

use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::{BoardOutput, ExportError};
use crate::layout::BoardLayout;

/// PostScript points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Page metadata written into the document `Info` dictionary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfInfo {
    pub title: String,
    pub subject: String,
    pub keywords: String,
    pub producer: String,
}

impl PdfInfo {
    pub fn for_board(output: &BoardOutput, layout: &BoardLayout) -> Self {
        let spec = layout.spec();
        Self {
            title: format!("AprilTag Board {}", output.index),
            subject: format!(
                "Calibration board with AprilTag IDs {}-{}",
                output.range.start, output.range.end
            ),
            keywords: format!(
                "AprilTag, Calibration, {}, {}x{}",
                spec.family, spec.grid_x, spec.grid_y
            ),
            producer: "AprilTag Board Generator".to_string(),
        }
    }
}

/// Write `output` as a PDF whose page is exactly the board size, no margins.
///
/// The canvas is embedded losslessly as a grayscale image stretched over the
/// whole page, so it prints at the configured DPI when scaled to 100 %.
pub fn write_pdf(
    output: &BoardOutput,
    layout: &BoardLayout,
    path: &Path,
) -> Result<(), ExportError> {
    let (width_in, height_in) = layout.geometry().size_inches();
    let page_w = (width_in * POINTS_PER_INCH) as f32;
    let page_h = (height_in * POINTS_PER_INCH) as f32;
    let canvas = &output.canvas;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => canvas.width as i64,
            "Height" => canvas.height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        deflate(&canvas.data)?,
    );
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    page_w.into(),
                    0.into(),
                    0.into(),
                    page_h.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info = PdfInfo::for_board(output, layout);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(info.title),
        "Subject" => Object::string_literal(info.subject),
        "Keywords" => Object::string_literal(info.keywords),
        "Producer" => Object::string_literal(info.producer),
    });
    doc.trailer.set("Info", info_id);

    doc.save(path)?;
    Ok(())
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
