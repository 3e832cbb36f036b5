//! # Word Document Assembly
//!
//! Builds DOCX documents with `docx-rs`: bordered tables of spreadsheet text,
//! image grids and image/table pairs. Every text run uses Times New Roman.
//! Borders are single black lines of 0.5 pt.
pub mod companion;
pub mod grid;
pub mod picture;
pub mod paired;
pub mod sheet_table;

use crate::error::SheetDocError;
use docx_rs::BorderType;
use docx_rs::Docx;
use docx_rs::Run;
use docx_rs::RunFonts;
use docx_rs::TableBorder;
use docx_rs::TableBorderPosition;
use docx_rs::TableBorders;
use docx_rs::TableCell;
use docx_rs::TableCellBorder;
use docx_rs::TableCellBorderPosition;
use std::fmt::Display;
use std::io::Cursor;
use thiserror::Error;

/// MIME type of every produced document.
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Font of all text runs.
pub const FONT_NAME: &str = "Times New Roman";
/// Body text size in half-points (12 pt).
pub const BODY_SIZE: usize = 24;
/// Caption size in half-points (10 pt).
pub const CAPTION_SIZE: usize = 20;

/// Border width in eighths of a point (0.5 pt).
const BORDER_SIZE: usize = 4;
const BORDER_COLOR: &str = "000000";

/// English metric units per centimetre, used for picture sizes.
pub const EMU_PER_CM: f64 = 360_000.0;
/// Twentieths of a point per centimetre, used for widths and heights.
pub const TWIPS_PER_CM: f64 = 567.0;
/// Text width of the default page in twips, used to split percentage widths into grid columns.
pub(crate) const TEXT_WIDTH_TWIPS: usize = 8_504;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Pack document failed: {0}")]
    PackError(String),

    #[error("No images to place")]
    NoImagesError,

    #[error("No image has a matching table document: {}", .0.join(", "))]
    NoPairsError(Vec<String>),
}

/// A generated document ready to be saved or offered for download.
#[derive(Clone, Debug)]
pub struct DocumentOutput {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl DocumentOutput {
    pub(crate) fn new(stem: &str, bytes: Vec<u8>) -> Self {
        DocumentOutput {
            file_name: format!("{stem}.docx"),
            mime: DOCX_MIME,
            bytes,
        }
    }
}

/// A non-fatal problem met while assembling a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// File the notice is about
    pub item: String,
    pub message: String,
}

impl Notice {
    pub(crate) fn new(item: &str, message: impl Into<String>) -> Self {
        Notice {
            item: item.to_owned(),
            message: message.into(),
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A combined document together with the notices raised while building it.
#[derive(Clone, Debug)]
pub struct Assembly {
    pub document: DocumentOutput,
    pub notices: Vec<Notice>,
}

pub(crate) fn cm_to_emu(cm: f64) -> u32 {
    (cm * EMU_PER_CM).round() as u32
}

pub(crate) fn cm_to_twips(cm: f64) -> usize {
    (cm * TWIPS_PER_CM).round() as usize
}

/// New document whose default text style is Times New Roman 12 pt.
pub(crate) fn new_document() -> Docx {
    Docx::new().default_fonts(fonts(FONT_NAME)).default_size(BODY_SIZE)
}

pub(crate) fn fonts(name: &str) -> RunFonts {
    RunFonts::new().ascii(name).hi_ansi(name).east_asia(name).cs(name)
}

/// A Times New Roman run of the given size in half-points.
pub(crate) fn text_run(text: &str, size: usize) -> Run {
    Run::new().add_text(text).fonts(fonts(FONT_NAME)).size(size)
}

/// Adds 0.5 pt black borders on all four sides of a cell.
pub(crate) fn bordered(cell: TableCell) -> TableCell {
    [
        TableCellBorderPosition::Top,
        TableCellBorderPosition::Left,
        TableCellBorderPosition::Bottom,
        TableCellBorderPosition::Right,
    ]
    .into_iter()
    .fold(cell, |cell, position| {
        cell.set_border(
            TableCellBorder::new(position)
                .border_type(BorderType::Single)
                .size(BORDER_SIZE)
                .color(BORDER_COLOR),
        )
    })
}

/// 0.5 pt black borders around a table and between its rows and columns.
pub(crate) fn table_borders() -> TableBorders {
    [
        TableBorderPosition::Top,
        TableBorderPosition::Left,
        TableBorderPosition::Bottom,
        TableBorderPosition::Right,
        TableBorderPosition::InsideH,
        TableBorderPosition::InsideV,
    ]
    .into_iter()
    .fold(TableBorders::new(), |borders, position| {
        borders.set(
            TableBorder::new(position)
                .border_type(BorderType::Single)
                .size(BORDER_SIZE)
                .color(BORDER_COLOR),
        )
    })
}

/// Serializes a document into DOCX bytes.
pub(crate) fn pack(docx: Docx) -> Result<Vec<u8>, SheetDocError> {
    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|error| DocumentError::PackError(error.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    /// Extracts `word/document.xml` from packed DOCX bytes.
    pub(crate) fn document_xml(bytes: &[u8]) -> String {
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        zip.by_name("word/document.xml").unwrap().read_to_string(&mut xml).unwrap();
        xml
    }

    /// The `<w:r>` element holding `text`, properties included.
    pub(crate) fn run_with_text<'a>(xml: &'a str, text: &str) -> &'a str {
        let at = xml.find(&format!(">{text}<")).unwrap();
        let start = xml[..at].rfind("<w:r>").unwrap();
        let end = at + xml[at..].find("</w:r>").unwrap();
        &xml[start..end]
    }

    /// Number of pictures placed in the body. Identical image bytes share one
    /// media part, so placements are counted through their `r:embed` links.
    pub(crate) fn embedded_pictures(bytes: &[u8]) -> usize {
        document_xml(bytes).matches("r:embed=").count()
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(cm_to_emu(5.0), 1_800_000);
        assert_eq!(cm_to_emu(0.5), 180_000);
        assert_eq!(cm_to_twips(1.0), 567);
        assert_eq!(cm_to_twips(0.6), 340);
    }

    #[test]
    fn output_naming() {
        let output = DocumentOutput::new("report", vec![1, 2, 3]);
        assert_eq!(output.file_name, "report.docx");
        assert_eq!(output.mime, DOCX_MIME);
    }

    #[test]
    fn pack_produces_zip() {
        let bytes = pack(new_document()).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
        assert!(document_xml(&bytes).contains("w:body"));
    }
}
