//! Reads the first table of a companion Word document.
//!
//! Only the formatting that is copied into the combined document is kept:
//! run text plus bold, italic, underline, font name and size.
use crate::error::SheetDocError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use log::debug;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::io::Cursor;
use thiserror::Error;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

const TABLE: QName = QName(b"w:tbl");
const GRID_COLUMN: QName = QName(b"w:gridCol");
const TABLE_ROW: QName = QName(b"w:tr");
const TABLE_CELL: QName = QName(b"w:tc");
const GRID_SPAN: QName = QName(b"w:gridSpan");
const PARAGRAPH: QName = QName(b"w:p");
const RUN: QName = QName(b"w:r");
const RUN_PROPERTIES: QName = QName(b"w:rPr");
const BOLD: QName = QName(b"w:b");
const ITALIC: QName = QName(b"w:i");
const UNDERLINE: QName = QName(b"w:u");
const FONTS: QName = QName(b"w:rFonts");
const SIZE: QName = QName(b"w:sz");
const TEXT: QName = QName(b"w:t");
const TAB: QName = QName(b"w:tab");
const BREAK: QName = QName(b"w:br");
const CARRIAGE_RETURN: QName = QName(b"w:cr");

#[derive(Error, Debug)]
pub enum CompanionError {
    #[error("Document has no {DOCUMENT_PART} part")]
    MissingDocumentError,

    #[error("No table found in document")]
    NoTableError,
}

/// Character formatting of a run. `None` means inherited from the style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunFormat {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Underline style such as `single` or `double`
    pub underline: Option<String>,
    pub font: Option<String>,
    /// Size in half-points
    pub size: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompanionRun {
    /// Text with tabs as `\t` and line breaks as `\n`
    pub text: String,
    pub format: RunFormat,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompanionParagraph {
    pub runs: Vec<CompanionRun>,
}

impl CompanionParagraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompanionCell {
    pub paragraphs: Vec<CompanionParagraph>,
}

impl CompanionCell {
    /// Paragraph texts joined by line breaks.
    pub fn text(&self) -> String {
        self.paragraphs.iter().map(CompanionParagraph::text).collect::<Vec<_>>().join("\n")
    }
}

/// A table copied from a companion document. Every row has `column_count` cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompanionTable {
    pub rows: Vec<Vec<CompanionCell>>,
}

impl CompanionTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }
}

/// On/off properties such as `<w:b/>` are on unless `w:val` says otherwise.
fn toggle(event: &BytesStart) -> Result<bool, SheetDocError> {
    Ok(match event.get_attribute_value("w:val")? {
        Some(value) => !matches!(value.as_ref(), "false" | "0" | "off"),
        None => true,
    })
}

/// Parses `word/document.xml` of a DOCX package and returns its first
/// top-level table. Tables nested inside that table's cells are skipped;
/// a cell spanning several grid columns is repeated once per column.
///
/// # Arguments
///
/// * `bytes` - Content of the DOCX file
///
/// # Returns
///
/// * `Result<CompanionTable, SheetDocError>` - The table, or an error when the
///   package is unreadable or holds no table
pub fn read_first_table(bytes: &[u8]) -> Result<CompanionTable, SheetDocError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;
    let mut reader = zip
        .xml_reader(DOCUMENT_PART)?
        .ok_or(CompanionError::MissingDocumentError)?;

    let mut depth = 0usize;
    let mut found = false;
    let mut grid_columns = 0usize;
    let mut rows: Vec<Vec<CompanionCell>> = Vec::new();
    let mut row: Vec<CompanionCell> = Vec::new();
    let mut cell = CompanionCell::default();
    let mut span = 1usize;
    let mut paragraph: Option<CompanionParagraph> = None;
    let mut run: Option<CompanionRun> = None;
    let mut run_properties = false;
    let mut text_context = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TABLE => {
            depth += 1;
            found = true;
        }
        Event::End(event) if event.name() == TABLE => {
            depth = depth.saturating_sub(1);
            if found && depth == 0 {
                break;
            }
        }
        Event::Start(event) if depth == 1 && event.name() == GRID_COLUMN => grid_columns += 1,
        Event::Start(event) if depth == 1 && event.name() == TABLE_ROW => row.clear(),
        Event::End(event) if depth == 1 && event.name() == TABLE_ROW => rows.push(std::mem::take(&mut row)),
        Event::Start(event) if depth == 1 && event.name() == TABLE_CELL => {
            cell = CompanionCell::default();
            span = 1;
        }
        Event::Start(event) if depth == 1 && event.name() == GRID_SPAN => {
            span = event.parse_attribute_value("w:val")?.unwrap_or(1).max(1);
        }
        Event::End(event) if depth == 1 && event.name() == TABLE_CELL => {
            for _ in 1..span {
                row.push(cell.clone());
            }
            row.push(std::mem::take(&mut cell));
        }
        Event::Start(event) if depth == 1 && event.name() == PARAGRAPH => {
            paragraph = Some(CompanionParagraph::default());
        }
        Event::End(event) if depth == 1 && event.name() == PARAGRAPH => {
            if let Some(paragraph) = paragraph.take() {
                cell.paragraphs.push(paragraph);
            }
        }
        Event::Start(event) if depth == 1 && event.name() == RUN => {
            run = paragraph.as_ref().map(|_| CompanionRun::default());
        }
        Event::End(event) if depth == 1 && event.name() == RUN => {
            if let (Some(run), Some(paragraph)) = (run.take(), paragraph.as_mut()) {
                if !run.text.is_empty() {
                    paragraph.runs.push(run);
                }
            }
        }
        Event::Start(event) if event.name() == RUN_PROPERTIES => run_properties = run.is_some(),
        Event::End(event) if event.name() == RUN_PROPERTIES => run_properties = false,
        Event::Start(event) if run_properties => {
            if let Some(run) = run.as_mut() {
                let format = &mut run.format;
                let name = event.name();
                if name == BOLD {
                    format.bold = Some(toggle(&event)?);
                } else if name == ITALIC {
                    format.italic = Some(toggle(&event)?);
                } else if name == UNDERLINE {
                    format.underline = match event.get_attribute_value("w:val")? {
                        Some(value) if value == "none" => None,
                        Some(value) => Some(value.to_string()),
                        None => Some("single".to_owned()),
                    };
                } else if name == FONTS {
                    format.font = match event.get_attribute_value("w:ascii")? {
                        Some(font) => Some(font.to_string()),
                        None => event.get_attribute_value("w:hAnsi")?.map(|font| font.to_string()),
                    };
                } else if name == SIZE {
                    format.size = event.parse_attribute_value("w:val")?;
                }
            }
        }
        Event::Start(event) if depth == 1 && event.name() == TEXT => text_context = run.is_some(),
        Event::End(event) if event.name() == TEXT => text_context = false,
        Event::Text(event) if text_context => {
            if let Some(run) = run.as_mut() {
                run.text.push_bytes_text(&event)?;
            }
        }
        Event::GeneralRef(event) if text_context => {
            if let Some(run) = run.as_mut() {
                run.text.push_bytes_ref(&event)?;
            }
        }
        Event::Start(event) if depth == 1 && event.name() == TAB => {
            if let Some(run) = run.as_mut() {
                run.text.push('\t');
            }
        }
        Event::Start(event) if depth == 1 && (event.name() == BREAK || event.name() == CARRIAGE_RETURN) => {
            if let Some(run) = run.as_mut() {
                run.text.push('\n');
            }
        }
    });

    if !found {
        Err(CompanionError::NoTableError)?
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(grid_columns);
    for row in &mut rows {
        row.resize_with(columns, CompanionCell::default);
    }
    debug!("Companion table has {} rows and {} columns", rows.len(), columns);
    Ok(CompanionTable { rows })
}
