//! OpenDocument spreadsheets (.ods).
use crate::error::ResultMessage;
use crate::error::SheetDocError;
use crate::helpers::reader::BytesReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellKind;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use log::debug;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::io::Read;
use thiserror::Error;
use zip::ZipArchive;

const MIME_TYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";
const CONTENT_PART: &str = "content.xml";
const MANIFEST_PART: &str = "META-INF/manifest.xml";

const TABLE: QName = QName(b"table:table");
const ROW: QName = QName(b"table:table-row");
const CELL: QName = QName(b"table:table-cell");
const COVERED_CELL: QName = QName(b"table:covered-table-cell");
const ANNOTATION: QName = QName(b"office:annotation");
const PARAGRAPH: QName = QName(b"text:p");
const SPACES: QName = QName(b"text:s");
const TAB: QName = QName(b"text:tab");
const LINE_BREAK: QName = QName(b"text:line-break");
const ENCRYPTION_DATA: QName = QName(b"manifest:encryption-data");

#[derive(Error, Debug)]
pub enum OdsError {
    #[error("Invalid ODS MIME type")]
    MimeTypeError,

    #[error("Sheet without name in '{0}'")]
    SheetNameError(String),
}

pub(crate) struct OdsSpreadsheet<'a> {
    name: String,
    zip: ZipArchive<BytesReader<'a>>,
}

impl<'a> OdsSpreadsheet<'a> {
    pub(crate) fn open(file_name: &str, reader: BytesReader<'a>) -> Result<Self, SheetDocError> {
        let mut zip = ZipArchive::new(reader)?;
        if let Some(mut file) = zip.file("mimetype")? {
            let mut mime = Vec::new();
            file.read_to_end(&mut mime)?;
            if mime != MIME_TYPE {
                Err(OdsError::MimeTypeError)?;
            }
        }
        if is_encrypted(&mut zip)? {
            Err(SpreadsheetError::SpreadsheetPasswordProtectedError(file_name.to_owned()))?;
        }
        Ok(OdsSpreadsheet { name: file_name.to_owned(), zip })
    }
}

/// The content of a cell, known from its attributes or still being collected
/// from its paragraphs.
enum Content {
    Empty,
    Attribute(CellKind, String),
    Paragraphs(String),
}

/// A `table:table-cell` between its start and end tags, with its repeat counts.
struct OpenCell {
    rows: usize,
    cols: usize,
    content: Content,
    in_annotation: bool,
}

impl OpenCell {
    fn start(event: &BytesStart, rows: usize, criteria: &Criteria) -> Result<OpenCell, SheetDocError> {
        let cols = event.parse_attribute_value("table:number-columns-repeated")?.unwrap_or(1);
        let attribute = |name: &str| -> Result<String, SheetDocError> {
            Ok(event.get_attribute_value(name)?.unwrap_or_default().into_owned())
        };
        let value_type = event.get_attribute_value("office:value-type")?;
        let content = match value_type.as_deref() {
            None => Content::Empty,
            Some("string") => {
                let is_error = event.get_attribute_value("calcext:value-type")?.as_deref() == Some("error");
                match (is_error, criteria.error_as_null) {
                    (true, true) => Content::Empty,
                    _ => Content::Paragraphs(String::new()),
                }
            }
            Some("boolean") => {
                let flag = attribute("office:boolean-value")?;
                let flag = if flag == "true" || flag == "1" { "1" } else { "0" };
                Content::Attribute(CellKind::Bool, flag.to_owned())
            }
            Some("date") => Content::Attribute(CellKind::IsoDateTime, attribute("office:date-value")?),
            Some("time") => Content::Attribute(CellKind::IsoDuration, attribute("office:time-value")?),
            // float, percentage and currency all carry office:value
            Some(_) => Content::Attribute(CellKind::Number, attribute("office:value")?),
        };
        Ok(OpenCell { rows, cols, content, in_annotation: false })
    }

    /// Paragraph text collector, if this cell takes its value from its text.
    fn text(&mut self) -> Option<&mut String> {
        match &mut self.content {
            Content::Paragraphs(text) if !self.in_annotation => Some(text),
            _ => None,
        }
    }
}

impl Spreadsheet for OdsSpreadsheet<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, SheetDocError> {
        let mut reader = self.zip
            .xml_reader(CONTENT_PART)?
            .ok_or_else(|| SpreadsheetError::FileError(CONTENT_PART.to_owned()))?;

        let mut sheet = None::<Sheet>;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TABLE => {
                let table_name = event.get_attribute_value("table:name")?
                    .ok_or_else(|| OdsError::SheetNameError(self.name.to_owned()))?;
                if criteria.accept(&table_name) {
                    sheet = Some(Sheet::new(&table_name));
                    break;
                }
            }
        });
        let mut sheet = sheet.ok_or_else(|| SpreadsheetError::SheetNotFoundError(self.name.to_owned()))?;

        let mut row = 0usize;
        let mut col = 0usize;
        let mut row_repeat = 1usize;
        let mut open_cell = None::<OpenCell>;
        match_xml_events!(reader => {
            Event::End(event) if event.name() == TABLE => break,
            Event::Start(event) if event.name() == ROW => {
                row_repeat = event.parse_attribute_value("table:number-rows-repeated")?.unwrap_or(1);
                col = 0;
            }
            Event::End(event) if event.name() == ROW => row += row_repeat,
            Event::Start(event) if event.name() == CELL || event.name() == COVERED_CELL => {
                open_cell = Some(OpenCell::start(&event, row_repeat, criteria)?);
            }
            Event::End(event) if event.name() == CELL || event.name() == COVERED_CELL => {
                let Some(cell) = open_cell.take() else { continue };
                let (kind, raw) = match cell.content {
                    Content::Attribute(kind, raw) => (kind, raw),
                    Content::Paragraphs(text) => (CellKind::Text, text),
                    Content::Empty => (CellKind::Text, String::new()),
                };
                if !raw.is_empty() {
                    let value = kind.decode(&raw, &[]).with_prefix(&format!("Cell {}", index_to_reference(row, col)))?;
                    for target_row in row..row + cell.rows {
                        for target_col in col..col + cell.cols {
                            sheet.put(target_row, target_col, value.clone());
                        }
                    }
                }
                col += cell.cols;
            }
            Event::Start(event) if event.name() == ANNOTATION => {
                if let Some(cell) = open_cell.as_mut() {
                    cell.in_annotation = true;
                }
            }
            Event::End(event) if event.name() == ANNOTATION => {
                if let Some(cell) = open_cell.as_mut() {
                    cell.in_annotation = false;
                }
            }
            Event::Start(event) => {
                let Some(text) = open_cell.as_mut().and_then(OpenCell::text) else { continue };
                let name = event.name();
                if name == PARAGRAPH && !text.is_empty() {
                    text.push('\n');
                } else if name == SPACES {
                    let count = event.parse_attribute_value::<usize>("text:c")?.unwrap_or(1);
                    text.push_str(&" ".repeat(count));
                } else if name == TAB {
                    text.push('\t');
                } else if name == LINE_BREAK {
                    text.push('\n');
                }
            }
            Event::Text(event) => {
                if let Some(text) = open_cell.as_mut().and_then(OpenCell::text) {
                    text.push_bytes_text(&event)?;
                }
            }
            Event::GeneralRef(event) => {
                if let Some(text) = open_cell.as_mut().and_then(OpenCell::text) {
                    text.push_bytes_ref(&event)?;
                }
            }
        });
        debug!("{}: read {} cells from sheet '{}'", self.name, sheet.len(), sheet.name);
        Ok(sheet)
    }
}

/// An encrypted package lists encryption data for its parts in the manifest.
fn is_encrypted(zip: &mut ZipArchive<BytesReader<'_>>) -> Result<bool, SheetDocError> {
    let Some(mut reader) = zip.xml_reader(MANIFEST_PART)? else {
        return Ok(false);
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == ENCRYPTION_DATA => return Ok(true),
    });
    Ok(false)
}
