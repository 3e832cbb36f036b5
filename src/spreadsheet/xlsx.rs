//! Office Open XML workbooks (.xlsx, .xlsm and their templates).
use crate::error::ResultMessage;
use crate::error::SheetDocError;
use crate::helpers::reader::BytesReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellKind;
use crate::spreadsheet::cell::Epoch;
use crate::spreadsheet::cell::Serial;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use log::debug;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::HashMap;
use std::io::BufRead;
use zip::ZipArchive;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELATIONSHIPS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const STYLES_PART: &str = "xl/styles.xml";

/// Encrypted packages are compound files rather than ZIP archives.
const COMPOUND_FILE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const SHEET: QName = QName(b"sheet");
const WORKBOOK_PROPERTIES: QName = QName(b"workbookPr");
const NUMBER_FORMATS: QName = QName(b"numFmts");
const NUMBER_FORMAT: QName = QName(b"numFmt");
const CELL_FORMATS: QName = QName(b"cellXfs");
const CELL_FORMAT: QName = QName(b"xf");
const STRING_ITEM: QName = QName(b"si");
const PHONETIC_RUN: QName = QName(b"rPh");
const TEXT: QName = QName(b"t");
const ROW: QName = QName(b"row");
const CELL: QName = QName(b"c");
const INLINE_STRING: QName = QName(b"is");
const CELL_VALUE: QName = QName(b"v");

/// A worksheet listed in the workbook and the part holding its cells.
#[derive(Clone, Debug, PartialEq)]
struct SheetEntry {
    name: String,
    path: String,
}

pub(crate) struct XlsxSpreadsheet<'a> {
    name: String,
    zip: ZipArchive<BytesReader<'a>>,
    sheets: Vec<SheetEntry>,
    /// Cell kind of numeric cells, indexed by the `s` style attribute
    styles: Vec<CellKind>,
}

impl<'a> XlsxSpreadsheet<'a> {
    pub(crate) fn open(file_name: &str, mut reader: BytesReader<'a>) -> Result<XlsxSpreadsheet<'a>, SheetDocError> {
        if reader.peek(COMPOUND_FILE_SIGNATURE.len())? == COMPOUND_FILE_SIGNATURE {
            Err(SpreadsheetError::SpreadsheetPasswordProtectedError(file_name.to_owned()))?;
        }
        let mut zip = ZipArchive::new(reader)?;
        let (sheets, epoch) = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?;
        }
        let styles = load_styles(&mut zip, epoch)?;
        Ok(XlsxSpreadsheet { name: file_name.to_owned(), zip, sheets, styles })
    }

    fn load_shared_strings(&mut self) -> Result<Vec<String>, SheetDocError> {
        let mut strings = Vec::new();
        if let Some(mut reader) = self.zip.xml_reader(SHARED_STRINGS_PART)? {
            match_xml_events!(reader => {
                Event::Start(event) if event.name() == STRING_ITEM => {
                    strings.push(read_text(&mut reader, STRING_ITEM, false)?);
                }
            });
        }
        Ok(strings)
    }
}

/// Kind of a cell from its `t` and `s` attributes. `None` for error cells
/// read as empty.
fn cell_kind(t: Option<&str>, style: Option<usize>, styles: &[CellKind], criteria: &Criteria) -> Option<CellKind> {
    let kind = match t {
        Some("s") => CellKind::SharedString,
        Some("inlineStr") | Some("str") => CellKind::Text,
        Some("b") => CellKind::Bool,
        Some("d") => CellKind::IsoDateTime,
        Some("e") if criteria.error_as_null => return None,
        Some("e") => CellKind::Error,
        _ => style
            .and_then(|index| styles.get(index))
            .copied()
            .unwrap_or(CellKind::Number),
    };
    Some(kind)
}

/// A cell between its start and end tags.
struct OpenCell {
    row: usize,
    col: usize,
    kind: Option<CellKind>,
    raw: String,
}

impl Spreadsheet for XlsxSpreadsheet<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, SheetDocError> {
        let entry = self.sheets
            .iter()
            .find(|entry| criteria.accept(&entry.name))
            .cloned()
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(self.name.to_owned()))?;
        let shared_strings = self.load_shared_strings()?;

        let mut sheet = Sheet::new(&entry.name);
        // where a cell without an `r` attribute lands
        let mut next_row = 0usize;
        let mut next_col = 0usize;
        let mut open_cell = None::<OpenCell>;

        let mut reader = self.zip.xml_reader(&entry.path)?
            .ok_or_else(|| SpreadsheetError::FileError(entry.path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == ROW => {
                if let Some(number) = event.parse_attribute_value::<usize>("r")? {
                    next_row = number.saturating_sub(1);
                }
                next_col = 0;
            }
            Event::End(event) if event.name() == ROW => next_row += 1,
            Event::Start(event) if event.name() == CELL => {
                let (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((next_row, next_col));
                next_col = col + 1;
                let t = event.get_attribute_value("t")?;
                let style = event.get_attribute_value("s")?.and_then(|style| style.parse::<usize>().ok());
                let kind = cell_kind(t.as_deref(), style, &self.styles, criteria);
                open_cell = Some(OpenCell { row, col, kind, raw: String::new() });
            }
            Event::Start(event) if event.name() == CELL_VALUE || event.name() == INLINE_STRING => {
                let is_value = event.name() == CELL_VALUE;
                let end = if is_value { CELL_VALUE } else { INLINE_STRING };
                let raw = read_text(&mut reader, end, is_value)?;
                if let Some(cell) = open_cell.as_mut() {
                    cell.raw = raw;
                }
            }
            Event::End(event) if event.name() == CELL => {
                if let Some(OpenCell { row, col, kind: Some(kind), raw }) = open_cell.take() {
                    if !raw.is_empty() {
                        let value = kind
                            .decode(&raw, &shared_strings)
                            .with_prefix(&format!("Cell {}", index_to_reference(row, col)))?;
                        sheet.put(row, col, value);
                    }
                }
            }
        });
        debug!("{}: read {} cells from sheet '{}'", self.name, sheet.len(), sheet.name);
        Ok(sheet)
    }
}

/// Lists the worksheets in workbook order and finds the date system.
fn load_workbook(zip: &mut ZipArchive<BytesReader<'_>>) -> Result<(Vec<SheetEntry>, Epoch), SheetDocError> {
    let targets = load_worksheet_targets(zip)?;
    let mut reader = zip.xml_reader(WORKBOOK_PART)?
        .ok_or_else(|| SpreadsheetError::FileError(WORKBOOK_PART.to_owned()))?;
    let mut sheets = Vec::new();
    let mut epoch = Epoch::Y1900;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == WORKBOOK_PROPERTIES => {
            if matches!(event.get_attribute_value("date1904")?.as_deref(), Some("1") | Some("true")) {
                epoch = Epoch::Y1904;
            }
        }
        Event::Start(event) if event.name() == SHEET => {
            let name = event.get_attribute_value("name")?;
            let id = event.get_local_attribute_value("id")?;
            if let Some((name, path)) = name.zip(id.and_then(|id| targets.get(&*id))) {
                sheets.push(SheetEntry { name: name.into_owned(), path: path.to_owned() });
            }
        }
    });
    Ok((sheets, epoch))
}

/// Maps relationship ids to worksheet part paths.
fn load_worksheet_targets(zip: &mut ZipArchive<BytesReader<'_>>) -> Result<HashMap<String, String>, SheetDocError> {
    let mut reader = zip.xml_reader(WORKBOOK_RELATIONSHIPS_PART)?
        .ok_or_else(|| SpreadsheetError::FileError(WORKBOOK_RELATIONSHIPS_PART.to_owned()))?;
    let mut targets = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == b"Relationship" => {
            let is_worksheet = event.get_attribute_value("Type")?
                .map_or(true, |kind| kind.ends_with("/worksheet"));
            let id = event.get_attribute_value("Id")?;
            let target = event.get_attribute_value("Target")?;
            if let (true, Some(id), Some(target)) = (is_worksheet, id, target) {
                targets.insert(id.into_owned(), part_path(&target));
            }
        }
    });
    Ok(targets)
}

/// Resolves a relationship target against the `xl/` folder.
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_owned(),
        None if target.starts_with("xl/") => target.to_owned(),
        None => format!("xl/{target}"),
    }
}

#[derive(PartialEq)]
enum StyleSection {
    Other,
    NumberFormats,
    CellFormats,
}

/// Resolves every cell format to the kind its numbers decode as.
fn load_styles(zip: &mut ZipArchive<BytesReader<'_>>, epoch: Epoch) -> Result<Vec<CellKind>, SheetDocError> {
    let Some(mut reader) = zip.xml_reader(STYLES_PART)? else {
        return Ok(Vec::new());
    };
    let mut section = StyleSection::Other;
    let mut custom = HashMap::<u32, Option<Serial>>::new();
    let mut format_ids = Vec::<u32>::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == NUMBER_FORMATS => section = StyleSection::NumberFormats,
        Event::Start(event) if event.name() == CELL_FORMATS => section = StyleSection::CellFormats,
        Event::End(event) if event.name() == NUMBER_FORMATS => section = StyleSection::Other,
        Event::End(event) if event.name() == CELL_FORMATS => break,
        Event::Start(event) if section == StyleSection::NumberFormats && event.name() == NUMBER_FORMAT => {
            let id = event.parse_attribute_value::<u32>("numFmtId")?;
            let code = event.get_attribute_value("formatCode")?;
            if let Some((id, code)) = id.zip(code) {
                custom.insert(id, Serial::from_format_code(&code));
            }
        }
        Event::Start(event) if section == StyleSection::CellFormats && event.name() == CELL_FORMAT => {
            format_ids.push(event.parse_attribute_value::<u32>("numFmtId")?.unwrap_or(0));
        }
    });
    Ok(resolve_styles(&format_ids, &custom, epoch))
}

fn resolve_styles(format_ids: &[u32], custom: &HashMap<u32, Option<Serial>>, epoch: Epoch) -> Vec<CellKind> {
    format_ids
        .iter()
        .map(|id| {
            let serial = match custom.get(id) {
                Some(serial) => *serial,
                None => Serial::from_builtin_format(*id),
            };
            CellKind::for_number_format(serial, epoch)
        })
        .collect()
}

/// Collects the text up to the closing `end` tag. Rich text runs are joined
/// and phonetic hints skipped. With `bare`, text outside `<t>` counts too.
fn read_text<R: BufRead>(reader: &mut XmlReader<R>, end: QName, bare: bool) -> Result<String, SheetDocError> {
    let mut text = String::new();
    let mut in_text = bare;
    let mut in_phonetic = false;
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end => break,
        Event::Start(event) if event.name() == PHONETIC_RUN => in_phonetic = true,
        Event::End(event) if event.name() == PHONETIC_RUN => in_phonetic = false,
        Event::Start(event) if event.name() == TEXT => in_text = !in_phonetic,
        Event::End(event) if event.name() == TEXT => in_text = bare,
        Event::Text(event) if in_text => text.push_bytes_text(&event)?,
        Event::CData(event) if in_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if in_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
