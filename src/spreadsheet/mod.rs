//! # Spreadsheet Reading Module
//!
//! Reads the cells of one sheet from Excel (.xlsx, .xlsm) and OpenDocument
//! (.ods) files. Cell types are detected from the cell markup and number
//! formats, so dates and times come out as display text while numbers and
//! booleans keep their type.
pub(crate) mod cell;
pub mod criteria;
pub mod ods;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

use crate::error::SheetDocError;
use crate::helpers::reader::BytesReader;
use crate::input::InputFile;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::ods::OdsSpreadsheet;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use crate::table::Value;
use log::debug;
use std::path::Path;
use thiserror::Error;

/// Errors raised while opening or reading spreadsheet files.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Unsupported spreadsheet format '{0}', expected .xlsx, .xlsm or .ods")]
    UnsupportedFormatError(String),

    #[error("Spreadsheet '{0}' is password protected")]
    SpreadsheetPasswordProtectedError(String),

    #[error("Spreadsheet '{0}' contains no sheets")]
    SpreadsheetEmptyError(String),

    #[error("No sheet matches the requested name in '{0}'")]
    SheetNotFoundError(String),

    #[error("Missing part '{0}' in spreadsheet package")]
    FileError(String),

    #[error("Shared string index {0} is out of range")]
    SharedStringError(usize),

    #[error("Date serial '{0}' is out of range")]
    DateOutOfRangeError(String),
}

/// An opened workbook of one of the supported formats.
pub(crate) trait Spreadsheet {
    fn name(&self) -> &str;

    /// Reads and decodes the first sheet whose name the criteria accept.
    fn read_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, SheetDocError>;
}

/// Picks the reader by file extension.
///
/// # Arguments
/// * `file_name` - File name, only its extension is inspected
/// * `reader` - Content of the uploaded file
fn open_spreadsheet<'a>(file_name: &str, reader: BytesReader<'a>) -> Result<Box<dyn Spreadsheet + 'a>, SheetDocError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase())
        .unwrap_or_default();
    let spreadsheet: Box<dyn Spreadsheet + 'a> = match extension.as_str() {
        "xlsx" | "xlsm" | "xltx" | "xltm" => Box::new(XlsxSpreadsheet::open(file_name, reader)?),
        "ods" => Box::new(OdsSpreadsheet::open(file_name, reader)?),
        _ => Err(SpreadsheetError::UnsupportedFormatError(file_name.to_owned()))?,
    };
    Ok(spreadsheet)
}

/// Reads the selected sheet of an uploaded spreadsheet as a dense grid of values.
///
/// The grid covers the used range of the sheet: it starts at the first row and
/// column holding data, and positions without content are `Value::Empty`.
pub fn read_rows(input: &InputFile, criteria: &Criteria) -> Result<Vec<Vec<Value>>, SheetDocError> {
    let mut spreadsheet = open_spreadsheet(&input.name, BytesReader::new(&input.bytes))?;
    let sheet = spreadsheet.read_sheet(criteria)?;
    if let Some(used) = sheet.used_range() {
        debug!("{}: sheet '{}' uses rows {}..={}", spreadsheet.name(), sheet.name, used.top + 1, used.bottom + 1);
    }
    Ok(sheet.into_rows())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Builds an in-memory package from (path, content) pairs.
    pub(crate) fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, content) in parts {
            writer.start_file(*path, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Builds a minimal XLSX workbook with one sheet per (name, sheetData xml) pair.
    pub(crate) fn xlsx(sheets: &[(&str, &str)], shared_strings: &[&str]) -> Vec<u8> {
        let mut workbook = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
        let mut rels = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
        let mut worksheets = Vec::new();
        for (index, (name, data)) in sheets.iter().enumerate() {
            let id = index + 1;
            workbook.push_str(&format!(r#"<sheet name="{name}" sheetId="{id}" r:id="rId{id}"/>"#));
            rels.push_str(&format!(r#"<Relationship Id="rId{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{id}.xml"/>"#));
            worksheets.push((
                format!("xl/worksheets/sheet{id}.xml"),
                format!(r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#),
            ));
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");

        let mut strings = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
        for string in shared_strings {
            strings.push_str(&format!("<si><t>{string}</t></si>"));
        }
        strings.push_str("</sst>");

        let styles = r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/></numFmts><cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="164"/><xf numFmtId="4"/></cellXfs></styleSheet>"#;

        let mut parts: Vec<(&str, &str)> = vec![
            ("xl/workbook.xml", workbook.as_str()),
            ("xl/_rels/workbook.xml.rels", rels.as_str()),
            ("xl/sharedStrings.xml", strings.as_str()),
            ("xl/styles.xml", styles),
        ];
        for (path, content) in &worksheets {
            parts.push((path.as_str(), content.as_str()));
        }
        package(&parts)
    }

    /// Builds a minimal ODS document whose single sheet holds the given table rows xml.
    pub(crate) fn ods(sheet_name: &str, rows: &str) -> Vec<u8> {
        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:spreadsheet><table:table table:name="{sheet_name}">{rows}</table:table></office:spreadsheet></office:body></office:document-content>"#
        );
        let manifest = r#"<?xml version="1.0" encoding="UTF-8"?><manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0"><manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/></manifest:manifest>"#;
        package(&[
            ("mimetype", "application/vnd.oasis.opendocument.spreadsheet"),
            ("META-INF/manifest.xml", manifest),
            ("content.xml", &content),
        ])
    }

    fn text(value: &str) -> Value {
        Value::Text(value.to_owned())
    }

    #[test]
    fn read_xlsx_cells() {
        let data = r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="inlineStr"><is><t>When</t></is></c></row><row r="2"><c r="A2"><v>1234.5</v></c><c r="B2" t="b"><v>1</v></c><c r="C2" s="1"><v>45292</v></c></row><row r="4"><c r="B4" t="e"><v>#DIV/0!</v></c></row>"#;
        let input = InputFile::new("book.xlsx", xlsx(&[("Data", data)], &["Name", "Flag"]));
        let rows = read_rows(&input, &Criteria::default()).unwrap();
        assert_eq!(rows, vec![
            vec![text("Name"), text("Flag"), text("When")],
            vec![Value::Number(1234.5), Value::Bool(true), text("2024-01-01")],
            vec![Value::Empty, Value::Empty, Value::Empty],
            vec![Value::Empty, text("#DIV/0!"), Value::Empty],
        ]);
    }

    #[test]
    fn read_xlsx_error_as_null() {
        let data = r#"<row r="1"><c r="A1" t="inlineStr"><is><t>x</t></is></c></row><row r="2"><c r="A2" t="e"><v>#N/A</v></c></row>"#;
        let input = InputFile::new("book.xlsx", xlsx(&[("Data", data)], &[]));
        let criteria = Criteria { error_as_null: true, ..Criteria::default() };
        let rows = read_rows(&input, &criteria).unwrap();
        assert_eq!(rows, vec![vec![text("x")]]);
    }

    #[test]
    fn read_xlsx_selects_sheet_by_pattern() {
        let first = r#"<row r="1"><c r="A1" t="inlineStr"><is><t>first</t></is></c></row>"#;
        let second = r#"<row r="1"><c r="A1" t="inlineStr"><is><t>second</t></is></c></row>"#;
        let input = InputFile::new("book.xlsm", xlsx(&[("Intro", first), ("Report 2024", second)], &[]));
        let criteria = Criteria::default().with_sheet_pattern("Report*").unwrap();
        assert_eq!(read_rows(&input, &criteria).unwrap(), vec![vec![text("second")]]);

        let criteria = Criteria::default().with_sheet_pattern("Missing").unwrap();
        assert!(read_rows(&input, &criteria).is_err());
    }

    #[test]
    fn read_ods_cells() {
        let rows = r#"<table:table-row><table:table-cell office:value-type="string"><text:p>Name</text:p></table:table-cell><table:table-cell office:value-type="string"><text:p>Amount</text:p></table:table-cell></table:table-row><table:table-row><table:table-cell office:value-type="string"><text:p>Tom &amp; Jerry</text:p></table:table-cell><table:table-cell office:value-type="float" office:value="12.5"><text:p>12.5</text:p></table:table-cell></table:table-row><table:table-row table:number-rows-repeated="2"><table:table-cell office:value-type="boolean" office:boolean-value="true" table:number-columns-repeated="2"/></table:table-row><table:table-row table:number-rows-repeated="1048570"><table:table-cell table:number-columns-repeated="1024"/></table:table-row>"#;
        let input = InputFile::new("book.ods", ods("Sheet1", rows));
        assert_eq!(read_rows(&input, &Criteria::default()).unwrap(), vec![
            vec![text("Name"), text("Amount")],
            vec![text("Tom & Jerry"), Value::Number(12.5)],
            vec![Value::Bool(true), Value::Bool(true)],
            vec![Value::Bool(true), Value::Bool(true)],
        ]);
    }

    #[test]
    fn unsupported_and_broken_files() {
        let input = InputFile::new("notes.txt", b"hello".to_vec());
        let error = read_rows(&input, &Criteria::default()).unwrap_err();
        assert!(error.to_string().contains("Unsupported spreadsheet format"));

        let input = InputFile::new("broken.xlsx", b"not a zip".to_vec());
        assert!(read_rows(&input, &Criteria::default()).is_err());
    }
}
