use docx_rs::Docx;
use docx_rs::Paragraph;
use docx_rs::Run;
use docx_rs::Table;
use docx_rs::TableCell;
use docx_rs::TableRow;
use image::ImageFormat;
use image::RgbImage;
use rusty_sheetdoc::batch;
use rusty_sheetdoc::table::Value;
use rusty_sheetdoc::ColumnRange;
use rusty_sheetdoc::Criteria;
use rusty_sheetdoc::InputFile;
use rusty_sheetdoc::PairOptions;
use rusty_sheetdoc::SubstitutionMap;
use rusty_sheetdoc::TransformOptions;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::ZipArchive;
use zip::ZipWriter;

fn document_xml(bytes: &[u8]) -> String {
    let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    zip.by_name("word/document.xml").unwrap().read_to_string(&mut xml).unwrap();
    xml
}

fn ods(rows: &[&[&str]]) -> Vec<u8> {
    let rows: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!(r#"<table:table-cell office:value-type="string"><text:p>{cell}</text:p></table:table-cell>"#))
                .collect();
            format!("<table:table-row>{cells}</table:table-row>")
        })
        .collect();
    let content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:spreadsheet><table:table table:name="Sheet1">{rows}</table:table></office:spreadsheet></office:body></office:document-content>"#
    );
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("mimetype", SimpleFileOptions::default()).unwrap();
    writer.write_all(b"application/vnd.oasis.opendocument.spreadsheet").unwrap();
    writer.start_file("content.xml", SimpleFileOptions::default()).unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn png() -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    RgbImage::from_pixel(16, 9, image::Rgb([200, 30, 30]))
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn companion() -> Vec<u8> {
    let cell = |text: &str| TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)));
    let rows = vec![
        TableRow::new(vec![
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Quarter").bold())),
            cell("Sales"),
        ]),
        TableRow::new(vec![cell("Q1"), cell("42")]),
    ];
    let mut bytes = Cursor::new(Vec::new());
    Docx::new().add_table(Table::new(rows)).build().pack(&mut bytes).unwrap();
    bytes.into_inner()
}

#[test]
fn spreadsheet_becomes_trimmed_substituted_table() {
    let source = ods(&[
        &["A", "B", "C"],
        &["a1", "b1", "c1"],
        &["a2", "b2", "c2"],
        &["a3", "b3", "c3"],
        &["a4", "b4", "c4"],
        &["a5", "b5", "c5"],
    ]);
    let inputs = vec![InputFile::new("data.ods", source)];
    let substitutions = SubstitutionMap::from_pairs(vec![(Value::from("A"), Value::from("Alpha"))]);
    let options = TransformOptions {
        trim_rows: Some(1),
        drop_columns: Some("2-2".parse::<ColumnRange>().unwrap()),
        decimals: None,
    };
    let batch = batch::convert_spreadsheets(&inputs, &substitutions, &options, &Criteria::default()).unwrap();
    assert!(batch.messages().is_empty());

    let converted = batch.successes().next().unwrap();
    assert_eq!(converted.document.file_name, "data.docx");
    assert_eq!(converted.table.header, vec!["Alpha", "C"]);
    assert_eq!(converted.table.rows.len(), 4);
    assert_eq!(converted.table.rows[3], vec!["a4", "c4"]);

    let xml = document_xml(&converted.document.bytes);
    assert_eq!(xml.matches("</w:tr>").count(), 5);
    assert!(xml.contains(">Alpha<"));
    assert!(!xml.contains(">b1<"));
    assert!(!xml.contains(">a5<"));
}

#[test]
fn image_is_paired_with_its_table() {
    let images = vec![InputFile::new("chart1.png", png()), InputFile::new("chart2.png", png())];
    let companions = vec![InputFile::new("chart1.docx", companion())];
    let assembly = batch::build_paired_document(&images, &companions, &PairOptions::default()).unwrap();

    assert_eq!(assembly.notices.len(), 1);
    assert_eq!(assembly.notices[0].message, "No matching table found for image: chart2.png");

    let xml = document_xml(&assembly.document.bytes);
    // the outer 1x2 table and the copied 2x2 table
    assert_eq!(xml.matches("</w:tbl>").count(), 2);
    assert_eq!(xml.matches("</w:tr>").count(), 3);
    for text in [">Quarter<", ">Sales<", ">Q1<", ">42<"] {
        assert!(xml.contains(text), "{text} missing");
    }
    assert!(xml.contains("w:drawing"));

    // the bold header run of the companion stays bold, the plain runs do not
    let quarter_at = xml.find(">Quarter<").unwrap();
    let quarter_run = &xml[xml[..quarter_at].rfind("<w:r>").unwrap()..quarter_at];
    assert!(quarter_run.contains("<w:b />"), "{quarter_run}");
    let sales_at = xml.find(">Sales<").unwrap();
    let sales_run = &xml[xml[..sales_at].rfind("<w:r>").unwrap()..sales_at];
    assert!(!sales_run.contains("<w:b />"), "{sales_run}");
}
