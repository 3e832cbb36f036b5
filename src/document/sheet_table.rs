use crate::document::bordered;
use crate::document::new_document;
use crate::document::pack;
use crate::document::text_run;
use crate::document::DocumentOutput;
use crate::document::BODY_SIZE;
use crate::document::TEXT_WIDTH_TWIPS;
use crate::error::SheetDocError;
use crate::table::DisplayTable;
use docx_rs::Paragraph;
use docx_rs::Table;
use docx_rs::TableCell;
use docx_rs::TableRow;

/// Renders a processed table as a bordered Word table: one header row
/// followed by the data rows, each cell a Times New Roman 12 pt run.
///
/// # Arguments
///
/// * `table` - Header and rows produced by the table pipeline
/// * `stem` - Base name of the source file, used for the output name
///
/// # Returns
///
/// * `Result<DocumentOutput, SheetDocError>` - `{stem}.docx` on success
pub fn render(table: &DisplayTable, stem: &str) -> Result<DocumentOutput, SheetDocError> {
    let mut docx = new_document();
    if !table.header.is_empty() {
        docx = docx.add_table(word_table(table));
    }
    Ok(DocumentOutput::new(stem, pack(docx)?))
}

fn word_table(table: &DisplayTable) -> Table {
    let columns = table.header.len();
    let rows = std::iter::once(&table.header)
        .chain(table.rows.iter())
        .map(|row| {
            let cells = (0..columns)
                .map(|column| text_cell(row.get(column).map(String::as_str).unwrap_or_default()))
                .collect();
            TableRow::new(cells)
        })
        .collect();
    Table::new(rows).set_grid(vec![TEXT_WIDTH_TWIPS / columns; columns])
}

fn text_cell(text: &str) -> TableCell {
    bordered(TableCell::new().add_paragraph(Paragraph::new().add_run(text_run(text, BODY_SIZE))))
}
