//! Images side by side with tables copied from companion Word documents.
use crate::config::PairLayout;
use crate::config::PairOptions;
use crate::document::bordered;
use crate::document::cm_to_twips;
use crate::document::companion::read_first_table;
use crate::document::companion::CompanionCell;
use crate::document::companion::CompanionRun;
use crate::document::companion::CompanionTable;
use crate::document::fonts;
use crate::document::new_document;
use crate::document::pack;
use crate::document::picture::ImageAsset;
use crate::document::table_borders;
use crate::document::text_run;
use crate::document::Assembly;
use crate::document::DocumentError;
use crate::document::DocumentOutput;
use crate::document::Notice;
use crate::document::BODY_SIZE;
use crate::document::CAPTION_SIZE;
use crate::document::FONT_NAME;
use crate::error::SheetDocError;
use crate::input::InputFile;
use docx_rs::AlignmentType;
use docx_rs::BreakType;
use docx_rs::Paragraph;
use docx_rs::Run;
use docx_rs::Table;
use docx_rs::TableCell;
use docx_rs::TableLayoutType;
use docx_rs::TableRow;
use docx_rs::WidthType;
use log::debug;
use log::warn;

/// Minimum row height of the continuous layout in centimetres.
const CONTINUOUS_ROW_CM: f64 = 0.6;

/// An image and the companion document sharing its base name, if any.
#[derive(Clone, Debug)]
pub struct Pairing<'a> {
    pub image: &'a InputFile,
    pub companion: Option<&'a InputFile>,
}

/// Matches every image with the first companion whose file name without
/// extension is identical. The comparison is case-sensitive.
pub fn match_companions<'a>(images: &'a [InputFile], companions: &'a [InputFile]) -> Vec<Pairing<'a>> {
    images
        .iter()
        .map(|image| Pairing {
            image,
            companion: companions.iter().find(|companion| companion.stem() == image.stem()),
        })
        .collect()
}

/// Builds one document placing each matched image next to a copy of the
/// first table of its companion document.
///
/// Unmatched images are skipped with a notice. A companion that cannot be
/// read, or has no table, puts `Error loading table: {reason}` in place of
/// the table.
pub fn render(images: &[InputFile], companions: &[InputFile], options: &PairOptions) -> Result<Assembly, SheetDocError> {
    options.validate()?;
    if images.is_empty() {
        Err(DocumentError::NoImagesError)?
    }

    let mut notices = Vec::new();
    let mut matched = Vec::new();
    for pairing in match_companions(images, companions) {
        match pairing.companion {
            Some(companion) => matched.push((pairing.image, companion)),
            None => {
                let message = format!("No matching table found for image: {}", pairing.image.name);
                warn!("{}", message);
                notices.push(Notice::new(&pairing.image.name, message));
            }
        }
    }
    let Some((first, _)) = matched.first() else {
        let unmatched = notices.into_iter().map(|notice| notice.item).collect();
        return Err(DocumentError::NoPairsError(unmatched).into());
    };

    let image_twips = cm_to_twips(options.image_width_cm);
    let table_twips = cm_to_twips(options.table_width_cm);
    let rows: Vec<TableRow> = matched
        .iter()
        .map(|(image, companion)| {
            let left = image_cell(image, options, &mut notices).width(image_twips, WidthType::Dxa);
            let right = table_cell(companion, table_twips, options.layout, &mut notices).width(table_twips, WidthType::Dxa);
            TableRow::new(vec![left, right])
        })
        .collect();
    let frame = |rows: Vec<TableRow>| {
        Table::new(rows)
            .width(5000, WidthType::Pct)
            .layout(TableLayoutType::Fixed)
            .set_grid(vec![image_twips, table_twips])
            .set_borders(table_borders())
    };

    let mut docx = new_document();
    match options.layout {
        PairLayout::Separate => {
            for row in rows {
                docx = docx.add_table(frame(vec![row])).add_paragraph(Paragraph::new());
            }
        }
        PairLayout::Continuous => {
            let row_height = cm_to_twips(CONTINUOUS_ROW_CM) as f32;
            let rows = rows.into_iter().map(|row| row.row_height(row_height)).collect();
            docx = docx.add_table(frame(rows));
        }
    }
    debug!("Paired {} of {} images with tables", matched.len(), images.len());

    Ok(Assembly {
        document: DocumentOutput::new(first.stem(), pack(docx)?),
        notices,
    })
}

fn image_cell(image: &InputFile, options: &PairOptions, notices: &mut Vec<Notice>) -> TableCell {
    match ImageAsset::decode(image) {
        Ok(asset) => {
            let cell = TableCell::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_image(asset.picture(options.image_width_cm, None))));
            if options.show_filename {
                cell.add_paragraph(Paragraph::new().add_run(text_run(asset.label(), CAPTION_SIZE)).align(AlignmentType::Center))
            } else {
                cell
            }
        }
        Err(error) => {
            warn!("{}", error);
            notices.push(Notice::new(&image.name, error.to_string()));
            TableCell::new().add_paragraph(Paragraph::new().add_run(text_run(&error.to_string(), BODY_SIZE)))
        }
    }
}

fn table_cell(companion: &InputFile, width_twips: usize, layout: PairLayout, notices: &mut Vec<Notice>) -> TableCell {
    match read_first_table(&companion.bytes) {
        Ok(table) if table.column_count() > 0 => {
            let nested = nested_table(&table, width_twips);
            let nested = match layout {
                PairLayout::Separate => nested.set_borders(table_borders()),
                PairLayout::Continuous => nested,
            };
            // a cell must end with a paragraph
            TableCell::new().add_table(nested).add_paragraph(Paragraph::new())
        }
        Ok(_) => table_error(companion, "Table has no cells", notices),
        Err(error) => table_error(companion, &error.to_string(), notices),
    }
}

fn table_error(companion: &InputFile, reason: &str, notices: &mut Vec<Notice>) -> TableCell {
    let message = format!("Error loading table: {}", reason);
    warn!("{}: {}", companion.name, message);
    notices.push(Notice::new(&companion.name, message.to_owned()));
    TableCell::new().add_paragraph(Paragraph::new().add_run(text_run(&message, BODY_SIZE)))
}

/// Copies a companion table cell by cell and run by run.
fn nested_table(table: &CompanionTable, width_twips: usize) -> Table {
    let columns = table.column_count();
    let rows = table
        .rows
        .iter()
        .map(|row| TableRow::new(row.iter().map(copy_cell).collect()))
        .collect();
    Table::new(rows).set_grid(vec![width_twips / columns; columns])
}

fn copy_cell(cell: &CompanionCell) -> TableCell {
    let copy = if cell.paragraphs.is_empty() {
        TableCell::new().add_paragraph(Paragraph::new())
    } else {
        cell.paragraphs.iter().fold(TableCell::new(), |copy, paragraph| {
            copy.add_paragraph(paragraph.runs.iter().fold(Paragraph::new(), |p, run| p.add_run(copy_run(run))))
        })
    };
    bordered(copy)
}

/// Unset font and size fall back to Times New Roman 12 pt.
fn copy_run(run: &CompanionRun) -> Run {
    let format = &run.format;
    let mut copy = Run::new()
        .fonts(fonts(format.font.as_deref().unwrap_or(FONT_NAME)))
        .size(format.size.unwrap_or(BODY_SIZE));
    if format.bold == Some(true) {
        copy = copy.bold();
    }
    if format.italic == Some(true) {
        copy = copy.italic();
    }
    if let Some(underline) = &format.underline {
        copy = copy.underline(underline.as_str());
    }
    for (index, line) in run.text.split('\n').enumerate() {
        if index > 0 {
            copy = copy.add_break(BreakType::TextWrapping);
        }
        for (index, part) in line.split('\t').enumerate() {
            if index > 0 {
                copy = copy.add_tab();
            }
            if !part.is_empty() {
                copy = copy.add_text(part);
            }
        }
    }
    copy
}
