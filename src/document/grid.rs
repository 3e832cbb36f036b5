use crate::config::GridOptions;
use crate::document::bordered;
use crate::document::new_document;
use crate::document::pack;
use crate::document::picture::ImageAsset;
use crate::document::text_run;
use crate::document::Assembly;
use crate::document::DocumentError;
use crate::document::DocumentOutput;
use crate::document::Notice;
use crate::document::BODY_SIZE;
use crate::document::CAPTION_SIZE;
use crate::document::TEXT_WIDTH_TWIPS;
use crate::error::SheetDocError;
use crate::input::InputFile;
use docx_rs::AlignmentType;
use docx_rs::Paragraph;
use docx_rs::Run;
use docx_rs::Table;
use docx_rs::TableCell;
use docx_rs::TableLayoutType;
use docx_rs::TableRow;
use docx_rs::WidthType;
use log::debug;
use log::warn;

/// Arranges images row by row into a bordered `rows × cols` table.
///
/// Images beyond the grid capacity are left out and reported as notices.
/// An image that cannot be decoded leaves an error text in its cell.
pub fn render(images: &[InputFile], options: &GridOptions) -> Result<Assembly, SheetDocError> {
    options.validate()?;
    let first = images.first().ok_or(DocumentError::NoImagesError)?;

    let capacity = options.capacity();
    let mut notices: Vec<Notice> = images
        .iter()
        .skip(capacity)
        .map(|image| {
            Notice::new(
                &image.name,
                format!(
                    "Image {} does not fit the {}x{} grid and was left out",
                    image.name, options.rows, options.cols
                ),
            )
        })
        .collect();

    let column_twips = TEXT_WIDTH_TWIPS * options.width_percent as usize / 100 / options.cols;
    let mut cells = images.iter().take(capacity).map(|image| {
        ImageAsset::decode(image).map_err(|error| (image.name.as_str(), error))
    });
    let rows = (0..options.rows)
        .map(|_| {
            let row = (0..options.cols)
                .map(|_| {
                    let cell = match cells.next() {
                        Some(Ok(asset)) => image_cell(&asset, options),
                        Some(Err((name, error))) => {
                            warn!("{}", error);
                            notices.push(Notice::new(name, error.to_string()));
                            TableCell::new().add_paragraph(Paragraph::new().add_run(text_run(&error.to_string(), BODY_SIZE)))
                        }
                        None => TableCell::new().add_paragraph(Paragraph::new()),
                    };
                    bordered(cell.width(column_twips, WidthType::Dxa))
                })
                .collect();
            TableRow::new(row)
        })
        .collect();

    let table = Table::new(rows)
        .width(options.width_percent as usize * 50, WidthType::Pct)
        .layout(TableLayoutType::Fixed)
        .set_grid(vec![column_twips; options.cols]);
    let bytes = pack(new_document().add_table(table))?;
    debug!("Placed {} images in a {}x{} grid", images.len().min(capacity), options.rows, options.cols);

    Ok(Assembly {
        document: DocumentOutput::new(first.stem(), bytes),
        notices,
    })
}

fn image_cell(asset: &ImageAsset, options: &GridOptions) -> TableCell {
    let picture = Paragraph::new()
        .add_run(Run::new().add_image(asset.picture(options.image_width_cm, options.image_height_cm)))
        .align(AlignmentType::Center);
    let cell = TableCell::new().add_paragraph(picture);
    if options.show_filename {
        cell.add_paragraph(Paragraph::new().add_run(text_run(asset.label(), CAPTION_SIZE)).align(AlignmentType::Center))
    } else {
        cell
    }
}
