//! Plain-text previews shown before documents are written.
use crate::config::GridOptions;
use crate::document::companion::read_first_table;
use crate::document::companion::CompanionCell;
use crate::document::paired::match_companions;
use crate::input::InputFile;
use crate::table::substitution::SubstitutionMap;
use crate::table::DisplayTable;
use std::fmt::Write;

const EMPTY_CELL: &str = "(empty)";

/// Images, counted from the first, whose companion table is drawn.
const PAIRING_TABLES: usize = 5;

/// Draws the header and up to `max_rows` rows as aligned text columns.
pub fn render_table(table: &DisplayTable, max_rows: usize) -> String {
    let shown = &table.rows[..table.rows.len().min(max_rows)];
    let widths: Vec<usize> = (0..table.header.len())
        .map(|column| {
            std::iter::once(&table.header)
                .chain(shown.iter())
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(column, width)| {
                let cell = cells.get(column).map(String::as_str).unwrap_or_default();
                format!("{cell:<width$}")
            })
            .collect();
        padded.join(" | ").trim_end().to_owned()
    };

    let mut text = String::new();
    let _ = writeln!(text, "{}", line(&table.header));
    let _ = writeln!(text, "{}", widths.iter().map(|width| "-".repeat(*width)).collect::<Vec<_>>().join("-+-"));
    for row in shown {
        let _ = writeln!(text, "{}", line(row));
    }
    let hidden = table.rows.len() - shown.len();
    if hidden > 0 {
        let _ = writeln!(text, "... {hidden} more rows");
    }
    text
}

/// Shows which image lands in which grid cell, row by row.
pub fn render_grid_plan(names: &[&str], options: &GridOptions) -> String {
    let mut text = String::new();
    let mut names_iter = names.iter();
    for row in 1..=options.rows {
        let cells: Vec<&str> = (0..options.cols)
            .map(|_| names_iter.next().copied().unwrap_or(EMPTY_CELL))
            .collect();
        let _ = writeln!(text, "row {row}: {}", cells.join(" | "));
    }
    let left_out: Vec<&str> = names_iter.copied().collect();
    if !left_out.is_empty() {
        let _ = writeln!(text, "not placed: {}", left_out.join(", "));
    }
    text
}

/// Rule count followed by every rule as a two-column table.
pub fn render_substitutions(substitutions: &SubstitutionMap) -> String {
    let table = DisplayTable {
        header: vec!["Find".to_owned(), "Replace".to_owned()],
        rows: substitutions
            .iter()
            .map(|(old, new)| vec![old.to_string(), new.to_string()])
            .collect(),
    };
    format!(
        "Loaded {} substitution rules\n{}",
        substitutions.len(),
        render_table(&table, table.rows.len())
    )
}

/// Lists every image with its companion document or the reason it is skipped.
/// The first table of the companions of the first five images is drawn below
/// their line, or the reason it could not be read.
pub fn render_pairing(images: &[InputFile], companions: &[InputFile]) -> String {
    let mut text = String::new();
    for (index, pairing) in match_companions(images, companions).iter().enumerate() {
        let Some(companion) = pairing.companion else {
            let _ = writeln!(text, "{} -> No matching table found for image: {}", pairing.image.name, pairing.image.name);
            continue;
        };
        let _ = writeln!(text, "{} -> {}", pairing.image.name, companion.name);
        if index < PAIRING_TABLES {
            text.push_str(&render_companion(companion));
        }
    }
    text
}

/// First table of a companion document, its first row as header.
fn render_companion(companion: &InputFile) -> String {
    let table = match read_first_table(&companion.bytes) {
        Ok(table) => table,
        Err(error) => return format!("Error loading table: {error}\n"),
    };
    let cell_text = |cell: &CompanionCell| cell.text().replace('\n', " ");
    let mut rows = table.rows.iter().map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let header = rows.next().unwrap_or_default();
    let table = DisplayTable { header, rows: rows.collect() };
    render_table(&table, table.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::companion::tests::companion_2x2;
    use crate::table::Value;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn table_columns_are_aligned() {
        let table = DisplayTable {
            header: strings(&["Name", "Amount"]),
            rows: vec![strings(&["first", "1,234,50"]), strings(&["x", "-"]), strings(&["y", "2"])],
        };
        let text = render_table(&table, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
            "Name  | Amount",
            "------+---------",
            "first | 1,234,50",
            "x     | -",
            "... 1 more rows",
        ]);
    }

    #[test]
    fn grid_plan_shows_empty_and_left_out_cells() {
        let options = GridOptions { rows: 2, cols: 2, ..GridOptions::default() };
        let text = render_grid_plan(&["a.png", "b.png", "c.png"], &options);
        assert_eq!(text, "row 1: a.png | b.png\nrow 2: c.png | (empty)\n");

        let options = GridOptions { rows: 1, cols: 1, ..GridOptions::default() };
        let text = render_grid_plan(&["a.png", "b.png", "c.png"], &options);
        assert_eq!(text, "row 1: a.png\nnot placed: b.png, c.png\n");
    }

    #[test]
    fn pairing_lists_unmatched_images() {
        let images = vec![InputFile::new("chart1.png", vec![]), InputFile::new("chart2.png", vec![])];
        let companions = vec![InputFile::new("chart1.docx", companion_2x2())];
        assert_eq!(
            render_pairing(&images, &companions),
            "chart1.png -> chart1.docx\n\
             Metric | Value\n\
             -------+------\n\
             Growth | 12%\n\
             chart2.png -> No matching table found for image: chart2.png\n"
        );
    }

    #[test]
    fn pairing_draws_the_first_five_tables() {
        let names = ["a", "b", "c", "d", "e", "f"];
        let images: Vec<InputFile> = names.iter().map(|name| InputFile::new(format!("{name}.png"), vec![])).collect();
        let mut companions: Vec<InputFile> = names.iter().map(|name| InputFile::new(format!("{name}.docx"), companion_2x2())).collect();
        companions[1] = InputFile::new("b.docx", b"not a document".to_vec());

        let text = render_pairing(&images, &companions);
        assert_eq!(text.matches("Growth | 12%").count(), 4);
        assert_eq!(text.matches("Error loading table: ").count(), 1);
        assert!(text.ends_with("e.png -> e.docx\nMetric | Value\n-------+------\nGrowth | 12%\nf.png -> f.docx\n"), "{text}");
    }

    #[test]
    fn substitution_rules_are_counted_and_listed() {
        let substitutions = SubstitutionMap::from_pairs([
            (Value::from("N"), Value::from("North")),
            (Value::Number(1.0), Value::from("one")),
        ]);
        assert_eq!(
            render_substitutions(&substitutions),
            "Loaded 2 substitution rules\n\
             Find | Replace\n\
             -----+--------\n\
             N    | North\n\
             1    | one\n"
        );
    }
}
