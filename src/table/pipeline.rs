//! The fixed table transformation sequence.
//!
//! 1. remove trailing rows
//! 2. remove a range of columns
//! 3. substitute exact matches in column names and cells
//! 4. render cells as text, rounding numeric columns when requested
//! 5. turn missing markers into `-`
//!
//! Row order is never changed.
use crate::config::TransformOptions;
use crate::table::column::ColumnType;
use crate::table::format::format_fixed;
use crate::table::format::MISSING;
use crate::table::range::ColumnRange;
use crate::table::substitution::SubstitutionMap;
use crate::table::DisplayTable;
use crate::table::Table;
use crate::table::Value;
use log::debug;

/// Texts treated as missing values in the final output.
const MISSING_MARKERS: [&str; 4] = ["", "nan", "NaN", "NaT"];

/// Runs every step in order.
pub fn process(mut table: Table, substitutions: &SubstitutionMap, options: &TransformOptions) -> DisplayTable {
    if let Some(rows) = options.trim_rows {
        trim_trailing_rows(&mut table, rows);
    }
    if let Some(range) = options.drop_columns {
        drop_columns(&mut table, range);
    }
    apply_substitutions(&mut table, substitutions);
    let mut display = render(&table, options.decimals);
    normalize_missing(&mut display);
    debug!(
        "{}: {} columns and {} rows after processing",
        table.name,
        display.header.len(),
        display.rows.len()
    );
    display
}

/// Removes the last `count` rows; every row when `count` exceeds the row count.
pub fn trim_trailing_rows(table: &mut Table, count: usize) {
    let keep = table.row_count().saturating_sub(count);
    for column in &mut table.columns {
        column.values.truncate(keep);
    }
}

/// Removes the columns at the 1-based positions of `range`.
/// Positions beyond the last column are ignored.
pub fn drop_columns(table: &mut Table, range: ColumnRange) {
    let indexes = range.indexes(table.column_count());
    table.columns.drain(indexes);
}

/// Replaces column names and cell values that exactly match a rule.
pub fn apply_substitutions(table: &mut Table, substitutions: &SubstitutionMap) {
    if substitutions.is_empty() {
        return;
    }
    for column in &mut table.columns {
        if let Some(name) = substitutions.get_header(&column.name) {
            column.name = name;
        }
        for value in &mut column.values {
            if let Some(replacement) = substitutions.get(value) {
                *value = replacement.clone();
            }
        }
    }
}

/// Renders every cell as text. With `decimals`, numeric columns use
/// [`format_fixed`]; other columns and the no-rounding case use the
/// natural text of each value.
pub fn render(table: &Table, decimals: Option<usize>) -> DisplayTable {
    let header = table.columns.iter().map(|column| column.name.to_owned()).collect();
    let columns: Vec<Vec<String>> = table
        .columns
        .iter()
        .map(|column| {
            let precision = decimals.filter(|_| ColumnType::detect(&column.values).is_numeric());
            column
                .values
                .iter()
                .map(|value| match (value, precision) {
                    (Value::Number(number), Some(precision)) => format_fixed(*number, precision),
                    (Value::Empty, Some(_)) => MISSING.to_owned(),
                    (Value::Number(number), None) if !number.is_finite() => MISSING.to_owned(),
                    (value, _) => value.to_string(),
                })
                .collect()
        })
        .collect();

    let rows = (0..table.row_count())
        .map(|row| columns.iter().map(|column| column[row].to_owned()).collect())
        .collect();
    DisplayTable { header, rows }
}

/// Replaces missing markers with `-`. Applying it twice changes nothing.
pub fn normalize_missing(table: &mut DisplayTable) {
    for cell in table.rows.iter_mut().flatten() {
        if MISSING_MARKERS.contains(&cell.as_str()) {
            *cell = MISSING.to_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table(names: &[&str], rows: usize) -> Table {
        let columns = names
            .iter()
            .map(|name| Column {
                name: name.to_string(),
                values: (0..rows).map(|row| Value::from(format!("{name}{row}").as_str())).collect(),
            })
            .collect();
        Table::new("test", columns)
    }

    #[test]
    fn trim_keeps_leading_rows() {
        let mut t = table(&["A", "B"], 5);
        trim_trailing_rows(&mut t, 2);
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.columns[0].values.last(), Some(&Value::from("A2")));

        trim_trailing_rows(&mut t, 0);
        assert_eq!(t.row_count(), 3);

        trim_trailing_rows(&mut t, 10);
        assert_eq!(t.row_count(), 0);
        assert_eq!(t.column_count(), 2);
    }

    #[test]
    fn drop_removes_exact_positions() {
        let mut t = table(&["A", "B", "C", "D"], 1);
        drop_columns(&mut t, ColumnRange { start: 2, end: 3 });
        assert_eq!(t.column_names(), vec!["A", "D"]);

        let mut t = table(&["A", "B", "C"], 1);
        drop_columns(&mut t, ColumnRange { start: 3, end: 10 });
        assert_eq!(t.column_names(), vec!["A", "B"]);

        let mut t = table(&["A", "B"], 1);
        drop_columns(&mut t, ColumnRange { start: 5, end: 6 });
        assert_eq!(t.column_names(), vec!["A", "B"]);
    }

    #[test]
    fn substitution_touches_only_keys() {
        let mut t = Table::new("test", vec![
            Column { name: "A".to_owned(), values: vec![Value::from("A"), Value::from("x"), Value::Number(1.0), Value::Empty] },
            Column { name: "B".to_owned(), values: vec![Value::from("AB"), Value::from("a"), Value::Bool(true), Value::Empty] },
        ]);
        let map = SubstitutionMap::from_pairs(vec![
            (Value::from("A"), Value::from("Alpha")),
            (Value::Number(1.0), Value::from("one")),
        ]);
        apply_substitutions(&mut t, &map);
        assert_eq!(t.column_names(), vec!["Alpha", "B"]);
        assert_eq!(t.columns[0].values, vec![Value::from("Alpha"), Value::from("x"), Value::from("one"), Value::Empty]);
        assert_eq!(t.columns[1].values, vec![Value::from("AB"), Value::from("a"), Value::from("one"), Value::Empty]);
    }

    #[test]
    fn render_rounds_numeric_columns_only() {
        let t = Table::new("test", vec![
            Column { name: "n".to_owned(), values: vec![Value::Number(1234.5), Value::Empty, Value::Number(-0.126)] },
            Column { name: "m".to_owned(), values: vec![Value::Number(1234.5), Value::from("x"), Value::Bool(false)] },
        ]);
        let display = render(&t, Some(2));
        assert_eq!(display.header, vec!["n", "m"]);
        assert_eq!(display.rows, vec![
            vec!["1,234,50", "1234.5"],
            vec!["-", "x"],
            vec!["-0,13", "False"],
        ]);
    }

    #[test]
    fn render_without_rounding_keeps_natural_text() {
        let t = Table::new("test", vec![
            Column { name: "n".to_owned(), values: vec![Value::Number(3.0), Value::Number(2.75), Value::Empty] },
        ]);
        let display = render(&t, None);
        assert_eq!(display.rows, vec![vec!["3"], vec!["2.75"], vec![""]]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut display = DisplayTable {
            header: vec!["nan".to_owned()],
            rows: vec![
                vec!["".to_owned()],
                vec!["nan".to_owned()],
                vec!["NaN".to_owned()],
                vec!["NaT".to_owned()],
                vec!["NAN".to_owned()],
                vec!["value".to_owned()],
            ],
        };
        normalize_missing(&mut display);
        let once = display.clone();
        normalize_missing(&mut display);
        assert_eq!(display, once);
        assert_eq!(display.header, vec!["nan"]);
        let cells: Vec<&str> = display.rows.iter().map(|row| row[0].as_str()).collect();
        assert_eq!(cells, vec!["-", "-", "-", "-", "NAN", "value"]);
    }

    #[test]
    fn three_columns_end_to_end() {
        let rows = vec![
            vec![Value::from("A"), Value::from("B"), Value::from("C")],
            vec![Value::from("a1"), Value::from("b1"), Value::from("c1")],
            vec![Value::from("a2"), Value::from("b2"), Value::from("c2")],
            vec![Value::from("a3"), Value::from("b3"), Value::from("c3")],
            vec![Value::from("a4"), Value::from("b4"), Value::Empty],
            vec![Value::from("a5"), Value::from("b5"), Value::from("c5")],
        ];
        let table = Table::from_rows("test", rows, true);
        let map = SubstitutionMap::from_pairs(vec![(Value::from("A"), Value::from("Alpha"))]);
        let options = TransformOptions {
            trim_rows: Some(1),
            drop_columns: Some(ColumnRange { start: 2, end: 2 }),
            decimals: None,
        };
        let display = process(table, &map, &options);
        assert_eq!(display.header, vec!["Alpha", "C"]);
        assert_eq!(display.rows, vec![
            vec!["a1", "c1"],
            vec!["a2", "c2"],
            vec!["a3", "c3"],
            vec!["a4", "-"],
        ]);
    }
}
