//! In-memory tables and the transformation pipeline that turns them into
//! display text ready for document rendering.
pub mod column;
pub mod format;
pub mod pipeline;
pub mod range;
pub mod substitution;

use std::collections::HashMap;
use std::fmt::Display;

/// A typed cell value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

impl Display for Value {
    /// Natural text of the value: integral numbers have no fraction,
    /// booleans are `True`/`False`, empty is the empty string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Number(number) => write!(f, "{}", number),
            Value::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

/// A named column of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// Ordered columns of equal length.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Creates a table, padding shorter columns with `Value::Empty`.
    pub fn new(name: &str, mut columns: Vec<Column>) -> Self {
        let rows = columns.iter().map(|column| column.values.len()).max().unwrap_or(0);
        for column in &mut columns {
            column.values.resize(rows, Value::Empty);
        }
        Table {
            name: name.to_owned(),
            columns,
        }
    }

    /// Builds a table from a grid of rows.
    ///
    /// With `header` the first row supplies column names: empty names become
    /// `Unnamed: {index}` and repeated names get `.1`, `.2` suffixes. Without
    /// it columns are named by their zero-based position.
    pub fn from_rows(name: &str, rows: Vec<Vec<Value>>, header: bool) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows = rows.into_iter();
        let names = if header {
            let first = rows.next().unwrap_or_default();
            column_names(&first, width)
        } else {
            (0..width).map(|index| index.to_string()).collect()
        };

        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column { name, values: Vec::new() })
            .collect();
        for row in rows {
            let mut row = row.into_iter();
            for column in &mut columns {
                column.values.push(row.next().unwrap_or_default());
            }
        }
        Table::new(name, columns)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|column| column.values.len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }
}

fn column_names(header: &[Value], width: usize) -> Vec<String> {
    let mut seen = HashMap::<String, usize>::new();
    (0..width)
        .map(|index| {
            let name = match header.get(index) {
                None | Some(Value::Empty) => format!("Unnamed: {index}"),
                Some(value) => value.to_string(),
            };
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 { name } else { format!("{name}.{count}") };
            *count += 1;
            unique
        })
        .collect()
}

/// Table whose every cell is display text. Produced by the pipeline and
/// consumed by document rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
