use crate::table::Value;

/// Kind of data held by a column, detected from its values.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColumnType {
    /// No value at all
    Empty,
    /// Booleans only
    Boolean,
    /// Numbers only
    Number,
    /// Text only
    Text,
    /// More than one kind of value
    Mixed,
}

impl ColumnType {
    /// Type of a single value, None for empty values.
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Empty => None,
            Value::Bool(_) => Some(ColumnType::Boolean),
            Value::Number(_) => Some(ColumnType::Number),
            Value::Text(_) => Some(ColumnType::Text),
        }
    }

    /// Detects the column type, ignoring empty values.
    pub fn detect<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        values
            .into_iter()
            .filter_map(Self::of)
            .fold(ColumnType::Empty, |detected, kind| match detected {
                ColumnType::Empty => kind,
                _ if detected == kind => detected,
                _ => ColumnType::Mixed,
            })
    }

    /// Numeric columns get fixed-point formatting. A column with no values
    /// counts as numeric since it can only render missing markers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Empty | ColumnType::Number)
    }
}
