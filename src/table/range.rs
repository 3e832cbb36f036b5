use crate::error::SheetDocError;
use crate::spreadsheet::reference::col_to_index;
use regex::Regex;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to column range parsing.
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid column range format '{0}'")]
    FormatError(String),

    #[error("Invalid column range {0}-{1}: columns are numbered from 1 and the start must not exceed the end")]
    BoundError(usize, usize),
}

/// A 1-based, inclusive range of column positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    pub fn new(start: usize, end: usize) -> Result<Self, SheetDocError> {
        if start == 0 || start > end {
            Err(RangeError::BoundError(start, end))?
        }
        Ok(ColumnRange { start, end })
    }

    /// Zero-based positions covered by the range, clamped to `len` columns.
    /// Empty when the range lies entirely beyond the last column.
    pub fn indexes(&self, len: usize) -> std::ops::Range<usize> {
        let lower = (self.start - 1).min(len);
        let upper = self.end.min(len);
        lower..upper
    }
}

impl FromStr for ColumnRange {
    type Err = SheetDocError;

    /// Parses "2", "2:4", "2-4" or letter forms such as "B:D".
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let pattern = Regex::new(r"^\s*([A-Za-z]+|\d+)\s*(?:[:-]\s*([A-Za-z]+|\d+))?\s*$").expect("Hardcode regex pattern");
        let captures = pattern
            .captures(value)
            .ok_or_else(|| RangeError::FormatError(value.to_owned()))?;
        let position = |text: &str| -> Result<usize, SheetDocError> {
            if text.starts_with(|c: char| c.is_ascii_digit()) {
                Ok(text.parse::<usize>()?)
            } else {
                col_to_index(text)
                    .map(|index| index + 1)
                    .ok_or_else(|| RangeError::FormatError(value.to_owned()).into())
            }
        };
        let start = position(&captures[1])?;
        let end = match captures.get(2) {
            Some(end) => position(end.as_str())?,
            None => start,
        };
        ColumnRange::new(start, end)
    }
}

impl Display for ColumnRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
