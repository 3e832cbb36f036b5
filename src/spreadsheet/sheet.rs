use crate::table::Value;

/// Smallest rectangle holding every stored cell, inclusive on all sides.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct UsedRange {
    pub(crate) top: usize,
    pub(crate) left: usize,
    pub(crate) bottom: usize,
    pub(crate) right: usize,
}

impl UsedRange {
    fn at(row: usize, col: usize) -> Self {
        UsedRange { top: row, left: col, bottom: row, right: col }
    }

    fn extend(&mut self, row: usize, col: usize) {
        self.top = self.top.min(row);
        self.left = self.left.min(col);
        self.bottom = self.bottom.max(row);
        self.right = self.right.max(col);
    }

    fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    fn width(&self) -> usize {
        self.right - self.left + 1
    }
}

/// The decoded, non-empty cells of one sheet.
pub(crate) struct Sheet {
    pub(crate) name: String,
    cells: Vec<(usize, usize, Value)>,
    used: Option<UsedRange>,
}

impl Sheet {
    pub(super) fn new(name: &str) -> Self {
        Sheet { name: name.to_owned(), cells: Vec::new(), used: None }
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn used_range(&self) -> Option<UsedRange> {
        self.used
    }

    /// Stores a cell; zero-based coordinates.
    pub(super) fn put(&mut self, row: usize, col: usize, value: Value) {
        match &mut self.used {
            Some(used) => used.extend(row, col),
            None => self.used = Some(UsedRange::at(row, col)),
        }
        self.cells.push((row, col, value));
    }

    /// Lays the cells out as a dense grid over the used range.
    /// Positions without a cell are `Value::Empty`; later cells win.
    pub(crate) fn into_rows(self) -> Vec<Vec<Value>> {
        let Some(used) = self.used else {
            return Vec::new();
        };
        let mut rows = vec![vec![Value::Empty; used.width()]; used.height()];
        for (row, col, value) in self.cells {
            rows[row - used.top][col - used.left] = value;
        }
        rows
    }
}
