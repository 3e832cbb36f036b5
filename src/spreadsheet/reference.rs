//! Conversions between zero-based indexes and A1-style cell references.

/// Converts a zero-based column index to its letter name (0 -> "A", 26 -> "AA").
pub(crate) fn index_to_col(col: usize) -> String {
    let mut name = Vec::<u8>::new();
    let mut number = col + 1;
    while number > 0 {
        let remainder = (number - 1) % 26;
        name.push(b'A' + remainder as u8);
        number = (number - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Converts zero-based row and column indexes to a reference such as "B3".
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}

/// Converts a column name ("A", "ab") to its zero-based index.
/// Returns None for empty or non-alphabetic input.
pub(crate) fn col_to_index(name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for character in name.chars() {
        if !character.is_ascii_alphabetic() {
            return None;
        }
        let digit = (character.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Converts a one-based row number ("1") to its zero-based index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Converts a reference such as "B3" to zero-based (row, col) indexes.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (col, row) = reference.split_at(split);
    Some((row_to_index(row)?, col_to_index(col)?))
}
