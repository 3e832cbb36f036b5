//! Options of the three conversions.
//!
//! Every option struct has the defaults of the interactive tool it replaces
//! and a `validate` method enforcing the accepted bounds. Option values are
//! plain data passed into the conversion functions; nothing here is global.
use crate::error::SheetDocError;
use crate::table::range::ColumnRange;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Option '{name}' is {value}, expected a value between {min} and {max}")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("Unknown layout '{0}', expected 'separate' or 'continuous'")]
    LayoutError(String),
}

/// Fails with [`ConfigError::OutOfRange`] when `value` is outside `min..=max`,
/// NaN included.
fn check_range<T: PartialOrd + Display + Copy>(name: &'static str, value: T, min: T, max: T) -> Result<(), SheetDocError> {
    if !(min..=max).contains(&value) {
        Err(ConfigError::OutOfRange {
            name,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        })?
    }
    Ok(())
}

/// Options of the spreadsheet table pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformOptions {
    /// Number of trailing rows to remove
    pub trim_rows: Option<usize>,
    /// Column positions to remove
    pub drop_columns: Option<ColumnRange>,
    /// Decimals for numeric columns; None keeps numbers as they are
    pub decimals: Option<usize>,
}

impl TransformOptions {
    pub const MAX_TRIM_ROWS: usize = 100;
    pub const MAX_COLUMN: usize = 50;
    pub const MAX_DECIMALS: usize = 6;

    pub fn validate(&self) -> Result<(), SheetDocError> {
        if let Some(rows) = self.trim_rows {
            check_range("trim_rows", rows, 1, Self::MAX_TRIM_ROWS)?;
        }
        if let Some(range) = self.drop_columns {
            check_range("drop_columns.start", range.start, 1, Self::MAX_COLUMN)?;
            check_range("drop_columns.end", range.end, range.start, Self::MAX_COLUMN)?;
        }
        if let Some(decimals) = self.decimals {
            check_range("decimals", decimals, 0, Self::MAX_DECIMALS)?;
        }
        Ok(())
    }
}

/// Options of the image grid document.
#[derive(Clone, Debug, PartialEq)]
pub struct GridOptions {
    pub rows: usize,
    pub cols: usize,
    /// Table width as percentage of the text width
    pub width_percent: u32,
    pub image_width_cm: f64,
    /// Fixed image height; None keeps the aspect ratio
    pub image_height_cm: Option<f64>,
    /// Caption each image with its file name without extension
    pub show_filename: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            rows: 1,
            cols: 3,
            width_percent: 100,
            image_width_cm: 5.0,
            image_height_cm: None,
            show_filename: true,
        }
    }
}

impl GridOptions {
    pub const MAX_ROWS: usize = 20;
    pub const MAX_COLS: usize = 10;

    /// Defaults for a number of images: one row, as many columns as images up to three.
    pub fn for_images(count: usize) -> Self {
        GridOptions {
            cols: count.clamp(1, 3),
            ..GridOptions::default()
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    pub fn validate(&self) -> Result<(), SheetDocError> {
        check_range("rows", self.rows, 1, Self::MAX_ROWS)?;
        check_range("cols", self.cols, 1, Self::MAX_COLS)?;
        check_range("width_percent", self.width_percent, 1, 100)?;
        check_range("image_width_cm", self.image_width_cm, MIN_IMAGE_CM, MAX_IMAGE_CM)?;
        if let Some(height) = self.image_height_cm {
            check_range("image_height_cm", height, MIN_IMAGE_CM, MAX_IMAGE_CM)?;
        }
        Ok(())
    }
}

/// Smallest accepted image or column size in centimetres.
pub const MIN_IMAGE_CM: f64 = 0.5;
/// Largest accepted image or column size in centimetres.
pub const MAX_IMAGE_CM: f64 = 30.0;

/// How paired image/table items are laid out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PairLayout {
    /// One two-column table per item, separated by empty paragraphs
    #[default]
    Separate,
    /// A single table with one row per item
    Continuous,
}

impl FromStr for PairLayout {
    type Err = SheetDocError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "separate" => Ok(PairLayout::Separate),
            "continuous" => Ok(PairLayout::Continuous),
            _ => Err(ConfigError::LayoutError(value.to_owned()))?,
        }
    }
}

/// Options of the image and companion table document.
#[derive(Clone, Debug, PartialEq)]
pub struct PairOptions {
    /// Width of the image column
    pub image_width_cm: f64,
    /// Width of the table column
    pub table_width_cm: f64,
    pub show_filename: bool,
    pub layout: PairLayout,
}

impl Default for PairOptions {
    fn default() -> Self {
        PairOptions {
            image_width_cm: 5.0,
            table_width_cm: 15.0,
            show_filename: false,
            layout: PairLayout::Separate,
        }
    }
}

impl PairOptions {
    pub fn validate(&self) -> Result<(), SheetDocError> {
        check_range("image_width_cm", self.image_width_cm, MIN_IMAGE_CM, MAX_IMAGE_CM)?;
        check_range("table_width_cm", self.table_width_cm, MIN_IMAGE_CM, MAX_IMAGE_CM)?;
        Ok(())
    }
}
