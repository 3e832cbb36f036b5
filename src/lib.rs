//! # Spreadsheet to Word Converter
//!
//! Turns spreadsheet tables and images into formatted Word (`.docx`) documents.
//!
//! ## Features
//!
//! - **Table conversion**: Read `.xlsx`, `.xlsm` and `.ods` files, trim trailing rows,
//!   drop a column range, substitute exact values and round numeric columns, then
//!   write one bordered Times New Roman table per file
//! - **Substitution maps**: Load exact-match replacement rules from a two-column spreadsheet
//! - **Image grids**: Arrange images in a bordered grid with optional file name captions
//! - **Image and table pairs**: Place each image next to the first table of the Word
//!   document sharing its base name, keeping bold, italic, underline, font and size
//! - **Per-item failures**: One broken file never stops a batch; every failure and
//!   warning is reported with a short message
//!
//! ## Conversions
//!
//! - [`batch::convert_spreadsheets`]: one document per spreadsheet
//! - [`batch::build_image_grid`]: one document with an image grid
//! - [`batch::build_paired_document`]: one document with images and their tables
pub mod batch;
pub mod config;
pub mod document;
pub mod error;
mod helpers;
pub mod input;
pub mod preview;
pub mod spreadsheet;
pub mod table;

pub use crate::batch::Batch;
pub use crate::batch::Converted;
pub use crate::batch::Outcome;
pub use crate::config::GridOptions;
pub use crate::config::PairLayout;
pub use crate::config::PairOptions;
pub use crate::config::TransformOptions;
pub use crate::document::Assembly;
pub use crate::document::DocumentOutput;
pub use crate::document::Notice;
pub use crate::error::SheetDocError;
pub use crate::input::InputFile;
pub use crate::spreadsheet::criteria::Criteria;
pub use crate::table::range::ColumnRange;
pub use crate::table::substitution::SubstitutionMap;
pub use crate::table::DisplayTable;
