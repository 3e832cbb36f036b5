//! Per-item orchestration of the three conversions.
//!
//! Every input is processed on its own: a failing file becomes a failed
//! [`Outcome`] carrying a user-facing message, and the remaining files are
//! still converted.
use crate::config::GridOptions;
use crate::config::PairOptions;
use crate::config::TransformOptions;
use crate::document::grid;
use crate::document::paired;
use crate::document::sheet_table;
use crate::document::Assembly;
use crate::document::DocumentOutput;
use crate::error::ResultMessage;
use crate::error::SheetDocError;
use crate::input::InputFile;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::read_rows;
use crate::table::pipeline::process;
use crate::table::substitution::SubstitutionMap;
use crate::table::DisplayTable;
use crate::table::Table;
use log::info;
use log::warn;

/// Result of processing one input item.
#[derive(Debug)]
pub struct Outcome<T> {
    /// Name of the input file
    pub item: String,
    pub result: Result<T, SheetDocError>,
}

/// Outcomes of a batch in input order.
#[derive(Debug)]
pub struct Batch<T> {
    pub outcomes: Vec<Outcome<T>>,
}

impl<T> Batch<T> {
    pub fn successes(&self) -> impl Iterator<Item = &T> + '_ {
        self.outcomes.iter().filter_map(|outcome| outcome.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SheetDocError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err().map(|error| (outcome.item.as_str(), error)))
    }

    /// Messages of all failures, ready to show to the user.
    pub fn messages(&self) -> Vec<String> {
        self.failures().map(|(_, error)| error.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// A converted spreadsheet: the processed table and its document.
#[derive(Clone, Debug)]
pub struct Converted {
    pub table: DisplayTable,
    pub document: DocumentOutput,
}

/// Converts every spreadsheet into its own document.
///
/// # Arguments
///
/// * `inputs` - Spreadsheet files in the order they were given
/// * `substitutions` - Replacement rules applied to every table
/// * `options` - Pipeline options, validated before any file is read
/// * `criteria` - Sheet selection and error cell handling
///
/// # Returns
///
/// * `Result<Batch<Converted>, SheetDocError>` - One outcome per input, or an
///   error when `options` are out of range
pub fn convert_spreadsheets(
    inputs: &[InputFile],
    substitutions: &SubstitutionMap,
    options: &TransformOptions,
    criteria: &Criteria,
) -> Result<Batch<Converted>, SheetDocError> {
    options.validate()?;
    let outcomes = inputs
        .iter()
        .map(|input| {
            let result = convert_spreadsheet(input, substitutions, options, criteria)
                .with_prefix(&format!("Error processing {}", input.name));
            match &result {
                Ok(converted) => info!("{} converted into {}", input.name, converted.document.file_name),
                Err(error) => warn!("{}", error),
            }
            Outcome {
                item: input.name.to_owned(),
                result,
            }
        })
        .collect();
    Ok(Batch { outcomes })
}

fn convert_spreadsheet(
    input: &InputFile,
    substitutions: &SubstitutionMap,
    options: &TransformOptions,
    criteria: &Criteria,
) -> Result<Converted, SheetDocError> {
    let rows = read_rows(input, criteria)?;
    let table = process(Table::from_rows(&input.name, rows, criteria.header), substitutions, options);
    let document = sheet_table::render(&table, input.stem())?;
    Ok(Converted { table, document })
}

/// Loads substitution rules from a two-column spreadsheet.
pub fn load_substitutions(input: &InputFile) -> Result<SubstitutionMap, SheetDocError> {
    let map = SubstitutionMap::load(input).with_prefix(&format!("Error loading substitutions from {}", input.name))?;
    info!("Loaded {} substitutions from {}", map.len(), input.name);
    Ok(map)
}

/// Builds the image grid document.
pub fn build_image_grid(images: &[InputFile], options: &GridOptions) -> Result<Assembly, SheetDocError> {
    let assembly = grid::render(images, options).with_prefix("Error creating image grid")?;
    info!("Image grid written to {}", assembly.document.file_name);
    Ok(assembly)
}

/// Builds the document pairing images with companion tables.
pub fn build_paired_document(
    images: &[InputFile],
    companions: &[InputFile],
    options: &PairOptions,
) -> Result<Assembly, SheetDocError> {
    let assembly = paired::render(images, companions, options).with_prefix("Error creating paired document")?;
    info!("Paired document written to {}", assembly.document.file_name);
    Ok(assembly)
}
