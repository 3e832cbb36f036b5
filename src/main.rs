use anyhow::Context;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use log::LevelFilter;
use rusty_sheetdoc::batch;
use rusty_sheetdoc::preview;
use rusty_sheetdoc::ColumnRange;
use rusty_sheetdoc::Criteria;
use rusty_sheetdoc::DocumentOutput;
use rusty_sheetdoc::GridOptions;
use rusty_sheetdoc::InputFile;
use rusty_sheetdoc::Notice;
use rusty_sheetdoc::PairLayout;
use rusty_sheetdoc::PairOptions;
use rusty_sheetdoc::SubstitutionMap;
use rusty_sheetdoc::TransformOptions;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

/// Rows shown per table with --preview
const PREVIEW_ROWS: usize = 10;

/// Convert spreadsheet tables and images into formatted Word documents.
#[derive(Debug, Parser)]
#[clap(name = "rusty-sheetdoc", version)]
struct Cli {
    /// More log output: -v for info, -vv for debug
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert each spreadsheet into a document with one bordered table
    Convert(ConvertArgs),
    /// Arrange images in a bordered grid
    Grid(GridArgs),
    /// Place images next to the first table of the Word document with the same name
    Pair(PairArgs),
}

/// Arguments shared by all subcommands.
#[derive(Debug, Args)]
struct OutputArgs {
    /// Directory receiving the documents
    #[clap(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Print a text preview instead of writing documents
    #[clap(long)]
    preview: bool,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Spreadsheets to convert (.xlsx, .xlsm, .ods)
    #[clap(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Two-column spreadsheet of exact replacements: old value, new value
    #[clap(long, value_name = "FILE")]
    substitutions: Option<PathBuf>,

    /// Number of trailing rows to remove
    #[clap(long, value_name = "N")]
    trim_rows: Option<usize>,

    /// Columns to remove, 1-based: 2, 2:4, 2-4 or B:D
    #[clap(long, value_name = "RANGE")]
    drop_columns: Option<ColumnRange>,

    /// Round numeric columns to this many decimals
    #[clap(long, value_name = "P")]
    decimals: Option<usize>,

    /// Glob pattern selecting the sheet to read; the first match is used
    #[clap(long, value_name = "PATTERN")]
    sheet: Option<String>,

    /// Read error cells such as #DIV/0! as empty
    #[clap(long)]
    error_as_null: bool,

    #[clap(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct GridArgs {
    /// Images to place (.png, .jpg, .bmp, .gif)
    #[clap(required = true, value_name = "IMAGES")]
    images: Vec<PathBuf>,

    #[clap(long, default_value_t = 1)]
    rows: usize,

    /// Columns of the grid [default: number of images, at most 3]
    #[clap(long)]
    cols: Option<usize>,

    /// Table width as percentage of the page text width
    #[clap(long, default_value_t = 100)]
    width_percent: u32,

    /// Image width in centimetres
    #[clap(long, value_name = "CM", default_value_t = 5.0)]
    image_width: f64,

    /// Fixed image height in centimetres; the aspect ratio is kept when omitted
    #[clap(long, value_name = "CM")]
    image_height: Option<f64>,

    /// Do not caption images with their file names
    #[clap(long)]
    no_filename: bool,

    #[clap(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct PairArgs {
    /// Images to place
    #[clap(long, required = true, num_args = 1.., value_name = "IMAGES")]
    images: Vec<PathBuf>,

    /// Word documents whose first table goes next to the image of the same name
    #[clap(long, num_args = 1.., value_name = "DOCX")]
    tables: Vec<PathBuf>,

    /// Width of the image column in centimetres
    #[clap(long, value_name = "CM", default_value_t = 5.0)]
    image_width: f64,

    /// Width of the table column in centimetres
    #[clap(long, value_name = "CM", default_value_t = 15.0)]
    table_width: f64,

    /// Caption images with their file names
    #[clap(long)]
    show_filename: bool,

    /// separate: one table per image; continuous: one table for all images
    #[clap(long, default_value = "separate")]
    layout: PairLayout,

    #[clap(flatten)]
    output: OutputArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str())).init();

    let result = match cli.command {
        Command::Convert(args) => convert(args),
        Command::Grid(args) => grid(args),
        Command::Pair(args) => pair(args),
    };
    match result {
        Ok(produced) if produced > 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Reads every path; unreadable files are reported and left out.
fn read_inputs(paths: &[PathBuf]) -> Vec<InputFile> {
    paths
        .iter()
        .filter_map(|path| match InputFile::read(path) {
            Ok(input) => Some(input),
            Err(error) => {
                eprintln!("error: Error processing {}: {}", path.display(), error);
                None
            }
        })
        .collect()
}

fn report_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("warning: {}", notice);
    }
}

fn write_document(out_dir: &Path, document: &DocumentOutput) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("Create directory {} failed", out_dir.display()))?;
    let path = out_dir.join(&document.file_name);
    std::fs::write(&path, &document.bytes).with_context(|| format!("Write {} failed", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

/// Returns the number of documents produced or previewed.
fn convert(args: ConvertArgs) -> anyhow::Result<usize> {
    let options = TransformOptions {
        trim_rows: args.trim_rows,
        drop_columns: args.drop_columns,
        decimals: args.decimals,
    };
    let mut criteria = Criteria {
        error_as_null: args.error_as_null,
        ..Criteria::default()
    };
    if let Some(pattern) = &args.sheet {
        criteria = criteria.with_sheet_pattern(pattern)?;
    }

    // a broken substitution file is reported and the conversion goes on without rules
    let substitutions = match &args.substitutions {
        Some(path) => match InputFile::read(path).and_then(|input| batch::load_substitutions(&input)) {
            Ok(map) => map,
            Err(error) => {
                eprintln!("error: {error}");
                SubstitutionMap::new()
            }
        },
        None => SubstitutionMap::new(),
    };
    if args.substitutions.is_some() {
        if args.output.preview {
            println!("{}", preview::render_substitutions(&substitutions));
        } else {
            eprintln!("Loaded {} substitution rules", substitutions.len());
        }
    }

    let inputs = read_inputs(&args.files);
    let batch = batch::convert_spreadsheets(&inputs, &substitutions, &options, &criteria)?;
    for message in batch.messages() {
        eprintln!("error: {message}");
    }

    let mut produced = 0;
    for converted in batch.successes() {
        if args.output.preview {
            println!("{}", converted.document.file_name);
            println!("{}", preview::render_table(&converted.table, PREVIEW_ROWS));
        } else {
            write_document(&args.output.out_dir, &converted.document)?;
        }
        produced += 1;
    }
    Ok(produced)
}

fn grid(args: GridArgs) -> anyhow::Result<usize> {
    let images = read_inputs(&args.images);
    let defaults = GridOptions::for_images(images.len());
    let options = GridOptions {
        rows: args.rows,
        cols: args.cols.unwrap_or(defaults.cols),
        width_percent: args.width_percent,
        image_width_cm: args.image_width,
        image_height_cm: args.image_height,
        show_filename: !args.no_filename,
    };
    options.validate()?;

    if args.output.preview {
        let names: Vec<&str> = images.iter().map(|image| image.name.as_str()).collect();
        print!("{}", preview::render_grid_plan(&names, &options));
        return Ok(1);
    }
    let assembly = batch::build_image_grid(&images, &options)?;
    report_notices(&assembly.notices);
    write_document(&args.output.out_dir, &assembly.document)?;
    Ok(1)
}

fn pair(args: PairArgs) -> anyhow::Result<usize> {
    let options = PairOptions {
        image_width_cm: args.image_width,
        table_width_cm: args.table_width,
        show_filename: args.show_filename,
        layout: args.layout,
    };
    options.validate()?;
    let images = read_inputs(&args.images);
    let companions = read_inputs(&args.tables);

    if args.output.preview {
        print!("{}", preview::render_pairing(&images, &companions));
        return Ok(1);
    }
    let assembly = batch::build_paired_document(&images, &companions, &options)?;
    report_notices(&assembly.notices);
    write_document(&args.output.out_dir, &assembly.document)?;
    Ok(1)
}
