use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use nalgebra::Vector3;

use rusty_chroma::data::loader::load_file;
use rusty_chroma::report::convert::summarize;
use rusty_chroma::report::export::{save_csv, write_csv, write_json};
use rusty_chroma::{
    colour_table, ColorimetricContext, Colour, ColourSpace, ColourTable, FieldSelection, Illuminant, Observer,
    ReportOptions, SpectrumScale, WavelengthUnit,
};

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "rusty-chroma", version, about = "Spectrum to colour: XYZ, Lab, Luv, Hunter Lab, Yxy, Yu'v', sRGB")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the colour report of every spectrum in a JSON file
    Report(ReportArgs),
    /// Express one colour in every supported space
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
struct ViewingArgs {
    /// Illuminant: A, D65, C, D50, D55 or D75
    #[arg(short, long)]
    illuminant: Option<Illuminant>,

    /// Observer viewing angle in degrees: 2 or 10
    #[arg(short, long)]
    angle: Option<u32>,
}

#[derive(Debug, Args)]
struct ReportArgs {
    /// Spectra file (.json)
    file: PathBuf,

    /// JSON file with report options; flags override it
    #[arg(long)]
    options: Option<PathBuf>,

    #[command(flatten)]
    viewing: ViewingArgs,

    /// Wavelength unit of the file: nm or um
    #[arg(short, long)]
    unit: Option<WavelengthUnit>,

    /// Value of a perfect reflector in the file: 1 or 100
    #[arg(short, long)]
    scale: Option<SpectrumScale>,

    /// Comma-separated field titles, e.g. "X,Y,Z,CIELAB-L*,YI"
    #[arg(short, long, value_delimiter = ',')]
    fields: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Decimals of numeric cells
    #[arg(long, default_value_t = 3)]
    precision: usize,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Space the three components are given in
    #[arg(long, value_enum)]
    from: InputSpace,

    /// The three components (sRGB as 0..255)
    #[arg(num_args = 3, allow_negative_numbers = true, required = true)]
    values: Vec<f64>,

    #[command(flatten)]
    viewing: ViewingArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Aligned text table
    Table,
    /// CSV: header "-, names...", one row per field
    Csv,
    /// JSON array of named reports
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputSpace {
    /// CIE XYZ (Y = 100 for white)
    Xyz,
    /// CIE Yxy
    Yxy,
    /// CIELAB
    Lab,
    /// Hunter Lab
    HunterLab,
    /// sRGB, channels 0..255
    Srgb,
    /// CIE Yu'v'
    Yuv,
    /// CIELUV
    Luv,
}

impl InputSpace {
    fn to_space(self) -> ColourSpace {
        match self {
            InputSpace::Xyz => ColourSpace::Xyz,
            InputSpace::Yxy => ColourSpace::Yxy,
            InputSpace::Lab => ColourSpace::Lab,
            InputSpace::HunterLab => ColourSpace::HunterLab,
            InputSpace::Srgb => ColourSpace::Srgb,
            InputSpace::Yuv => ColourSpace::Yuv,
            InputSpace::Luv => ColourSpace::Luv,
        }
    }
}

impl ViewingArgs {
    fn apply(&self, options: &mut ReportOptions) -> Result<()> {
        if let Some(illuminant) = self.illuminant {
            options.illuminant = illuminant;
        }
        if let Some(angle) = self.angle {
            options.angle = Observer::try_from(angle)?;
        }
        Ok(())
    }
}

// ============================================================================
// Commands
// ============================================================================

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Report(args) => run_report(args),
        Command::Convert(args) => run_convert(args),
    }
}

fn run_report(args: ReportArgs) -> Result<()> {
    let loaded = load_file(&args.file)?;

    let mut options = match &args.options {
        Some(path) => ReportOptions::from_json_file(path)?,
        None => ReportOptions::default(),
    };
    if let Some(unit) = loaded.unit {
        options.unit = unit;
    }
    if let Some(scale) = loaded.scale {
        options.scale = scale;
    }
    args.viewing.apply(&mut options)?;
    if let Some(unit) = args.unit {
        options.unit = unit;
    }
    if let Some(scale) = args.scale {
        options.scale = scale;
    }
    if !args.fields.is_empty() {
        options.fields = FieldSelection::from_titles(&args.fields)?;
    }
    log::debug!(
        "report: {} {}, unit {}, scale {}, {} fields",
        options.illuminant,
        options.angle,
        options.unit,
        options.scale,
        options.fields.len()
    );

    let context = options.context();
    let integrator = options.integrator(&context);
    let table = colour_table(&loaded.table, &integrator, &options.fields)
        .with_context(|| format!("computing colours for {}", args.file.display()))?;

    match (args.format, &args.output) {
        (OutputFormat::Csv, Some(path)) => save_csv(&table, path, args.precision)?,
        (OutputFormat::Csv, None) => write_csv(&table, io::stdout().lock(), args.precision)?,
        (OutputFormat::Json, Some(path)) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_json(&table, file)?;
        }
        (OutputFormat::Json, None) => {
            write_json(&table, io::stdout().lock())?;
            println!();
        }
        (OutputFormat::Table, Some(path)) => {
            let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_text(&table, &mut file, args.precision)?;
        }
        (OutputFormat::Table, None) => write_text(&table, &mut io::stdout().lock(), args.precision)?,
    }
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let mut options = ReportOptions::default();
    args.viewing.apply(&mut options)?;
    let context = ColorimetricContext::new(options.illuminant, options.angle);

    let mut values = Vector3::new(args.values[0], args.values[1], args.values[2]);
    if let InputSpace::Srgb = args.from {
        values /= 255.0;
    }
    let summary = summarize(&context, &Colour::new(args.from.to_space(), values));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{} {}", context.illuminant(), context.observer());
        print!("{summary}");
    }
    Ok(())
}

/// Aligned text rendering of the result matrix.
fn write_text<W: Write>(table: &ColourTable, out: &mut W, precision: usize) -> Result<()> {
    let width = table.names.iter().map(|n| n.len()).max().unwrap_or(0).max(precision + 6).max(8);
    write!(out, "{:<14}", "-")?;
    for name in &table.names {
        write!(out, " {name:>width$}")?;
    }
    writeln!(out)?;
    for (field, values) in table.rows() {
        write!(out, "{:<14}", field.title())?;
        for value in values {
            write!(out, " {:>width$}", value.format(precision))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
