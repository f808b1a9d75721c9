use std::path::PathBuf;
use std::process::ExitCode;

use calib_tagboard::{
    generate_boards, BoardConfig, ConfigError, DictionaryMarkers, ExportCapabilities,
    GenerateError, GenerationSummary, MarkerError, Overrides, SPECIFICATIONS_FILE,
};
use clap::Parser;

/// Generate AprilTag calibration boards for multi-camera calibration.
#[derive(Parser, Debug)]
#[command(name = "calib-tagboard", version, about, long_about = None)]
struct Cli {
    /// YAML or JSON configuration file; defaults are used when it is missing
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output directory (overrides the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Raster resolution in dots per inch
    #[arg(long)]
    dpi: Option<u32>,

    /// Number of tag columns
    #[arg(long)]
    grid_x: Option<u32>,

    /// Number of tag rows
    #[arg(long)]
    grid_y: Option<u32>,

    /// Tag edge length in millimeters
    #[arg(long = "tag-size")]
    tag_size: Option<f64>,

    /// Gap between neighbouring tags in millimeters
    #[arg(long)]
    spacing: Option<f64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            output: self.output.clone(),
            dpi: self.dpi,
            grid_x: self.grid_x,
            grid_y: self.grid_y,
            tag_size_mm: self.tag_size,
            spacing_mm: self.spacing,
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Marker(#[from] MarkerError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) {
    if let Err(err) = calib_tagboard::init_with_level(calib_tagboard::level_for_verbosity(verbose))
    {
        eprintln!("logger already initialized: {err}");
    }
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: u8) {
    calib_tagboard::init_tracing(calib_tagboard::level_for_verbosity(verbose));
}

fn run(cli: &Cli) -> Result<GenerationSummary, CliError> {
    let cfg = BoardConfig::load_or_default(&cli.config).with_overrides(&cli.overrides());
    let spec = cfg.board_spec()?;
    let markers = DictionaryMarkers::for_family(spec.family)?;
    let caps = ExportCapabilities::detect();
    if !caps.pdf {
        log::warn!("built without PDF support; only PNG files will be written");
    }
    Ok(generate_boards(&cfg, &caps, &markers)?)
}

fn print_summary(summary: &GenerationSummary) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("GENERATION COMPLETE!");
    println!("{rule}");
    println!(
        "\nGenerated {} AprilTag calibration boards",
        summary.boards.len()
    );
    println!("Output directory: {}/", summary.output_dir.display());
    for board in &summary.boards {
        let files = [&board.files.png, &board.files.pdf]
            .into_iter()
            .flatten()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {}. {}: {files}", board.index, board.name);
    }
    println!("\nNext steps:");
    println!("1. Review the generated boards visually");
    println!("2. Print the PDF files at 100% scale");
    println!("3. Measure one printed tag to confirm the scale");
    println!("4. Mount on rigid surfaces for calibration");
    println!("\nRefer to '{SPECIFICATIONS_FILE}' for detailed information");
}
