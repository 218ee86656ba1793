//! imgextr - Header/Trailer Image Carver
//!
//! Finds JPEG and PNG images inside raw data by their signatures and
//! optionally extracts each one to its own file.

mod engine;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use imgextr_core::{ImageTypeDescriptor, OverflowPolicy};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "imgextr")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file, device or `-` for standard input
    #[arg(short, long, value_name = "INPUT_FILE", required_unless_present = "list_types")]
    input: Option<PathBuf>,

    /// Image type to look for (see -s)
    #[arg(
        short = 't',
        long = "type",
        value_name = "IMAGE_TYPE",
        value_parser = ImageTypeDescriptor::lookup,
        required_unless_present = "list_types"
    )]
    image_type: Option<&'static ImageTypeDescriptor>,

    /// Only report image offsets (default)
    #[arg(short, long, conflicts_with = "extract")]
    analyze: bool,

    /// Extract found images into OUTPUT_FOLDER
    #[arg(short, long, value_name = "OUTPUT_FOLDER")]
    extract: Option<PathBuf>,

    /// List supported image types and exit
    #[arg(short = 's', long = "list-types")]
    list_types: bool,

    /// Write the scan summary as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// What to do when too many headers are pending
    #[arg(long, value_enum, default_value_t = Overflow::Drop)]
    on_overflow: Overflow,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Hide the progress bar
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Overflow {
    /// Ignore headers beyond the limit and keep scanning
    Drop,
    /// Stop the scan with an error
    Abort,
}

impl From<Overflow> for OverflowPolicy {
    fn from(value: Overflow) -> Self {
        match value {
            Overflow::Drop => OverflowPolicy::DropNewest,
            Overflow::Abort => OverflowPolicy::Abort,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list_types {
        print_image_types();
        return Ok(());
    }

    let (Some(input), Some(descriptor)) = (args.input, args.image_type) else {
        anyhow::bail!("Options -i and -t are required (use -s to list image types)");
    };

    // `-a` and `-e` conflict, so analysis is the mode unless a folder was given.
    let output_dir = if args.analyze { None } else { args.extract };

    engine::run_scan(&engine::Job {
        input,
        descriptor,
        output_dir,
        report: args.report,
        overflow: args.on_overflow.into(),
        quiet: args.quiet,
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_image_types() {
    println!("List of available image types:");
    for descriptor in ImageTypeDescriptor::catalogue() {
        println!("{:<8}- {}", descriptor.kind(), descriptor.description());
    }
}
