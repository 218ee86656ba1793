use anyhow::{Context, Result};
use humansize::{format_size, BINARY};
use imgextr_core::{
    scan, BlockSource, FoundImage, ImageTypeDescriptor, OverflowPolicy, ScanConfig, ScanObserver,
    ScanSummary,
};
use imgextr_io::open_input;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything one run of the carver needs, resolved from the command line.
#[derive(Debug)]
pub struct Job {
    pub input: PathBuf,
    pub descriptor: &'static ImageTypeDescriptor,
    pub output_dir: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub overflow: OverflowPolicy,
    pub quiet: bool,
}

pub fn run_scan(job: &Job) -> Result<()> {
    // Input first: a failed open must not leave an output folder behind.
    let reader = open_input(&job.input).context("Failed to load input")?;
    info!(input = %job.input.display(), reader = reader.kind(), "input opened");

    let config = match &job.output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output folder {}", dir.display()))?;
            ScanConfig::extract(job.descriptor, dir)
        }
        None => ScanConfig::analyze(job.descriptor),
    }
    .with_overflow(job.overflow);

    match reader.size() {
        Some(size) => println!("[imgextr] Input size: {}", format_size(size, BINARY)),
        None => println!("[imgextr] Input size: unknown (stream)"),
    }

    let mut console = ConsoleReporter::new(reader.size(), job.quiet);
    println!("Finding image...");

    let result = scan(reader, config, &mut console);
    console.abandon();
    let summary = result.context("Scan aborted")?;

    if let Some(path) = &job.report {
        write_report(path, &summary)?;
        println!("[imgextr] Report written to {}", path.display());
    }

    Ok(())
}

/// Mirrors scan events on the terminal.
struct ConsoleReporter {
    pb: ProgressBar,
}

impl ConsoleReporter {
    fn new(size: Option<u64>, quiet: bool) -> Self {
        let pb = match (quiet, size) {
            (true, _) => ProgressBar::hidden(),
            (false, Some(size)) => {
                let pb = ProgressBar::new(size);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                        .expect("invalid progress bar template - this is a bug"),
                );
                pb
            }
            (false, None) => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed_precise}] {bytes} {msg}")
                        .expect("invalid progress bar template - this is a bug"),
                );
                pb
            }
        };

        Self { pb }
    }

    /// Prints above the bar, or straight to stdout when the bar is hidden.
    fn line(&self, message: String) {
        if self.pb.is_hidden() {
            println!("{message}");
        } else {
            self.pb.println(message);
        }
    }

    fn abandon(&self) {
        if !self.pb.is_finished() {
            self.pb.abandon();
        }
    }
}

impl ScanObserver for ConsoleReporter {
    fn on_block(&mut self, start: u64, end: u64) {
        self.pb.set_position(end);
        self.pb
            .set_message(format!("Scanning block ({start:#010X} - {end:#010X})..."));
    }

    fn on_header_dropped(&mut self, start: u64) {
        self.line(format!(
            "\tHeader at offset {start:#010X} ignored (too many pending headers)"
        ));
    }

    fn on_image_found(&mut self, image: &FoundImage, found: u64) {
        self.line(format!(
            "\tSOF found at offset {:#010X}\n\tEOF found at offset {:#010X}\n{} image(s) found.\n\nFinding next image...",
            image.start, image.end, found
        ));
    }

    fn on_finished(&mut self, summary: &ScanSummary) {
        self.pb.finish_and_clear();

        for line in summary_lines(summary) {
            println!("{line}");
        }
    }
}

fn summary_lines(summary: &ScanSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Scanned {} in {} block(s).",
        format_size(summary.bytes_scanned, BINARY),
        summary.blocks
    )];

    if summary.headers_dropped > 0 {
        lines.push(format!(
            "{} header(s) ignored because too many were pending.",
            summary.headers_dropped
        ));
    }

    if !summary.unterminated.is_empty() {
        lines.push(format!(
            "{} header(s) never saw a trailer.",
            summary.unterminated.len()
        ));
    }

    for file in &summary.partial_files {
        lines.push(format!(
            "Incomplete file left on disk: {} ({})",
            file.path.display(),
            format_size(file.size, BINARY)
        ));
    }

    lines.push(if summary.extraction {
        format!(
            "Extraction complete. {} image(s) found & extracted.",
            summary.images_found
        )
    } else {
        format!("Analysis complete. {} image(s) found.", summary.images_found)
    });

    lines
}

fn write_report(path: &Path, summary: &ScanSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize scan report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    Ok(())
}
