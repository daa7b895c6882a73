//! PDF Shrinker CLI
//!
//! Command-line interface for shrinking PDFs and converting images to PDF.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pdf_shrink::file_ops::{compress_files, convert_images};
use pdf_shrink::{format_bytes, CompressOptions, CompressionLevel, CONVERTED_FILE_NAME};
use std::io::Write;
use std::path::PathBuf;

/// Shrink PDFs or combine images into a PDF, entirely offline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-render PDF pages as JPEG images to reduce file size
    Compress {
        /// Input PDF files, processed in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the optimize_<name> outputs
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Compression level
        #[arg(short, long, value_enum, default_value_t = CompressionLevel::Medium)]
        level: CompressionLevel,

        /// Leave PDF streams of the rebuilt document uncompressed
        #[arg(long)]
        no_compress_streams: bool,

        /// Directory containing the pdfium shared library
        #[arg(long)]
        pdfium_dir: Option<PathBuf>,
    },

    /// Combine JPEG/PNG images into one PDF, one image per page
    Convert {
        /// Input images, one page each, in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output PDF file path
        #[arg(short, long, default_value = CONVERTED_FILE_NAME)]
        output: PathBuf,
    },
}

fn print_progress(percent: f64) {
    print!("\rProgress: {:>3.0}%", percent);
    let _ = std::io::stdout().flush();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    println!("PDF Shrinker");
    println!("============");

    match args.command {
        Command::Compress {
            inputs,
            output_dir,
            level,
            no_compress_streams,
            pdfium_dir,
        } => {
            let options = CompressOptions {
                level,
                compress_streams: !no_compress_streams,
            };
            let renderer = pdf_shrink::PdfiumRenderer::bind(pdfium_dir.as_deref())
                .context("Failed to load the pdfium library")?;

            let batch = compress_files(&renderer, &inputs, &output_dir, &options, print_progress)
                .context("Compression failed")?;
            println!();

            for result in &batch {
                if result.is_larger() {
                    println!(
                        "  {}: {} -> {} (output is larger, keep the original)",
                        result.file_name(),
                        format_bytes(result.original_size()),
                        format_bytes(result.new_size())
                    );
                } else {
                    println!(
                        "  {}: {} -> {} ({}% smaller)",
                        result.file_name(),
                        format_bytes(result.original_size()),
                        format_bytes(result.new_size()),
                        result.ratio()
                    );
                }
            }

            let saved = batch.total_saved();
            if batch.is_overall_gain() {
                println!("\nDone! Saved {} in total", format_bytes(saved as u64));
            } else {
                println!(
                    "\nDone! Output is {} larger in total",
                    format_bytes(saved.unsigned_abs())
                );
            }
            println!("Output saved to: {:?}", output_dir);
        }
        Command::Convert { inputs, output } => {
            let size = convert_images(&inputs, &output, |p| print_progress(f64::from(p)))
                .context("Conversion failed")?;
            println!();

            println!(
                "\nDone! Combined {} images ({})",
                inputs.len(),
                format_bytes(size)
            );
            println!("Output saved to: {:?}", output);
        }
    }

    Ok(())
}
