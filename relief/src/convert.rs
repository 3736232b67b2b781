//! Implementation of the `convert` subcommand of the relief CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, anyhow};
use clap::value_parser;
use log::info;

use crate::cli::Switch;
use crate::io;
use relief_lib::{Parameters, Real};

static ARGS_IO: &str = "Input/output";
static ARGS_BASIC: &str = "Conversion parameters";
static ARGS_ADV: &str = "Advanced parameters";

/// Command line arguments for the `convert` subcommand
#[derive(Clone, Debug, clap::Parser)]
pub(crate) struct ConvertSubcommandArgs {
    /// Path to the input image (any raster format supported by the enabled image decoders, e.g. PNG, JPEG, BMP, TIFF, WebP)
    #[arg(help_heading = ARGS_IO, value_parser = value_parser!(PathBuf))]
    pub input_file: PathBuf,
    /// Filename for writing the converted mesh to disk (supported formats: JSON, OBJ, default: "{original_filename}_mesh.json")
    #[arg(help_heading = ARGS_IO, short = 'o', long, value_parser = value_parser!(PathBuf))]
    pub output_file: Option<PathBuf>,
    /// Whether to overwrite existing output files without asking
    #[arg(help_heading = ARGS_IO, long)]
    pub overwrite: bool,

    /// Side length of the square depth grid the image is resampled to (has to be at least 2)
    #[arg(help_heading = ARGS_BASIC, short = 'r', long, default_value = "64")]
    pub resolution: usize,
    /// Scale factor mapping normalized depth values to world-space z displacement
    #[arg(help_heading = ARGS_BASIC, short = 'e', long, default_value = "0.2", allow_negative_numbers = true)]
    pub extrusion_height: f64,

    /// Enable the use of double precision for all computations
    #[arg(
        help_heading = ARGS_ADV,
        short = 'd',
        long,
        default_value = "off",
        value_name = "off|on",
        ignore_case = true,
        require_equals = true
    )]
    pub double_precision: Switch,
}

/// Executes the `convert` subcommand
pub(crate) fn convert_subcommand(cmd_args: &ConvertSubcommandArgs) -> Result<(), anyhow::Error> {
    let input_file = &cmd_args.input_file;
    let output_file = match &cmd_args.output_file {
        Some(output_file) => output_file.clone(),
        None => {
            let input_stem = input_file
                .file_stem()
                .ok_or_else(|| {
                    anyhow!(
                        "The input file path \"{}\" does not end with a filename",
                        input_file.display()
                    )
                })?
                .to_string_lossy();
            input_file.with_file_name(format!("{}_mesh.json", input_stem))
        }
    };

    // Check if the output file already exists
    if !cmd_args.overwrite && output_file.exists() {
        return Err(anyhow!(
            "Output file \"{}\" already exists. Use overwrite flag to ignore this.",
            output_file.display()
        ));
    }

    let image_bytes = fs::read(input_file).with_context(|| {
        format!(
            "Failed to load the input image from file \"{}\"",
            input_file.display()
        )
    })?;

    let parameters = Parameters::<f64> {
        resolution: cmd_args.resolution,
        extrusion_height: cmd_args.extrusion_height,
    };

    if cmd_args.double_precision.into_bool() {
        info!("Using double precision (f64) for conversion.");
        convert_and_write::<f64>(&image_bytes, &parameters, &output_file)
    } else {
        info!("Using single precision (f32) for conversion.");
        let parameters = parameters.try_convert::<f32>().ok_or_else(|| {
            anyhow!("Conversion parameters cannot be represented in single precision")
        })?;
        convert_and_write::<f32>(&image_bytes, &parameters, &output_file)
    }
}

fn convert_and_write<R: Real>(
    image_bytes: &[u8],
    parameters: &Parameters<R>,
    output_file: &Path,
) -> Result<(), anyhow::Error> {
    let conversion_start = Instant::now();
    let mesh = relief_lib::convert_image::<R>(image_bytes, parameters)
        .context("Image to mesh conversion failed")?;
    info!(
        "Image to mesh conversion took {:.2}ms.",
        conversion_start.elapsed().as_secs_f64() * 1000.0
    );

    io::write_mesh(&mesh, output_file).with_context(|| {
        format!(
            "Failed to write the converted mesh to file \"{}\"",
            output_file.display()
        )
    })?;
    info!("Wrote mesh to \"{}\".", output_file.display());

    Ok(())
}
