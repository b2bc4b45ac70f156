//! CLI logic for the Stencil design compressor.
//!
//! Reads design documents and compressed designs as JSON files, runs them
//! through the [`stencil`] engine and writes the result. JSON is read and
//! written with serde_json's recursion limit lifted and the stack grown on
//! demand, so documents may nest arbitrarily deep.

pub mod error_adapter;

mod args;
mod config;
mod error;

pub use args::{Args, Command};
pub use config::{AppConfig, ConfigError, OutputConfig};
pub use error::CliError;

use std::{
    fs,
    io::{self, Write},
};

use log::{info, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use stencil::{
    CompressedDesign, CompressionStats, DesignCompressor, DesignDocument, ValidationMode, expand,
    validate_expansion_with,
};

/// Run the Stencil CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed input JSON
/// - A compressed design that does not expand to the original (`validate`)
pub fn run(args: &Args) -> Result<(), CliError> {
    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Compress {
            input,
            output,
            name,
        } => compress(&app_config, input, output.as_deref(), name.as_deref()),
        Command::Expand { input, output } => expand_design(&app_config, input, output.as_deref()),
        Command::Validate {
            original,
            compressed,
            full,
        } => validate(original, compressed, *full),
    }
}

fn compress(
    app_config: &AppConfig,
    input: &str,
    output: Option<&str>,
    name: Option<&str>,
) -> Result<(), CliError> {
    info!(input_path = input; "Compressing design");

    let document: DesignDocument = read_json(input)?;
    let name = name.unwrap_or(&document.name);

    let compressor = DesignCompressor::new(app_config.compression.clone());
    let design = compressor.compress(name, &document.nodes, &document.global_vars)?;

    let stats = CompressionStats::measure(&document.nodes, &document.global_vars, &design)?;
    info!(
        original_bytes = stats.original_bytes,
        compressed_bytes = stats.compressed_bytes,
        savings = stats.savings(),
        components = stats.components,
        instances = stats.instances,
        slots = stats.slots,
        grids = stats.grids;
        "Design compressed"
    );

    write_json(output, &design, app_config.output)
}

fn expand_design(app_config: &AppConfig, input: &str, output: Option<&str>) -> Result<(), CliError> {
    info!(input_path = input; "Expanding design");

    let design: CompressedDesign = read_json(input)?;
    let document = DesignDocument {
        nodes: expand(&design),
        name: design.name,
        global_vars: design.global_vars,
    };

    info!(roots = document.nodes.len(); "Design expanded");

    write_json(output, &document, app_config.output)
}

fn validate(original: &str, compressed: &str, full: bool) -> Result<(), CliError> {
    info!(original_path = original, compressed_path = compressed; "Validating design");

    let document: DesignDocument = read_json(original)?;
    let design: CompressedDesign = read_json(compressed)?;

    let mode = if full {
        ValidationMode::Full
    } else {
        ValidationMode::Shape
    };
    let report = validate_expansion_with(&document.nodes, &expand(&design), mode);

    for mismatch in report.mismatches() {
        warn!(path = mismatch.path, kind:% = mismatch.kind; "Expansion mismatch");
    }
    if !report.is_valid() {
        return Err(CliError::Validation {
            mismatches: report.mismatches().len(),
        });
    }

    info!(mode:?; "Compressed design expands to the original");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, CliError> {
    let src = fs::read_to_string(path)?;
    parse_json(&src).map_err(|err| CliError::new_json_error(path, src, err))
}

fn parse_json<T: DeserializeOwned>(src: &str) -> Result<T, serde_json::Error> {
    let mut json = serde_json::Deserializer::from_str(src);
    json.disable_recursion_limit();
    let value: T = Deserialize::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    let mut json = Vec::new();
    if pretty {
        let mut serializer = serde_json::Serializer::pretty(&mut json);
        value.serialize(serde_stacker::Serializer::new(&mut serializer))?;
    } else {
        let mut serializer = serde_json::Serializer::new(&mut json);
        value.serialize(serde_stacker::Serializer::new(&mut serializer))?;
    }
    Ok(json)
}

/// Writes `value` to `path`, or to standard output when no path is given.
fn write_json<T: Serialize>(
    path: Option<&str>,
    value: &T,
    output: OutputConfig,
) -> Result<(), CliError> {
    let json = to_json(value, output.pretty).map_err(stencil::StencilError::from)?;

    match path {
        Some(path) => {
            fs::write(path, json)?;
            info!(output_file = path; "Output written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&json)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
