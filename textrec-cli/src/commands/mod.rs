//! Subcommands and the file handling they share

pub mod convert;
pub mod inspect;
pub mod pack;
pub mod unpack;

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use textrec_core::FileSpec;

/// Load a file spec from a JSON file
pub fn load_spec(path: &str) -> Result<FileSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read spec file: {}", path))?;
    let spec: FileSpec = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse spec file: {}", path))?;
    spec.validate()
        .with_context(|| format!("Invalid {} spec: {}", spec.format_name(), path))?;
    Ok(spec)
}

/// Open `path` for reading, `-` is stdin
pub fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("Failed to read input file: {}", path))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Create `path` for writing, `-` is stdout
pub fn create_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        return Ok(Box::new(io::stdout()));
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create output file: {}", path))?;
    Ok(Box::new(BufWriter::new(file)))
}
