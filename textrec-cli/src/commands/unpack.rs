use super::{create_output, load_spec, open_input};
use crate::Profile;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fs;
use textrec_core::{streams, RecordContainer};
use tracing::{info, warn};

/// Counts of one unpack run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnpackSummary {
    /// Records unpacked without error
    pub unpacked: usize,
    /// Records rebuilt from an unknown variant
    pub partial: usize,
    /// Records dropped
    pub failed: usize,
}

pub fn execute(
    input: &str,
    output: &str,
    read_spec: &str,
    write_spec: &str,
    profile: Profile,
    strict: bool,
    summary_json: Option<&str>,
) -> Result<UnpackSummary> {
    let read = load_spec(read_spec)?;
    let write = load_spec(write_spec)?;
    let container = RecordContainer::new(profile.into());
    info!("Unpacking {} into {} with {:?} containers", input, output, profile);

    let mut producer = read.producer(open_input(input)?)?;
    let packed = streams::read_all(producer.as_mut())
        .with_context(|| format!("Failed to read packed records from {}", input))?;

    let mut summary = UnpackSummary::default();
    let mut records = Vec::with_capacity(packed.len());
    for (index, result) in container.unpack_all(&packed).enumerate() {
        if strict {
            let record = result
                .into_result()
                .with_context(|| format!("Failed to unpack record {}", index))?;
            records.push(record);
            summary.unpacked += 1;
            continue;
        }

        let message = result.error_message().map(str::to_string);
        match (result.into_record(), message) {
            (Some(record), None) => {
                records.push(record);
                summary.unpacked += 1;
            }
            (Some(record), Some(message)) => {
                eprintln!("{} record {}: {}", "~".yellow(), index, message);
                records.push(record);
                summary.partial += 1;
            }
            (None, message) => {
                let message = message.unwrap_or_default();
                warn!("Dropping record {}: {}", index, message);
                eprintln!("{} record {}: {}", "✗".red(), index, message);
                summary.failed += 1;
            }
        }
    }

    let mut consumer = write.consumer(create_output(output)?)?;
    streams::write_all(consumer.as_mut(), &records)
        .with_context(|| format!("Failed to write records to {}", output))?;

    // stdout may carry the records
    eprintln!(
        "Unpacked: {}  partial: {}  failed: {}",
        summary.unpacked.to_string().green(),
        summary.partial.to_string().yellow(),
        if summary.failed > 0 {
            summary.failed.to_string().red()
        } else {
            summary.failed.to_string().normal()
        }
    );

    if let Some(path) = summary_json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize unpack summary")?;
        fs::write(path, json).with_context(|| format!("Failed to write summary file: {}", path))?;
    }
    Ok(summary)
}
