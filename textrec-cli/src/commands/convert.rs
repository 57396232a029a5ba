use super::{create_output, load_spec, open_input};
use anyhow::{Context, Result};
use textrec_core::streams;
use tracing::info;

pub fn execute(input: &str, output: &str, read_spec: &str, write_spec: &str) -> Result<()> {
    let read = load_spec(read_spec)?;
    let write = load_spec(write_spec)?;
    info!(
        "Converting {} ({}) to {} ({})",
        input,
        read.format_name(),
        output,
        write.format_name()
    );

    let mut producer = read.producer(open_input(input)?)?;
    let records = streams::read_all(producer.as_mut())
        .with_context(|| format!("Failed to read records from {}", input))?;

    let mut consumer = write.consumer(create_output(output)?)?;
    streams::write_all(consumer.as_mut(), &records)
        .with_context(|| format!("Failed to write records to {}", output))?;

    info!("Converted {} records", records.len());
    Ok(())
}
