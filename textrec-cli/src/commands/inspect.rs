use super::{load_spec, open_input};
use anyhow::{Context, Result};
use colored::*;
use textrec_core::RecordRawData;
use tracing::info;

fn print_ignored(title: &str, units: &[RecordRawData]) {
    if units.is_empty() {
        return;
    }
    println!("\n=== {} ===", title);
    for raw in units {
        match raw.record_id {
            Some(index) => println!("{:>6}  {}", index, raw.raw_data),
            None => println!("        {}", raw.raw_data),
        }
    }
}

/// Print every record of `input`. Returns the number of records read.
pub fn execute(input: &str, read_spec: &str) -> Result<u64> {
    let spec = load_spec(read_spec)?;
    info!("Inspecting {} as {}", input, spec.format_name());

    let mut producer = spec.producer(open_input(input)?)?;
    producer.read_before()?;

    println!("=== Records ===");
    for record in producer.read_records()? {
        let record = record.with_context(|| format!("Failed to read {}", input))?;
        let index = record
            .record_id()
            .map_or_else(|| "-".to_string(), |index| index.to_string());
        println!("{:>6}  {:<16} {}", index.cyan(), format!("{:?}", record.kind()), record);
    }
    producer.read_after()?;

    print_ignored("First ignored", producer.first_ignored()?);
    print_ignored("Last ignored", producer.last_ignored()?);

    let count = producer.record_count()?;
    producer.close()?;

    println!("\n{} {} records", "✓".green(), count);
    Ok(count)
}
