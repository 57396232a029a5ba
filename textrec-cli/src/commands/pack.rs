use super::{create_output, load_spec, open_input};
use crate::Profile;
use anyhow::{Context, Result};
use textrec_core::{streams, RecordContainer};
use tracing::{debug, info};

pub fn execute(input: &str, output: &str, read_spec: &str, write_spec: &str, profile: Profile) -> Result<()> {
    let read = load_spec(read_spec)?;
    let write = load_spec(write_spec)?;
    let container = RecordContainer::new(profile.into());
    info!("Packing {} into {} with {:?} containers", input, output, profile);

    let mut producer = read.producer(open_input(input)?)?;
    let records = streams::read_all(producer.as_mut())
        .with_context(|| format!("Failed to read records from {}", input))?;

    let packed: Vec<_> = container.pack_all(&records).collect();
    if let Some(widest) = packed.iter().map(|record| record.size()).max() {
        debug!("Widest packed record has {} fields", widest);
    }

    let mut consumer = write.consumer(create_output(output)?)?;
    streams::write_all(consumer.as_mut(), &packed)
        .with_context(|| format!("Failed to write packed records to {}", output))?;

    info!("Packed {} records", packed.len());
    Ok(())
}
