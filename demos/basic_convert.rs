//! Basic conversion example

use std::io::Cursor;
use textrec_core::{
    constants::Alignment,
    format::{DelimitedFileSpec, MarkdownTableFieldSpec, MarkdownTableFileSpec, ReadableFileSpec},
    streams::write_to_string,
    RecordProducer,
};

const INPUT: &str = "\
Sensor export
sensor;reading;unit
temperature;21.5;C
humidity;48;%
pressure;1013;hPa
3 readings
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Textrec Basic Conversion Example\n");

    // Skip the title line, hold back the header and the footer record
    let spec = DelimitedFileSpec::new(";", 3)
        .with_skip_first_lines(1)
        .with_ignored_records(1, 1);
    let mut producer = spec.producer(Cursor::new(INPUT.as_bytes()))?;

    producer.read_before()?;
    let records = producer.read_records()?.collect::<Result<Vec<_>, _>>()?;
    producer.read_after()?;

    println!("Read {} records", producer.record_count()?);
    for raw in producer.first_ignored()? {
        println!("  header: {}", raw.raw_data);
    }
    for raw in producer.last_ignored()? {
        println!("  footer: {}", raw.raw_data);
    }
    producer.close()?;

    let table = MarkdownTableFileSpec::new(vec![
        MarkdownTableFieldSpec::new("Sensor"),
        MarkdownTableFieldSpec::new("Reading").with_alignment(Alignment::End),
        MarkdownTableFieldSpec::new("Unit").with_alignment(Alignment::Center),
    ]);
    let text = write_to_string(&table, &records, false)?;

    println!("\n{}", text);
    Ok(())
}
