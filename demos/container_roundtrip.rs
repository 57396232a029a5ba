//! Example packing records of different shapes into one delimited file
//!
//! A delimited file has a fixed number of columns, so every record here packs to the same width.

use textrec_core::{
    container::{ContainerProfile, RecordContainer},
    format::DelimitedFileSpec,
    streams::{read_from_str, write_to_string},
    TextRecord,
};

fn s(text: &str) -> Option<String> {
    Some(text.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Textrec Container Round Trip Example\n");

    let records = vec![
        TextRecord::key_value(s("config"), Some(1), "host", s("localhost")),
        TextRecord::key_value(s("config"), Some(2), "port", None),
        TextRecord::two_fields(s("pair"), Some(3), s("left"), None),
        TextRecord::many_fields(None, None, vec![s("x"), s("y")]),
    ];

    // Step 1: pack every record into a flat record
    let container = RecordContainer::new(ContainerProfile::Large);
    let packed: Vec<_> = container.pack_all(&records).collect();
    let width = packed.iter().map(TextRecord::size).max().unwrap_or_default();

    let spec = DelimitedFileSpec::new("\t", width);
    let text = write_to_string(&spec, &packed, false)?;
    println!("Packed into {} columns:\n{}", width, text);

    // Step 2: read the file back and unpack
    let reread = read_from_str(&spec, &text)?;
    let mut restored = Vec::new();
    for result in container.unpack_all(&reread) {
        match result.error_message() {
            Some(message) => println!("Failed to unpack: {}", message),
            None => restored.extend(result.into_record()),
        }
    }

    println!("Restored {} of {} records", restored.len(), records.len());
    for record in &restored {
        println!("  {}", record);
    }

    Ok(())
}
