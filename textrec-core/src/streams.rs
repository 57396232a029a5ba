//! One-call helpers that drive a producer or consumer through its whole lifecycle
//!
//! Every helper closes what it opened, also when a phase fails. The first error wins.

use crate::consumer::RecordConsumer;
use crate::error::RecordError;
use crate::format::{ReadableFileSpec, WritableFileSpec};
use crate::producer::RecordProducer;
use crate::types::TextRecord;
use crate::Result;
use std::io::Cursor;

fn read_phases<P: RecordProducer + ?Sized>(producer: &mut P) -> Result<Vec<TextRecord>> {
    producer.read_before()?;
    let records = producer.read_records()?.collect::<Result<Vec<_>>>()?;
    producer.read_after()?;
    Ok(records)
}

/// Read every record and close the producer
pub fn read_all<P: RecordProducer + ?Sized>(producer: &mut P) -> Result<Vec<TextRecord>> {
    let result = read_phases(producer);
    let closed = producer.close();
    let records = result?;
    closed?;
    Ok(records)
}

/// Read every record of `text`
pub fn read_from_str<S: ReadableFileSpec + ?Sized>(spec: &S, text: &str) -> Result<Vec<TextRecord>> {
    let mut producer = spec.producer(Cursor::new(text.as_bytes()))?;
    read_all(&mut producer)
}

fn write_phases<'a, C, I>(consumer: &mut C, records: I) -> Result<()>
where
    C: RecordConsumer + ?Sized,
    I: IntoIterator<Item = &'a TextRecord>,
{
    consumer.write_before()?;
    for record in records {
        consumer.write_record(record)?;
    }
    consumer.write_after()
}

/// Write every record and close the consumer
pub fn write_all<'a, C, I>(consumer: &mut C, records: I) -> Result<()>
where
    C: RecordConsumer + ?Sized,
    I: IntoIterator<Item = &'a TextRecord>,
{
    let result = write_phases(consumer, records);
    let closed = consumer.close();
    result?;
    closed
}

/// Write `records` into a string, optionally without the final line separator
pub fn write_to_string<'a, S, I>(spec: &S, records: I, remove_last_separator: bool) -> Result<String>
where
    S: WritableFileSpec + ?Sized,
    I: IntoIterator<Item = &'a TextRecord>,
{
    let mut buffer = Vec::new();
    let mut consumer = spec.consumer(&mut buffer)?;
    write_all(&mut consumer, records)?;
    drop(consumer);

    let mut text = String::from_utf8(buffer).map_err(|err| RecordError::Encode(err.to_string()))?;
    if remove_last_separator {
        let separator = spec.line_separator().as_str();
        if text.ends_with(separator) {
            text.truncate(text.len() - separator.len());
        }
    }
    Ok(text)
}

/// Write a single record into a string, optionally without the final line separator
pub fn write_record_to_string<S: WritableFileSpec + ?Sized>(
    spec: &S,
    record: &TextRecord,
    remove_last_separator: bool,
) -> Result<String> {
    write_to_string(spec, std::iter::once(record), remove_last_separator)
}
