//! Record consumers
//!
//! A [`TextConsumer`] renders each unit (the before block, one record, the after block)
//! into a buffer with a format specific [`RecordEncoder`] and hands the buffer to the
//! writer in a single `write_all`. Combined with [`SharedWriter`] this keeps every unit
//! intact when several consumers write to the same destination.

use crate::constants::LineSeparator;
use crate::error::RecordError;
use crate::lifecycle::{ConsumerState, Lifecycle};
use crate::types::TextRecord;
use crate::Result;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(feature = "logging")]
use tracing::debug;

/// Format specific encoding
pub trait RecordEncoder {
    /// Render the leading block
    fn encode_before(&mut self, _out: &mut String) -> Result<()> {
        Ok(())
    }

    /// Render one record
    fn encode_record(&mut self, record: &TextRecord, out: &mut String) -> Result<()>;

    /// Render the trailing block
    fn encode_after(&mut self, _out: &mut String) -> Result<()> {
        Ok(())
    }
}

/// Append `text` and a line separator
pub(crate) fn push_line(out: &mut String, text: &str, separator: LineSeparator) {
    out.push_str(text);
    out.push_str(separator.as_str());
}

/// Writes records in four phases: before, records, after, close
pub trait RecordConsumer {
    /// Write leading data. Must be called first.
    fn write_before(&mut self) -> Result<()>;

    /// Write one record. May be called any number of times.
    fn write_record(&mut self, record: &TextRecord) -> Result<()>;

    /// Write trailing data
    fn write_after(&mut self) -> Result<()>;

    /// Flush the sink. Allowed in every state before close.
    fn flush(&mut self) -> Result<()>;

    /// Flush and release the sink. Any later call fails.
    fn close(&mut self) -> Result<()>;
}

/// Consumer over a [`Write`] sink
#[derive(Debug)]
pub struct TextConsumer<W, E> {
    writer: W,
    encoder: E,
    lifecycle: Lifecycle<ConsumerState>,
    buffer: String,
    record_count: u64,
}

impl<W: Write, E: RecordEncoder> TextConsumer<W, E> {
    /// Create a consumer writing to `writer`
    pub fn new(writer: W, encoder: E) -> Self {
        Self {
            writer,
            encoder,
            lifecycle: Lifecycle::new(),
            buffer: String::new(),
            record_count: 0,
        }
    }

    /// The encoder
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConsumerState {
        self.lifecycle.state()
    }

    /// Number of records written so far
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Consume the consumer and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.writer.write_all(self.buffer.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write, E: RecordEncoder> RecordConsumer for TextConsumer<W, E> {
    fn write_before(&mut self) -> Result<()> {
        self.lifecycle.check_transition(ConsumerState::WriteBefore)?;
        self.buffer.clear();
        self.encoder.encode_before(&mut self.buffer)?;
        self.emit()?;
        self.lifecycle.transition(ConsumerState::WriteBefore)
    }

    fn write_record(&mut self, record: &TextRecord) -> Result<()> {
        self.lifecycle.check_transition(ConsumerState::WriteRecords)?;
        self.buffer.clear();
        self.encoder.encode_record(record, &mut self.buffer)?;
        self.emit()?;
        self.record_count += 1;
        self.lifecycle.transition(ConsumerState::WriteRecords)
    }

    fn write_after(&mut self) -> Result<()> {
        self.lifecycle.check_transition(ConsumerState::WriteAfter)?;
        self.buffer.clear();
        self.encoder.encode_after(&mut self.buffer)?;
        self.emit()?;
        self.lifecycle.transition(ConsumerState::WriteAfter)
    }

    fn flush(&mut self) -> Result<()> {
        self.lifecycle.require(
            &[
                ConsumerState::Open,
                ConsumerState::WriteBefore,
                ConsumerState::WriteRecords,
                ConsumerState::WriteAfter,
            ],
            "flush",
        )?;
        self.writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.lifecycle.check_transition(ConsumerState::Closed)?;
        self.writer.flush()?;

        #[cfg(feature = "logging")]
        debug!("Closing consumer after {} records", self.record_count);

        self.lifecycle.transition(ConsumerState::Closed)
    }
}

/// A writer shared between threads. Each `write_all` holds the lock for its whole buffer.
#[derive(Debug, Default)]
pub struct SharedWriter<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W> SharedWriter<W> {
    /// Wrap `writer`
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Lock the writer
    pub fn lock(&self) -> io::Result<MutexGuard<'_, W>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "shared writer lock poisoned"))
    }

    /// Return the writer if this is the last handle
    pub fn try_unwrap(self) -> std::result::Result<W, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl<W: Write> Write for SharedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

/// A consumer shared between threads. Each record is written under one lock.
#[derive(Debug)]
pub struct SharedConsumer<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> Clone for SharedConsumer<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: RecordConsumer> SharedConsumer<C> {
    /// Wrap `consumer`
    pub fn new(consumer: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(consumer)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, C>> {
        self.inner
            .lock()
            .map_err(|_| RecordError::Io("shared consumer lock poisoned".to_string()))
    }

    /// Write one record
    pub fn consume(&self, record: &TextRecord) -> Result<()> {
        self.lock()?.write_record(record)
    }

    /// Run `f` with exclusive access to the consumer, e.g. for the before and after phases
    pub fn with_consumer<T>(&self, f: impl FnOnce(&mut C) -> Result<T>) -> Result<T> {
        f(&mut *self.lock()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct JoinEncoder;

    impl RecordEncoder for JoinEncoder {
        fn encode_before(&mut self, out: &mut String) -> Result<()> {
            push_line(out, "BEGIN", LineSeparator::Lf);
            Ok(())
        }

        fn encode_record(&mut self, record: &TextRecord, out: &mut String) -> Result<()> {
            let texts: Vec<_> = record.texts().map(|t| t.unwrap_or("")).collect();
            push_line(out, &texts.join("+"), LineSeparator::Lf);
            Ok(())
        }
    }

    #[test]
    fn test_write_lifecycle() {
        let mut consumer = TextConsumer::new(Vec::new(), JoinEncoder);
        consumer.write_before().unwrap();
        consumer.write_record(&TextRecord::from_texts(["a", "b"])).unwrap();
        consumer.write_record(&TextRecord::from_texts(["c"])).unwrap();
        consumer.write_after().unwrap();
        consumer.flush().unwrap();
        consumer.close().unwrap();
        assert_eq!(consumer.record_count(), 2);
        assert!(consumer.flush().is_err());
        assert_eq!(String::from_utf8(consumer.into_inner()).unwrap(), "BEGIN\na+b\nc\n");
    }

    #[test]
    fn test_record_before_before_is_illegal() {
        let mut consumer = TextConsumer::new(Vec::new(), JoinEncoder);
        let err = consumer.write_record(&TextRecord::empty()).unwrap_err();
        assert_eq!(
            err,
            RecordError::IllegalState {
                from: "Open",
                to: "WriteRecords"
            }
        );
        assert!(consumer.into_inner().is_empty());
    }

    #[test]
    fn test_write_after_close_fails() {
        let mut consumer = TextConsumer::new(Vec::new(), JoinEncoder);
        consumer.write_before().unwrap();
        consumer.close().unwrap();
        assert!(consumer.write_record(&TextRecord::empty()).is_err());
        assert!(consumer.write_after().is_err());
        assert!(consumer.close().is_err());
    }

    #[test]
    fn test_shared_writer_keeps_records_whole() {
        let shared = SharedWriter::new(Vec::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let writer = shared.clone();
                thread::spawn(move || {
                    let mut consumer = TextConsumer::new(writer, JoinEncoder);
                    consumer.write_before().unwrap();
                    for i in 0..50 {
                        let text = format!("{}-{}", t, i);
                        consumer
                            .write_record(&TextRecord::from_texts([text.as_str(), "x", "y"]))
                            .unwrap();
                    }
                    consumer.close().unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let bytes = shared.try_unwrap().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4 * 51);
        assert!(lines
            .iter()
            .all(|line| *line == "BEGIN" || line.ends_with("+x+y")));
    }

    #[test]
    fn test_shared_consumer() {
        let shared = SharedConsumer::new(TextConsumer::new(Vec::new(), JoinEncoder));
        shared.with_consumer(|c| c.write_before()).unwrap();
        let handles: Vec<_> = (0..3)
            .map(|t| {
                let consumer = shared.clone();
                thread::spawn(move || consumer.consume(&TextRecord::from_texts([t.to_string()])).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let count = shared
            .with_consumer(|c| {
                c.write_after()?;
                c.close()?;
                Ok(c.record_count())
            })
            .unwrap();
        assert_eq!(count, 3);
    }
}
