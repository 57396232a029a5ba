//! Record producers
//!
//! A [`TextProducer`] owns a reader and a format specific [`RecordDecoder`]. The decoder
//! says how one raw unit is cut from the reader and how a raw unit becomes a record; the
//! producer adds the lookahead window and the lifecycle.

use crate::lifecycle::{Lifecycle, ProducerState};
use crate::lines;
use crate::types::{RecordRawData, TextRecord};
use crate::window::{RawDataWindow, RawSource};
use crate::Result;
use std::io::BufRead;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Boxed, lazy, single-pass sequence of records
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<TextRecord>> + 'a>;

/// Callback that sees every raw unit before it is decoded
pub type RawDataObserver = Box<dyn FnMut(&RecordRawData) + Send>;

/// Format specific reading and decoding
pub trait RecordDecoder {
    /// Raw lines discarded before the window starts
    fn skip_first_lines(&self) -> usize {
        0
    }

    /// Leading raw units held back by the window
    fn ignore_first(&self) -> usize {
        0
    }

    /// Trailing raw units held back by the window
    fn ignore_last(&self) -> usize {
        0
    }

    /// Cut the next raw unit from `reader`, or return `None` at the end
    fn read_raw<R: BufRead>(&mut self, reader: &mut R, record_index: u64) -> Result<Option<RecordRawData>>;

    /// Turn a raw unit into a record, or `None` to skip it
    fn decode(&self, raw: RecordRawData) -> Result<Option<TextRecord>>;
}

/// [`RawSource`] that reads through a decoder
#[derive(Debug)]
pub struct ReaderSource<R, D> {
    reader: R,
    decoder: D,
}

impl<R: BufRead, D: RecordDecoder> RawSource for ReaderSource<R, D> {
    fn read_next(&mut self, record_index: u64) -> Result<Option<RecordRawData>> {
        self.decoder.read_raw(&mut self.reader, record_index)
    }
}

/// Reads records in four phases: before, records, after, close
pub trait RecordProducer {
    /// Read leading data. Must be called first.
    fn read_before(&mut self) -> Result<()>;

    /// Lazy sequence of the records. The sequence stops after the first error.
    fn read_records(&mut self) -> Result<RecordIter<'_>>;

    /// Read trailing data
    fn read_after(&mut self) -> Result<()>;

    /// Release the source. Any later call fails.
    fn close(&mut self) -> Result<()>;

    /// Number of records handed out. Available after `read_after`.
    fn record_count(&self) -> Result<u64>;

    /// Raw units held back at the start. Available after `read_after`.
    fn first_ignored(&self) -> Result<&[RecordRawData]>;

    /// Raw units held back at the end. Available after `read_after`.
    fn last_ignored(&self) -> Result<&[RecordRawData]>;
}

/// Producer over a [`BufRead`] source
pub struct TextProducer<R, D> {
    window: RawDataWindow<ReaderSource<R, D>>,
    lifecycle: Lifecycle<ProducerState>,
    observer: Option<RawDataObserver>,
    record_count: u64,
}

impl<R: BufRead, D: RecordDecoder> TextProducer<R, D> {
    /// Create a producer reading from `reader`
    pub fn new(reader: R, decoder: D) -> Self {
        let ignore_first = decoder.ignore_first();
        let ignore_last = decoder.ignore_last();
        Self {
            window: RawDataWindow::new(ReaderSource { reader, decoder }, ignore_first, ignore_last),
            lifecycle: Lifecycle::new(),
            observer: None,
            record_count: 0,
        }
    }

    /// Observe every raw unit before it is decoded
    pub fn with_raw_data_observer(mut self, observer: impl FnMut(&RecordRawData) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The decoder
    pub fn decoder(&self) -> &D {
        &self.window.source().decoder
    }

    /// Current lifecycle state
    pub fn state(&self) -> ProducerState {
        self.lifecycle.state()
    }

    fn require_finished(&self, operation: &'static str) -> Result<()> {
        self.lifecycle
            .require(&[ProducerState::ReadAfter, ProducerState::Closed], operation)
    }

    /// Consume the producer and return the reader
    pub fn into_inner(self) -> R {
        self.window.into_source().reader
    }

    fn next_record(&mut self) -> Option<Result<TextRecord>> {
        loop {
            let raw = match self.window.has_next() {
                Ok(false) => return None,
                Ok(true) => match self.window.next_raw() {
                    Ok(raw) => raw,
                    Err(err) => return Some(Err(err)),
                },
                Err(err) => return Some(Err(err)),
            };
            if let Some(observer) = self.observer.as_mut() {
                observer(&raw);
            }
            let index = raw.record_id;
            match self.window.source().decoder.decode(raw) {
                Ok(Some(record)) => {
                    self.record_count += 1;
                    return Some(Ok(record));
                }
                Ok(None) => continue,
                Err(err) => {
                    #[cfg(feature = "logging")]
                    warn!("Failed to decode raw unit {:?}: {}", index, err);

                    return Some(Err(match index {
                        Some(index) => err.at_index(index),
                        None => err,
                    }));
                }
            }
        }
    }
}

impl<R: BufRead, D: RecordDecoder> RecordProducer for TextProducer<R, D> {
    fn read_before(&mut self) -> Result<()> {
        self.lifecycle.check_transition(ProducerState::ReadBefore)?;
        let skip = self.window.source().decoder.skip_first_lines();
        if skip > 0 {
            let skipped = lines::skip_lines(&mut self.window.source_mut().reader, skip)?;

            #[cfg(feature = "logging")]
            debug!("Skipped {} of {} leading lines", skipped, skip);
            #[cfg(not(feature = "logging"))]
            let _ = skipped;
        }
        self.window.fill_queue(true)?;
        self.lifecycle.transition(ProducerState::ReadBefore)
    }

    fn read_records(&mut self) -> Result<RecordIter<'_>> {
        self.lifecycle.transition(ProducerState::ReadRecords)?;
        let mut failed = false;
        Ok(Box::new(std::iter::from_fn(move || {
            if failed {
                return None;
            }
            let next = self.next_record();
            failed = matches!(next, Some(Err(_)));
            next
        })))
    }

    fn read_after(&mut self) -> Result<()> {
        self.lifecycle.transition(ProducerState::ReadAfter)?;

        #[cfg(feature = "logging")]
        debug!(
            "Produced {} records from {} raw units",
            self.record_count,
            self.window.current_record_index()
        );

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.lifecycle.transition(ProducerState::Closed)
    }

    fn record_count(&self) -> Result<u64> {
        self.require_finished("recordCount")?;
        Ok(self.record_count)
    }

    fn first_ignored(&self) -> Result<&[RecordRawData]> {
        self.require_finished("firstIgnored")?;
        Ok(self.window.first_held())
    }

    fn last_ignored(&self) -> Result<&[RecordRawData]> {
        self.require_finished("lastIgnored")?;
        Ok(self.window.last_held())
    }
}

impl<R: BufRead, D: RecordDecoder + std::fmt::Debug> std::fmt::Debug for TextProducer<R, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextProducer")
            .field("decoder", &self.window.source().decoder)
            .field("state", &self.lifecycle.state())
            .field("record_count", &self.record_count)
            .finish()
    }
}
