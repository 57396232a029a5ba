//! Bounded lookahead window over raw units
//!
//! A [`RawDataWindow`] pulls raw units from a [`RawSource`] one at a time and holds back
//! the first `ignore_first` and the last `ignore_last` of them. The trailing units can only
//! be told apart from the others once the end of the source is seen, so the window keeps a
//! queue of `ignore_last + 1` units and only releases the oldest one when the queue is full.

use crate::constants::FIRST_RECORD_INDEX;
use crate::error::RecordError;
use crate::types::RecordRawData;
use crate::Result;
use std::collections::VecDeque;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Supplies raw units to a [`RawDataWindow`]
pub trait RawSource {
    /// Read the next raw unit, or `None` at the end of the source.
    ///
    /// `record_index` is the index the unit will carry.
    fn read_next(&mut self, record_index: u64) -> Result<Option<RecordRawData>>;
}

impl<F> RawSource for F
where
    F: FnMut(u64) -> Result<Option<RecordRawData>>,
{
    fn read_next(&mut self, record_index: u64) -> Result<Option<RecordRawData>> {
        self(record_index)
    }
}

/// Iterator that discards a fixed number of leading and trailing raw units
#[derive(Debug)]
pub struct RawDataWindow<S> {
    source: S,
    ignore_first: usize,
    ignore_last: usize,
    queue: VecDeque<RecordRawData>,
    first: Vec<RecordRawData>,
    last: Vec<RecordRawData>,
    current_record_index: u64,
    end_reached: bool,
    failed: bool,
}

impl<S: RawSource> RawDataWindow<S> {
    /// Create a window over `source`
    pub fn new(source: S, ignore_first: usize, ignore_last: usize) -> Self {
        Self {
            source,
            ignore_first,
            ignore_last,
            queue: VecDeque::new(),
            first: Vec::new(),
            last: Vec::new(),
            current_record_index: FIRST_RECORD_INDEX,
            end_reached: false,
            failed: false,
        }
    }

    fn queue_capacity(&self) -> usize {
        self.ignore_last.saturating_add(1)
    }

    /// Read from the source until the queue is full or the end is reached.
    ///
    /// With `only_first` reading stops as soon as the leading units have been collected.
    pub fn fill_queue(&mut self, only_first: bool) -> Result<()> {
        while !self.end_reached
            && self.queue.len() < self.queue_capacity()
            && (!only_first || self.first.len() < self.ignore_first)
        {
            match self.source.read_next(self.current_record_index) {
                Ok(Some(raw)) => {
                    #[cfg(feature = "logging")]
                    trace!("Read raw unit {}: {:?}", self.current_record_index, raw.raw_data);

                    if self.current_record_index - FIRST_RECORD_INDEX >= self.ignore_first as u64 {
                        self.queue.push_back(raw);
                    } else {
                        self.first.push(raw);
                    }
                    self.current_record_index += 1;
                }
                Ok(None) => {
                    self.end_reached = true;
                    self.last.extend(self.queue.drain(..));

                    #[cfg(feature = "logging")]
                    debug!(
                        "End of source after {} raw units ({} first, {} last ignored)",
                        self.current_record_index,
                        self.first.len(),
                        self.last.len()
                    );
                }
                Err(RecordError::Io(message)) => {
                    self.failed = true;
                    return Err(RecordError::ReadFailed {
                        record_index: self.current_record_index,
                        end_reached: self.end_reached,
                        message,
                    });
                }
                Err(err) => {
                    self.failed = true;
                    return Err(err.at_index(self.current_record_index));
                }
            }
        }
        Ok(())
    }

    /// Check if a raw unit beyond the held back trailing ones is available
    pub fn has_next(&mut self) -> Result<bool> {
        self.fill_queue(false)?;
        Ok(self.queue.len() > self.ignore_last)
    }

    /// Take the oldest queued raw unit
    pub fn next_raw(&mut self) -> Result<RecordRawData> {
        if !self.has_next()? {
            return Err(RecordError::Exhausted);
        }
        self.queue.pop_front().ok_or(RecordError::Exhausted)
    }

    /// Number of leading raw units to hold back
    pub fn ignore_first(&self) -> usize {
        self.ignore_first
    }

    /// Number of trailing raw units to hold back
    pub fn ignore_last(&self) -> usize {
        self.ignore_last
    }

    /// Index the next raw unit read from the source will get
    pub fn current_record_index(&self) -> u64 {
        self.current_record_index
    }

    /// Whether the source reported its end
    pub fn end_reached(&self) -> bool {
        self.end_reached
    }

    /// Leading raw units that were held back
    pub fn first_held(&self) -> &[RecordRawData] {
        &self.first
    }

    /// Trailing raw units that were held back. Only complete once the end is reached.
    pub fn last_held(&self) -> &[RecordRawData] {
        &self.last
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The underlying source, mutably
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the window and return the source
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: RawSource> Iterator for RawDataWindow<S> {
    type Item = Result<RecordRawData>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.has_next() {
            Ok(true) => Some(self.next_raw()),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
