//! Simple delimited text: one record per line, fields split on a literal delimiter
//!
//! There is no quoting. A field is everything between two delimiters; an empty field
//! decodes to null and a null field encodes to nothing.

use crate::constants::{LineSeparator, DELIMITER_COMMA};
use crate::consumer::{push_line, RecordEncoder};
use crate::error::RecordError;
use crate::format::{validate_ignored_records, ReadableFileSpec, WritableFileSpec};
use crate::lines::LineHandling;
use crate::producer::RecordDecoder;
use crate::types::{RecordRawData, TextRecord};
use crate::Result;
use memchr::memmem;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// One column of a delimited file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedFieldSpec {
    /// Optional column name, for documentation only
    pub name: Option<String>,
}

/// Layout and options of a simple delimited file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedFileSpec {
    /// Literal text between two fields
    pub field_delimiter: String,

    /// The columns; every record has exactly this many fields
    pub fields: Vec<DelimitedFieldSpec>,

    /// Lines discarded before the first record is read
    pub skip_first_lines: usize,

    /// Treatment of empty and blank lines
    pub line_handling: LineHandling,

    /// Leading records dropped after reading
    pub ignore_first_records: usize,

    /// Trailing records dropped after reading
    pub ignore_last_records: usize,

    /// Drop records whose fields are all null or empty
    pub skip_all_null_or_empty: bool,

    /// Terminator written after each line
    pub line_separator: LineSeparator,

    /// Text written before the first record
    pub text_before: Option<String>,

    /// Text written after the last record
    pub text_after: Option<String>,
}

impl Default for DelimitedFileSpec {
    fn default() -> Self {
        Self {
            field_delimiter: DELIMITER_COMMA.to_string(),
            fields: Vec::new(),
            skip_first_lines: 0,
            line_handling: LineHandling::ErrorOnBlankLine,
            ignore_first_records: 0,
            ignore_last_records: 0,
            skip_all_null_or_empty: false,
            line_separator: LineSeparator::default(),
            text_before: None,
            text_after: None,
        }
    }
}

impl DelimitedFileSpec {
    /// A spec with `field_count` unnamed columns
    pub fn new(field_delimiter: impl Into<String>, field_count: usize) -> Self {
        Self {
            field_delimiter: field_delimiter.into(),
            fields: vec![DelimitedFieldSpec::default(); field_count],
            ..Self::default()
        }
    }

    /// Set lines to skip before reading
    pub fn with_skip_first_lines(mut self, lines: usize) -> Self {
        self.skip_first_lines = lines;
        self
    }

    /// Set empty and blank line treatment
    pub fn with_line_handling(mut self, handling: LineHandling) -> Self {
        self.line_handling = handling;
        self
    }

    /// Set leading and trailing records to drop
    pub fn with_ignored_records(mut self, first: usize, last: usize) -> Self {
        self.ignore_first_records = first;
        self.ignore_last_records = last;
        self
    }

    /// Drop records without any text
    pub fn with_skip_all_null_or_empty(mut self, skip: bool) -> Self {
        self.skip_all_null_or_empty = skip;
        self
    }

    /// Set the line terminator
    pub fn with_line_separator(mut self, separator: LineSeparator) -> Self {
        self.line_separator = separator;
        self
    }

    /// Set the text written before and after the records
    pub fn with_text(mut self, before: Option<String>, after: Option<String>) -> Self {
        self.text_before = before;
        self.text_after = after;
        self
    }

    /// Check the spec
    pub fn validate(&self) -> Result<()> {
        if self.field_delimiter.is_empty() {
            return Err(RecordError::Config("field delimiter must not be empty".to_string()));
        }
        if self.fields.is_empty() {
            return Err(RecordError::Config("at least one field is required".to_string()));
        }
        validate_ignored_records(self.ignore_first_records, self.ignore_last_records)
    }
}

/// Decoder for [`DelimitedFileSpec`]
#[derive(Debug, Clone)]
pub struct DelimitedDecoder {
    spec: DelimitedFileSpec,
    finder: memmem::Finder<'static>,
}

impl DelimitedDecoder {
    /// Split `line` into exactly one text per column
    pub fn split(&self, line: &str) -> Vec<Option<String>> {
        let delimiter_len = self.spec.field_delimiter.len();
        let mut begin = 0;
        self.spec
            .fields
            .iter()
            .map(|_| {
                if begin >= line.len() {
                    begin += delimiter_len;
                    return None;
                }
                let end = self
                    .finder
                    .find(&line.as_bytes()[begin..])
                    .map_or(line.len(), |pos| begin + pos);
                let text = (begin < end).then(|| line[begin..end].to_string());
                begin = end + delimiter_len;
                text
            })
            .collect()
    }
}

impl RecordDecoder for DelimitedDecoder {
    fn skip_first_lines(&self) -> usize {
        self.spec.skip_first_lines
    }

    fn ignore_first(&self) -> usize {
        self.spec.ignore_first_records
    }

    fn ignore_last(&self) -> usize {
        self.spec.ignore_last_records
    }

    fn read_raw<R: BufRead>(&mut self, reader: &mut R, record_index: u64) -> Result<Option<RecordRawData>> {
        Ok(self
            .spec
            .line_handling
            .read_and_handle(reader)?
            .map(|line| RecordRawData::new(None, Some(record_index), line)))
    }

    fn decode(&self, raw: RecordRawData) -> Result<Option<TextRecord>> {
        let texts = self.split(&raw.raw_data);
        if self.spec.skip_all_null_or_empty
            && texts.iter().all(|t| t.as_deref().map_or(true, str::is_empty))
        {
            return Ok(None);
        }
        Ok(Some(TextRecord::many_fields(raw.category, raw.record_id, texts)))
    }
}

/// Encoder for [`DelimitedFileSpec`]
#[derive(Debug, Clone)]
pub struct DelimitedEncoder {
    spec: DelimitedFileSpec,
}

impl RecordEncoder for DelimitedEncoder {
    fn encode_before(&mut self, out: &mut String) -> Result<()> {
        if let Some(text) = &self.spec.text_before {
            push_line(out, text, self.spec.line_separator);
        }
        Ok(())
    }

    fn encode_record(&mut self, record: &TextRecord, out: &mut String) -> Result<()> {
        for index in 0..self.spec.fields.len() {
            if index > 0 {
                out.push_str(&self.spec.field_delimiter);
            }
            if let Some(text) = record.text_at(index) {
                out.push_str(text);
            }
        }
        out.push_str(self.spec.line_separator.as_str());
        Ok(())
    }

    fn encode_after(&mut self, out: &mut String) -> Result<()> {
        if let Some(text) = &self.spec.text_after {
            push_line(out, text, self.spec.line_separator);
        }
        Ok(())
    }
}

impl ReadableFileSpec for DelimitedFileSpec {
    type Decoder = DelimitedDecoder;

    fn decoder(&self) -> Result<DelimitedDecoder> {
        self.validate()?;
        Ok(DelimitedDecoder {
            spec: self.clone(),
            finder: memmem::Finder::new(self.field_delimiter.as_bytes()).into_owned(),
        })
    }
}

impl WritableFileSpec for DelimitedFileSpec {
    type Encoder = DelimitedEncoder;

    fn encoder(&self) -> Result<DelimitedEncoder> {
        self.validate()?;
        Ok(DelimitedEncoder { spec: self.clone() })
    }

    fn line_separator(&self) -> LineSeparator {
        self.line_separator
    }
}
