//! The text formats
//!
//! Every format has a file spec implementing [`ReadableFileSpec`] and [`WritableFileSpec`].
//! The spec validates itself and builds the decoder or encoder that a [`TextProducer`] or
//! [`TextConsumer`] drives.

pub mod delimited;
pub mod fixed_width;
pub mod markdown_list;
pub mod markdown_table;
pub mod properties;

use crate::constants::{LineSeparator, MAX_IGNORED_RECORDS};
use crate::consumer::{RecordConsumer, RecordEncoder, TextConsumer};
use crate::error::RecordError;
use crate::producer::{RecordDecoder, RecordProducer, TextProducer};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

pub use delimited::{DelimitedFieldSpec, DelimitedFileSpec};
pub use fixed_width::{FixedWidthFieldSpec, FixedWidthFileSpec};
pub use markdown_list::{ListMarker, MarkdownListFileSpec};
pub use markdown_table::{MarkdownTableFieldSpec, MarkdownTableFileSpec};
pub use properties::PropertiesFileSpec;

/// Reject hold-back counts the window could not buffer
pub(crate) fn validate_ignored_records(first: usize, last: usize) -> Result<()> {
    if first > MAX_IGNORED_RECORDS || last > MAX_IGNORED_RECORDS {
        return Err(RecordError::Config(format!(
            "ignored records must be at most {}, got {} first and {} last",
            MAX_IGNORED_RECORDS, first, last
        )));
    }
    Ok(())
}

/// A spec that can read records
pub trait ReadableFileSpec {
    /// Decoder built from this spec
    type Decoder: RecordDecoder;

    /// Validate the spec and build its decoder
    fn decoder(&self) -> Result<Self::Decoder>;

    /// Producer reading from `reader`
    fn producer<R: BufRead>(&self, reader: R) -> Result<TextProducer<R, Self::Decoder>> {
        Ok(TextProducer::new(reader, self.decoder()?))
    }
}

/// A spec that can write records
pub trait WritableFileSpec {
    /// Encoder built from this spec
    type Encoder: RecordEncoder;

    /// Validate the spec and build its encoder
    fn encoder(&self) -> Result<Self::Encoder>;

    /// Terminator the encoder writes after each line
    fn line_separator(&self) -> LineSeparator;

    /// Consumer writing to `writer`
    fn consumer<W: Write>(&self, writer: W) -> Result<TextConsumer<W, Self::Encoder>> {
        Ok(TextConsumer::new(writer, self.encoder()?))
    }
}

/// Any of the file specs, tagged by `format` when serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum FileSpec {
    /// Simple delimited text
    Delimited(DelimitedFileSpec),
    /// Fixed-width columns
    FixedWidth(FixedWidthFileSpec),
    /// Key/value properties
    Properties(PropertiesFileSpec),
    /// Markdown list
    MarkdownList(MarkdownListFileSpec),
    /// Markdown table
    MarkdownTable(MarkdownTableFileSpec),
}

impl FileSpec {
    /// Name of the format, as used by the `format` tag
    pub fn format_name(&self) -> &'static str {
        match self {
            FileSpec::Delimited(_) => "delimited",
            FileSpec::FixedWidth(_) => "fixed_width",
            FileSpec::Properties(_) => "properties",
            FileSpec::MarkdownList(_) => "markdown_list",
            FileSpec::MarkdownTable(_) => "markdown_table",
        }
    }

    /// Check the wrapped spec
    pub fn validate(&self) -> Result<()> {
        match self {
            FileSpec::Delimited(spec) => spec.validate(),
            FileSpec::FixedWidth(spec) => spec.validate(),
            FileSpec::Properties(spec) => spec.validate(),
            FileSpec::MarkdownList(spec) => spec.validate(),
            FileSpec::MarkdownTable(spec) => spec.validate(),
        }
    }

    /// Terminator of the wrapped spec
    pub fn line_separator(&self) -> LineSeparator {
        match self {
            FileSpec::Delimited(spec) => spec.line_separator,
            FileSpec::FixedWidth(spec) => spec.line_separator,
            FileSpec::Properties(spec) => spec.line_separator,
            FileSpec::MarkdownList(spec) => spec.line_separator,
            FileSpec::MarkdownTable(spec) => spec.line_separator,
        }
    }

    /// Producer of the wrapped format
    pub fn producer<'a, R: BufRead + 'a>(&self, reader: R) -> Result<Box<dyn RecordProducer + 'a>> {
        Ok(match self {
            FileSpec::Delimited(spec) => Box::new(spec.producer(reader)?),
            FileSpec::FixedWidth(spec) => Box::new(spec.producer(reader)?),
            FileSpec::Properties(spec) => Box::new(spec.producer(reader)?),
            FileSpec::MarkdownList(spec) => Box::new(spec.producer(reader)?),
            FileSpec::MarkdownTable(spec) => Box::new(spec.producer(reader)?),
        })
    }

    /// Consumer of the wrapped format
    pub fn consumer<'a, W: Write + 'a>(&self, writer: W) -> Result<Box<dyn RecordConsumer + 'a>> {
        Ok(match self {
            FileSpec::Delimited(spec) => Box::new(spec.consumer(writer)?),
            FileSpec::FixedWidth(spec) => Box::new(spec.consumer(writer)?),
            FileSpec::Properties(spec) => Box::new(spec.consumer(writer)?),
            FileSpec::MarkdownList(spec) => Box::new(spec.consumer(writer)?),
            FileSpec::MarkdownTable(spec) => Box::new(spec.consumer(writer)?),
        })
    }
}

impl From<DelimitedFileSpec> for FileSpec {
    fn from(spec: DelimitedFileSpec) -> Self {
        FileSpec::Delimited(spec)
    }
}

impl From<FixedWidthFileSpec> for FileSpec {
    fn from(spec: FixedWidthFileSpec) -> Self {
        FileSpec::FixedWidth(spec)
    }
}

impl From<PropertiesFileSpec> for FileSpec {
    fn from(spec: PropertiesFileSpec) -> Self {
        FileSpec::Properties(spec)
    }
}

impl From<MarkdownListFileSpec> for FileSpec {
    fn from(spec: MarkdownListFileSpec) -> Self {
        FileSpec::MarkdownList(spec)
    }
}

impl From<MarkdownTableFileSpec> for FileSpec {
    fn from(spec: MarkdownTableFileSpec) -> Self {
        FileSpec::MarkdownTable(spec)
    }
}
