//! Markdown tables: a header row, an alignment row, then one row per record
//!
//! Cells are padded to the column's minimum width plus one fill character on each side.
//! A literal `|` inside a cell is written as `\|`.

use crate::constants::{
    Alignment, LineSeparator, DEFAULT_FILL_CHARACTER, TABLE_ALIGNMENT_INDICATOR, TABLE_COLUMN_MAX_WIDTH,
    TABLE_COLUMN_MIN_WIDTH, TABLE_FIELD_DELIMITER, TABLE_FIELD_DELIMITER_ESCAPED, TABLE_HEADER_DELIMITER,
};
use crate::consumer::{push_line, RecordEncoder};
use crate::error::RecordError;
use crate::format::{validate_ignored_records, ReadableFileSpec, WritableFileSpec};
use crate::lines::LineHandling;
use crate::producer::RecordDecoder;
use crate::types::{RecordRawData, TextRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Header and alignment row in front of the records
const HEADER_ROWS: usize = 2;

fn default_min_width() -> usize {
    TABLE_COLUMN_MIN_WIDTH
}

/// One column of a markdown table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownTableFieldSpec {
    /// Column title written in the header row
    #[serde(default)]
    pub name: Option<String>,

    /// Minimum cell width in characters, without the surrounding fill
    #[serde(default = "default_min_width")]
    pub min_width: usize,

    /// Alignment overriding the file alignment
    #[serde(default)]
    pub alignment: Option<Alignment>,
}

impl MarkdownTableFieldSpec {
    /// A column of minimal width
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            min_width: TABLE_COLUMN_MIN_WIDTH,
            alignment: None,
        }
    }

    /// Set the minimum width
    pub fn with_min_width(mut self, min_width: usize) -> Self {
        self.min_width = min_width;
        self
    }

    /// Override the alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    fn alignment_in(&self, spec: &MarkdownTableFileSpec) -> Alignment {
        self.alignment.unwrap_or(spec.alignment)
    }
}

/// Layout and options of a markdown table file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownTableFileSpec {
    /// The columns
    pub fields: Vec<MarkdownTableFieldSpec>,

    /// Default alignment of the columns
    pub alignment: Alignment,

    /// Lines discarded before the header row is read
    pub skip_first_lines: usize,

    /// Treatment of empty and blank lines
    pub line_handling: LineHandling,

    /// Leading records dropped after the header rows
    pub ignore_first_records: usize,

    /// Trailing records dropped after reading
    pub ignore_last_records: usize,

    /// Terminator written after each line
    pub line_separator: LineSeparator,

    /// Text written before the header row
    pub text_before: Option<String>,

    /// Text written after the last row
    pub text_after: Option<String>,
}

impl Default for MarkdownTableFileSpec {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            alignment: Alignment::Start,
            skip_first_lines: 0,
            line_handling: LineHandling::SkipBlankLine,
            ignore_first_records: 0,
            ignore_last_records: 0,
            line_separator: LineSeparator::default(),
            text_before: None,
            text_after: None,
        }
    }
}

impl MarkdownTableFileSpec {
    /// A table with the given columns
    pub fn new(fields: Vec<MarkdownTableFieldSpec>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Set the default alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
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

    /// Set the text written before and after the table
    pub fn with_text(mut self, before: Option<String>, after: Option<String>) -> Self {
        self.text_before = before;
        self.text_after = after;
        self
    }

    /// Set the line terminator
    pub fn with_line_separator(mut self, separator: LineSeparator) -> Self {
        self.line_separator = separator;
        self
    }

    /// Check the spec
    pub fn validate(&self) -> Result<()> {
        if let Some(field) = self.fields.iter().find(|f| f.min_width < TABLE_COLUMN_MIN_WIDTH) {
            return Err(RecordError::Config(format!(
                "column min width must be at least {}, got {}",
                TABLE_COLUMN_MIN_WIDTH, field.min_width
            )));
        }
        if let Some(field) = self.fields.iter().find(|f| f.min_width > TABLE_COLUMN_MAX_WIDTH) {
            return Err(RecordError::Config(format!(
                "column min width must be at most {}, got {}",
                TABLE_COLUMN_MAX_WIDTH, field.min_width
            )));
        }
        validate_ignored_records(self.ignore_first_records, self.ignore_last_records)
    }
}

/// Split a table row into its cells.
///
/// The row must start and end with an unescaped `|`. `\|` becomes `|`, surrounding fill is
/// removed and an empty cell is null. Returns `None` for anything that is not a row.
pub fn split_row(line: &str) -> Option<Vec<Option<String>>> {
    let inner = line.trim().strip_prefix(TABLE_FIELD_DELIMITER)?;
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut closed = false;
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == TABLE_FIELD_DELIMITER {
            let text = current.trim_matches(DEFAULT_FILL_CHARACTER);
            cells.push((!text.is_empty()).then(|| text.to_string()));
            current.clear();
            closed = true;
            continue;
        }
        if c == '\\' && chars.peek() == Some(&TABLE_FIELD_DELIMITER) {
            chars.next();
            current.push(TABLE_FIELD_DELIMITER);
        } else {
            current.push(c);
        }
        closed = false;
    }
    closed.then_some(cells)
}

/// Decoder for [`MarkdownTableFileSpec`]
#[derive(Debug, Clone)]
pub struct MarkdownTableDecoder {
    spec: MarkdownTableFileSpec,
}

impl RecordDecoder for MarkdownTableDecoder {
    fn skip_first_lines(&self) -> usize {
        self.spec.skip_first_lines
    }

    fn ignore_first(&self) -> usize {
        self.spec.ignore_first_records.saturating_add(HEADER_ROWS)
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
        let mut cells = split_row(&raw.raw_data).ok_or(RecordError::InvalidTableRow {
            index: raw.record_id.unwrap_or_default(),
        })?;
        if !self.spec.fields.is_empty() {
            cells.resize(self.spec.fields.len(), None);
        }
        Ok(Some(TextRecord::many_fields(raw.category, raw.record_id, cells)))
    }
}

/// Encoder for [`MarkdownTableFileSpec`]
#[derive(Debug, Clone)]
pub struct MarkdownTableEncoder {
    spec: MarkdownTableFileSpec,
}

impl MarkdownTableEncoder {
    /// One padded cell without delimiters
    pub fn cell(&self, field: &MarkdownTableFieldSpec, text: Option<&str>) -> String {
        let text = text
            .unwrap_or_default()
            .replace(TABLE_FIELD_DELIMITER, TABLE_FIELD_DELIMITER_ESCAPED);
        let difference = field.min_width.saturating_sub(text.chars().count());
        let (fill_before, fill_after) = match field.alignment_in(&self.spec) {
            Alignment::Start => (0, difference),
            Alignment::Center => (difference / 2, (difference + 1) / 2),
            Alignment::End => (difference, 0),
        };

        let fill = DEFAULT_FILL_CHARACTER.to_string();
        let mut cell = String::with_capacity(text.len() + fill_before + fill_after + 2);
        cell.push_str(&fill.repeat(fill_before + 1));
        cell.push_str(&text);
        cell.push_str(&fill.repeat(fill_after + 1));
        cell
    }

    fn push_row<'a>(&self, out: &mut String, texts: impl Iterator<Item = Option<&'a str>>) {
        for (field, text) in self.spec.fields.iter().zip(texts) {
            out.push(TABLE_FIELD_DELIMITER);
            out.push_str(&self.cell(field, text));
        }
        out.push(TABLE_FIELD_DELIMITER);
        out.push_str(self.spec.line_separator.as_str());
    }

    fn push_alignment_row(&self, out: &mut String) {
        for field in &self.spec.fields {
            out.push(TABLE_FIELD_DELIMITER);
            let alignment = field.alignment_in(&self.spec);
            if alignment != Alignment::End {
                out.push(TABLE_ALIGNMENT_INDICATOR);
            }
            let dashes = field.min_width + usize::from(alignment != Alignment::Center);
            out.extend(std::iter::repeat(TABLE_HEADER_DELIMITER).take(dashes));
            if alignment != Alignment::Start {
                out.push(TABLE_ALIGNMENT_INDICATOR);
            }
        }
        out.push(TABLE_FIELD_DELIMITER);
        out.push_str(self.spec.line_separator.as_str());
    }
}

impl RecordEncoder for MarkdownTableEncoder {
    fn encode_before(&mut self, out: &mut String) -> Result<()> {
        if let Some(text) = &self.spec.text_before {
            push_line(out, text, self.spec.line_separator);
        }
        if !self.spec.fields.is_empty() {
            self.push_row(out, self.spec.fields.iter().map(|f| f.name.as_deref()));
            self.push_alignment_row(out);
        }
        Ok(())
    }

    fn encode_record(&mut self, record: &TextRecord, out: &mut String) -> Result<()> {
        if !self.spec.fields.is_empty() {
            self.push_row(out, (0..self.spec.fields.len()).map(|index| record.text_at(index)));
        }
        Ok(())
    }

    fn encode_after(&mut self, out: &mut String) -> Result<()> {
        if let Some(text) = &self.spec.text_after {
            push_line(out, text, self.spec.line_separator);
        }
        Ok(())
    }
}

impl ReadableFileSpec for MarkdownTableFileSpec {
    type Decoder = MarkdownTableDecoder;

    fn decoder(&self) -> Result<MarkdownTableDecoder> {
        self.validate()?;
        Ok(MarkdownTableDecoder { spec: self.clone() })
    }
}

impl WritableFileSpec for MarkdownTableFileSpec {
    type Encoder = MarkdownTableEncoder;

    fn encoder(&self) -> Result<MarkdownTableEncoder> {
        self.validate()?;
        Ok(MarkdownTableEncoder { spec: self.clone() })
    }

    fn line_separator(&self) -> LineSeparator {
        self.line_separator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::RecordProducer;
    use crate::streams::{read_from_str, write_to_string};
    use std::io::Cursor;

    fn s(text: &str) -> Option<String> {
        Some(text.to_string())
    }

    fn people() -> MarkdownTableFileSpec {
        MarkdownTableFileSpec::new(vec![
            MarkdownTableFieldSpec::new("Name"),
            MarkdownTableFieldSpec::new("Age").with_alignment(Alignment::End),
        ])
    }

    #[test]
    fn test_cell_padding() {
        let encoder = MarkdownTableFileSpec::default()
            .with_alignment(Alignment::Center)
            .encoder()
            .unwrap();
        let field = MarkdownTableFieldSpec::new("x");
        assert_eq!(encoder.cell(&field, Some("ab")), "  ab   ");
        assert_eq!(encoder.cell(&field, None), "       ");
        assert_eq!(encoder.cell(&field, Some("a|b")), " a\\|b  ");
        assert_eq!(encoder.cell(&field, Some("longer text")), " longer text ");
    }

    #[test]
    fn test_write_table() {
        let records = vec![
            TextRecord::many_fields(None, None, vec![s("Bob"), s("42")]),
            TextRecord::single_value(None, None, s("Alice")),
        ];
        let text = write_to_string(&people(), &records, false).unwrap();
        assert_eq!(
            text,
            "| Name  |   Age |\n\
             |:------|------:|\n\
             | Bob   |    42 |\n\
             | Alice |       |\n"
        );
    }

    #[test]
    fn test_centered_alignment_row() {
        let spec = MarkdownTableFileSpec::new(vec![MarkdownTableFieldSpec::new("C").with_min_width(6)])
            .with_alignment(Alignment::Center);
        let text = write_to_string(&spec, std::iter::empty(), false).unwrap();
        assert_eq!(text, "|   C    |\n|:------:|\n");
    }

    #[test]
    fn test_no_columns_writes_only_text() {
        let spec = MarkdownTableFileSpec::default().with_text(s("before"), s("after"));
        let records = vec![TextRecord::single_value(None, None, s("x"))];
        assert_eq!(write_to_string(&spec, &records, false).unwrap(), "before\nafter\n");
    }

    #[test]
    fn test_split_row() {
        assert_eq!(split_row("| a | b |"), Some(vec![s("a"), s("b")]));
        assert_eq!(split_row("  |a\\|b|   |  "), Some(vec![s("a|b"), None]));
        assert_eq!(split_row("| a | b"), None);
        assert_eq!(split_row("a | b |"), None);
        assert_eq!(split_row("| a \\|"), None);
        assert_eq!(split_row("|"), None);
        assert_eq!(split_row("||"), Some(vec![None]));
    }

    #[test]
    fn test_read_table_keeps_header_rows() {
        let input = "| Name  |   Age |\n|:------|------:|\n| Bob   |    42 |\n\n| a\\|b  |       |\n";
        let spec = people();
        let mut producer = spec.producer(Cursor::new(input.as_bytes().to_vec())).unwrap();
        producer.read_before().unwrap();
        let records: Vec<_> = producer.read_records().unwrap().collect::<Result<_>>().unwrap();
        producer.read_after().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].to_texts(), vec![s("Bob"), s("42")]);
        assert_eq!(records[1].to_texts(), vec![s("a|b"), None]);
        assert_eq!(records[0].record_id(), Some(2));
        let header = producer.first_ignored().unwrap();
        assert_eq!(header.len(), 2);
        assert_eq!(header[1].raw_data, "|:------|------:|");
    }

    #[test]
    fn test_read_pads_to_column_count() {
        let input = "|h|\n|-|\n| only |\n";
        let records = read_from_str(&people(), input).unwrap();
        assert_eq!(records[0].to_texts(), vec![s("only"), None]);
    }

    #[test]
    fn test_invalid_row() {
        let err = read_from_str(&people(), "|h|\n|-|\nnot a row\n").unwrap_err();
        assert_eq!(err, RecordError::InvalidTableRow { index: 2 });
    }

    #[test]
    fn test_min_width_validation() {
        let spec = MarkdownTableFileSpec::new(vec![MarkdownTableFieldSpec::new("x").with_min_width(3)]);
        assert!(matches!(spec.encoder(), Err(RecordError::Config(_))));

        let spec = MarkdownTableFileSpec::new(vec![MarkdownTableFieldSpec::new("x").with_min_width(usize::MAX)]);
        assert!(matches!(spec.encoder(), Err(RecordError::Config(_))));

        let spec =
            MarkdownTableFileSpec::new(vec![MarkdownTableFieldSpec::new("x")]).with_ignored_records(usize::MAX, 0);
        assert!(matches!(spec.decoder(), Err(RecordError::Config(_))));
    }
}
