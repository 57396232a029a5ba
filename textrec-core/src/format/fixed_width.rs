//! Fixed-width columns inside a line or a block of `record_width` characters

use crate::constants::{Alignment, LineSeparator, DEFAULT_FILL_CHARACTER, MAX_RECORD_WIDTH};
use crate::consumer::{push_line, RecordEncoder};
use crate::error::RecordError;
use crate::format::{validate_ignored_records, ReadableFileSpec, WritableFileSpec};
use crate::lines;
use crate::producer::RecordDecoder;
use crate::types::{RecordRawData, TextRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// One column of a fixed-width file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedWidthFieldSpec {
    /// Character offset of the column inside the record
    pub start_index: usize,

    /// Width of the column in characters
    pub width: usize,

    /// Alignment overriding the file alignment
    #[serde(default)]
    pub alignment: Option<Alignment>,

    /// Fill character overriding the file fill character
    #[serde(default)]
    pub fill_character: Option<char>,
}

impl FixedWidthFieldSpec {
    /// A column using the file alignment and fill character
    pub fn new(start_index: usize, width: usize) -> Self {
        Self {
            start_index,
            width,
            alignment: None,
            fill_character: None,
        }
    }

    /// Override the alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Override the fill character
    pub fn with_fill_character(mut self, fill_character: char) -> Self {
        self.fill_character = Some(fill_character);
        self
    }

    fn alignment_in(&self, spec: &FixedWidthFileSpec) -> Alignment {
        self.alignment.unwrap_or(spec.alignment)
    }

    fn fill_character_in(&self, spec: &FixedWidthFileSpec) -> char {
        self.fill_character.unwrap_or(spec.fill_character)
    }
}

/// Layout and options of a fixed-width file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedWidthFileSpec {
    /// Characters per record
    pub record_width: usize,

    /// Records are lines; otherwise each record is a block of `record_width` characters
    pub separate_records_by_line: bool,

    /// Default alignment of the columns
    pub alignment: Alignment,

    /// Default fill character of the columns
    pub fill_character: char,

    /// The columns
    pub fields: Vec<FixedWidthFieldSpec>,

    /// Lines discarded before the first record is read
    pub skip_first_lines: usize,

    /// Leading records dropped after reading
    pub ignore_first_records: usize,

    /// Trailing records dropped after reading
    pub ignore_last_records: usize,

    /// Drop empty raw records
    pub skip_empty_lines: bool,

    /// Drop records whose fields are all null or empty
    pub skip_all_null_or_empty: bool,

    /// Terminator written after each line
    pub line_separator: LineSeparator,

    /// Text written before the first record
    pub text_before: Option<String>,

    /// Text written after the last record
    pub text_after: Option<String>,
}

impl Default for FixedWidthFileSpec {
    fn default() -> Self {
        Self {
            record_width: 0,
            separate_records_by_line: true,
            alignment: Alignment::Start,
            fill_character: DEFAULT_FILL_CHARACTER,
            fields: Vec::new(),
            skip_first_lines: 0,
            ignore_first_records: 0,
            ignore_last_records: 0,
            skip_empty_lines: false,
            skip_all_null_or_empty: false,
            line_separator: LineSeparator::default(),
            text_before: None,
            text_after: None,
        }
    }
}

impl FixedWidthFileSpec {
    /// A line based spec
    pub fn new(record_width: usize, fields: Vec<FixedWidthFieldSpec>) -> Self {
        Self {
            record_width,
            fields,
            ..Self::default()
        }
    }

    /// Read and write records as character blocks instead of lines
    pub fn with_blocks(mut self) -> Self {
        self.separate_records_by_line = false;
        self
    }

    /// Set the default alignment and fill character
    pub fn with_alignment(mut self, alignment: Alignment, fill_character: char) -> Self {
        self.alignment = alignment;
        self.fill_character = fill_character;
        self
    }

    /// Set lines to skip before reading
    pub fn with_skip_first_lines(mut self, lines: usize) -> Self {
        self.skip_first_lines = lines;
        self
    }

    /// Set leading and trailing records to drop
    pub fn with_ignored_records(mut self, first: usize, last: usize) -> Self {
        self.ignore_first_records = first;
        self.ignore_last_records = last;
        self
    }

    /// Set the skip flags
    pub fn with_skipping(mut self, empty_lines: bool, all_null_or_empty: bool) -> Self {
        self.skip_empty_lines = empty_lines;
        self.skip_all_null_or_empty = all_null_or_empty;
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
        if self.record_width == 0 {
            return Err(RecordError::Config("record width must be positive".to_string()));
        }
        if self.record_width > MAX_RECORD_WIDTH {
            return Err(RecordError::Config(format!(
                "record width must be at most {}, got {}",
                MAX_RECORD_WIDTH, self.record_width
            )));
        }
        if let Some(field) = self
            .fields
            .iter()
            .find(|f| f.start_index.checked_add(f.width).map_or(true, |end| end > MAX_RECORD_WIDTH))
        {
            return Err(RecordError::Config(format!(
                "field at {} with width {} ends beyond {}",
                field.start_index, field.width, MAX_RECORD_WIDTH
            )));
        }
        validate_ignored_records(self.ignore_first_records, self.ignore_last_records)
    }
}

/// Strip `fill_character` from the side(s) of `text` where the alignment puts the fill
pub fn remove_fill_characters(text: &str, fill_character: char, alignment: Alignment) -> &str {
    match alignment {
        Alignment::Start => text.trim_end_matches(fill_character),
        Alignment::Center => text.trim_matches(fill_character),
        Alignment::End => text.trim_start_matches(fill_character),
    }
}

/// Decoder for [`FixedWidthFileSpec`]
#[derive(Debug, Clone)]
pub struct FixedWidthDecoder {
    spec: FixedWidthFileSpec,
}

impl FixedWidthDecoder {
    /// Cut one text per column out of a raw record
    pub fn split(&self, raw: &str) -> Vec<Option<String>> {
        let chars: Vec<char> = raw.chars().collect();
        let data_length = chars.len().min(self.spec.record_width);
        self.spec
            .fields
            .iter()
            .map(|field| {
                let begin = field.start_index;
                let end = field.start_index.saturating_add(field.width).min(data_length);
                (begin < end).then(|| {
                    let text: String = chars[begin..end].iter().collect();
                    remove_fill_characters(
                        &text,
                        field.fill_character_in(&self.spec),
                        field.alignment_in(&self.spec),
                    )
                    .to_string()
                })
            })
            .collect()
    }
}

impl RecordDecoder for FixedWidthDecoder {
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
        let raw = if self.spec.separate_records_by_line {
            lines::read_line(reader)?
        } else {
            lines::read_chars(reader, self.spec.record_width)?
        };
        Ok(raw.map(|raw| RecordRawData::new(None, Some(record_index), raw)))
    }

    fn decode(&self, raw: RecordRawData) -> Result<Option<TextRecord>> {
        if self.spec.skip_empty_lines && raw.raw_data.is_empty() {
            return Ok(None);
        }
        let texts = self.split(&raw.raw_data);
        if self.spec.skip_all_null_or_empty
            && texts.iter().all(|t| t.as_deref().map_or(true, str::is_empty))
        {
            return Ok(None);
        }
        Ok(Some(TextRecord::many_fields(raw.category, raw.record_id, texts)))
    }
}

/// Encoder for [`FixedWidthFileSpec`]
#[derive(Debug, Clone)]
pub struct FixedWidthEncoder {
    spec: FixedWidthFileSpec,
}

impl FixedWidthEncoder {
    /// Render one record as exactly `record_width` characters. Overlong texts are truncated.
    pub fn render(&self, record: &TextRecord) -> String {
        let record_width = self.spec.record_width;
        let mut chars = vec![self.spec.fill_character; record_width];

        for (index, field) in self.spec.fields.iter().enumerate() {
            if field.start_index >= record_width {
                continue;
            }
            let field_width = field.width.min(record_width - field.start_index);
            if field_width == 0 {
                continue;
            }
            let slot = &mut chars[field.start_index..field.start_index + field_width];
            slot.fill(field.fill_character_in(&self.spec));

            let Some(text) = record.text_at(index) else {
                continue;
            };
            let value: Vec<char> = text.chars().collect();
            let copied = value.len().min(field_width);
            let (value_offset, slot_offset) = match field.alignment_in(&self.spec) {
                Alignment::Start => (0, 0),
                Alignment::Center => ((value.len() - copied) / 2, (field_width - copied) / 2),
                Alignment::End => (value.len() - copied, field_width - copied),
            };
            slot[slot_offset..slot_offset + copied]
                .copy_from_slice(&value[value_offset..value_offset + copied]);
        }

        chars.into_iter().collect()
    }
}

impl RecordEncoder for FixedWidthEncoder {
    fn encode_before(&mut self, out: &mut String) -> Result<()> {
        if let Some(text) = &self.spec.text_before {
            push_line(out, text, self.spec.line_separator);
        }
        Ok(())
    }

    fn encode_record(&mut self, record: &TextRecord, out: &mut String) -> Result<()> {
        out.push_str(&self.render(record));
        if self.spec.separate_records_by_line {
            out.push_str(self.spec.line_separator.as_str());
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

impl ReadableFileSpec for FixedWidthFileSpec {
    type Decoder = FixedWidthDecoder;

    fn decoder(&self) -> Result<FixedWidthDecoder> {
        self.validate()?;
        Ok(FixedWidthDecoder { spec: self.clone() })
    }
}

impl WritableFileSpec for FixedWidthFileSpec {
    type Encoder = FixedWidthEncoder;

    fn encoder(&self) -> Result<FixedWidthEncoder> {
        self.validate()?;
        Ok(FixedWidthEncoder { spec: self.clone() })
    }

    fn line_separator(&self) -> LineSeparator {
        self.line_separator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::{read_from_str, write_to_string};

    fn s(text: &str) -> Option<String> {
        Some(text.to_string())
    }

    fn two_columns() -> FixedWidthFileSpec {
        FixedWidthFileSpec::new(6, vec![FixedWidthFieldSpec::new(0, 3), FixedWidthFieldSpec::new(3, 3)])
    }

    #[test]
    fn test_remove_fill_characters() {
        assert_eq!(remove_fill_characters("__ab__", '_', Alignment::Start), "__ab");
        assert_eq!(remove_fill_characters("__ab__", '_', Alignment::Center), "ab");
        assert_eq!(remove_fill_characters("__ab__", '_', Alignment::End), "ab__");
        assert_eq!(remove_fill_characters("____", '_', Alignment::Start), "");
        assert_eq!(remove_fill_characters("____", '_', Alignment::End), "");
    }

    #[test]
    fn test_decode_line() {
        let records = read_from_str(&two_columns(), "ab cde\n").unwrap();
        assert_eq!(records[0].to_texts(), vec![s("ab"), s("cde")]);
    }

    #[test]
    fn test_short_line_yields_null_fields() {
        let records = read_from_str(&two_columns(), "abcd\nab\n\n").unwrap();
        assert_eq!(records[0].to_texts(), vec![s("abc"), s("d")]);
        assert_eq!(records[1].to_texts(), vec![s("ab"), None]);
        assert_eq!(records[2].to_texts(), vec![None, None]);
    }

    #[test]
    fn test_fill_only_field_is_empty_text() {
        let records = read_from_str(&two_columns(), "   xyz\n").unwrap();
        assert_eq!(records[0].to_texts(), vec![s(""), s("xyz")]);
    }

    #[test]
    fn test_line_longer_than_record_width_is_cut() {
        let spec = FixedWidthFileSpec::new(4, vec![FixedWidthFieldSpec::new(2, 10)]);
        let records = read_from_str(&spec, "abcdefgh\n").unwrap();
        assert_eq!(records[0].to_texts(), vec![s("cd")]);
    }

    #[test]
    fn test_block_mode() {
        let spec = FixedWidthFileSpec::new(4, vec![FixedWidthFieldSpec::new(0, 2), FixedWidthFieldSpec::new(2, 2)])
            .with_blocks();
        let records = read_from_str(&spec, "a bcd ef").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].to_texts(), vec![s("a"), s("bc")]);
        assert_eq!(records[1].to_texts(), vec![s("d"), s("ef")]);
    }

    #[test]
    fn test_skip_flags() {
        let spec = two_columns().with_skipping(true, true);
        let records = read_from_str(&spec, "\n      \nab cde\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_id(), Some(2));
    }

    #[test]
    fn test_encode_alignments() {
        let spec = FixedWidthFileSpec::new(
            15,
            vec![
                FixedWidthFieldSpec::new(0, 5),
                FixedWidthFieldSpec::new(5, 5).with_alignment(Alignment::Center),
                FixedWidthFieldSpec::new(10, 5)
                    .with_alignment(Alignment::End)
                    .with_fill_character('0'),
            ],
        );
        let record = TextRecord::many_fields(None, None, vec![s("ab"), s("cd"), s("42")]);
        let text = write_to_string(&spec, &[record], false).unwrap();
        assert_eq!(text, "ab    cd  00042\n");
    }

    #[test]
    fn test_encode_truncates() {
        let spec = FixedWidthFileSpec::new(
            9,
            vec![
                FixedWidthFieldSpec::new(0, 3),
                FixedWidthFieldSpec::new(3, 3).with_alignment(Alignment::Center),
                FixedWidthFieldSpec::new(6, 3).with_alignment(Alignment::End),
            ],
        );
        let encoder = spec.encoder().unwrap();
        let record = TextRecord::many_fields(None, None, vec![s("abcdef"), s("12345"), s("uvwxyz")]);
        assert_eq!(encoder.render(&record), "abc234xyz");
    }

    #[test]
    fn test_encode_field_beyond_record_width() {
        let spec = FixedWidthFileSpec::new(4, vec![FixedWidthFieldSpec::new(2, 5), FixedWidthFieldSpec::new(8, 2)]);
        let encoder = spec.encoder().unwrap();
        let record = TextRecord::many_fields(None, None, vec![s("xyz"), s("no")]);
        assert_eq!(encoder.render(&record), "  xy");
    }

    #[test]
    fn test_oversized_layout_is_rejected() {
        let huge = FixedWidthFileSpec::new(MAX_RECORD_WIDTH + 1, vec![FixedWidthFieldSpec::new(0, 1)]);
        assert!(matches!(huge.encoder(), Err(RecordError::Config(_))));

        let overflowing = FixedWidthFileSpec::new(4, vec![FixedWidthFieldSpec::new(usize::MAX, 2)]);
        assert!(matches!(read_from_str(&overflowing, "abcd\n"), Err(RecordError::Config(_))));

        let too_wide = FixedWidthFileSpec::new(4, vec![FixedWidthFieldSpec::new(0, MAX_RECORD_WIDTH + 1)]);
        assert!(matches!(too_wide.decoder(), Err(RecordError::Config(_))));

        let held_back = FixedWidthFileSpec::new(4, vec![FixedWidthFieldSpec::new(0, 4)])
            .with_ignored_records(usize::MAX, 0);
        assert!(matches!(held_back.decoder(), Err(RecordError::Config(_))));
    }

    #[test]
    fn test_field_ending_at_width_limit_decodes() {
        let spec = FixedWidthFileSpec::new(4, vec![FixedWidthFieldSpec::new(2, MAX_RECORD_WIDTH - 2)]);
        let records = read_from_str(&spec, "abcd\n").unwrap();
        assert_eq!(records[0].text_at(0), Some("cd"));
    }

    #[test]
    fn test_zero_record_width_is_rejected() {
        assert!(matches!(
            FixedWidthFileSpec::new(0, vec![]).decoder(),
            Err(RecordError::Config(_))
        ));
    }
}
