//! Markdown lists: one item per line, bullet (`*`, `-`, `+`) or ordered (`1.`, `1)`)

use crate::constants::{LineSeparator, LIST_MARKER_SEPARATOR, ORDERED_LIST_START_NUMBER};
use crate::consumer::{push_line, RecordEncoder};
use crate::error::RecordError;
use crate::format::{validate_ignored_records, ReadableFileSpec, WritableFileSpec};
use crate::lines::LineHandling;
use crate::producer::RecordDecoder;
use crate::types::{RecordRawData, TextRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Marker of a markdown list item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMarker {
    /// `* item`
    #[default]
    BulletAsterisk,
    /// `- item`
    BulletHyphenMinus,
    /// `+ item`
    BulletPlusSign,
    /// `1. item`
    OrderedPeriod,
    /// `1) item`
    OrderedParenthesis,
}

impl ListMarker {
    /// The marker for `c`, if it is one
    pub const fn of(c: char) -> Option<Self> {
        match c {
            '*' => Some(ListMarker::BulletAsterisk),
            '-' => Some(ListMarker::BulletHyphenMinus),
            '+' => Some(ListMarker::BulletPlusSign),
            '.' => Some(ListMarker::OrderedPeriod),
            ')' => Some(ListMarker::OrderedParenthesis),
            _ => None,
        }
    }

    /// The marker character
    pub const fn character(&self) -> char {
        match self {
            ListMarker::BulletAsterisk => '*',
            ListMarker::BulletHyphenMinus => '-',
            ListMarker::BulletPlusSign => '+',
            ListMarker::OrderedPeriod => '.',
            ListMarker::OrderedParenthesis => ')',
        }
    }

    /// Check if the marker follows an item number
    pub const fn is_ordered(&self) -> bool {
        matches!(self, ListMarker::OrderedPeriod | ListMarker::OrderedParenthesis)
    }

    /// Text written in front of item `number`
    pub fn line_prefix(&self, number: u64) -> String {
        if self.is_ordered() {
            format!("{}{}{}", number, self.character(), LIST_MARKER_SEPARATOR)
        } else {
            format!("{}{}", self.character(), LIST_MARKER_SEPARATOR)
        }
    }
}

/// A line recognised as list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<'a> {
    /// Everything up to and including the separator after the marker
    pub line_prefix: &'a str,
    /// Whitespace in front of the item
    pub indentation: &'a str,
    /// Item number of an ordered item
    pub number: Option<u64>,
    /// The marker
    pub marker: ListMarker,
    /// Item text after the separator
    pub value: &'a str,
}

/// Recognise a list item.
///
/// The first marker character after the indentation decides the kind. An ordered marker
/// needs a positive number in front of it, a bullet marker must come first. Either must be
/// followed by whitespace or end the line.
pub fn split(line: &str) -> Option<ListItem<'_>> {
    let mut first_non_whitespace = None;
    let mut found = None;
    for (index, c) in line.char_indices() {
        if c.is_whitespace() {
            continue;
        }
        first_non_whitespace.get_or_insert(index);
        if let Some(marker) = ListMarker::of(c) {
            found = Some((index, marker));
            break;
        }
    }
    let (marker_index, marker) = found?;
    let first_non_whitespace = first_non_whitespace?;

    let number = if marker.is_ordered() {
        let number = line[first_non_whitespace..marker_index]
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)?;
        Some(number)
    } else if first_non_whitespace == marker_index {
        None
    } else {
        return None;
    };

    // markers are ASCII
    let after_marker = marker_index + 1;
    let (prefix_end, value) = match line[after_marker..].chars().next() {
        None => (after_marker, ""),
        Some(c) if c.is_whitespace() => {
            let value_start = after_marker + c.len_utf8();
            (value_start, &line[value_start..])
        }
        Some(_) => return None,
    };

    Some(ListItem {
        line_prefix: &line[..prefix_end],
        indentation: &line[..first_non_whitespace],
        number,
        marker,
        value,
    })
}

/// Options of a markdown list file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownListFileSpec {
    /// Marker written in front of each item
    pub list_marker: ListMarker,

    /// Lines discarded before the first item is read
    pub skip_first_lines: usize,

    /// Treatment of empty and blank lines
    pub line_handling: LineHandling,

    /// Leading items dropped after reading
    pub ignore_first_records: usize,

    /// Trailing items dropped after reading
    pub ignore_last_records: usize,

    /// Trim item text
    pub trim_value_to_empty: bool,

    /// Drop items with empty text
    pub skip_empty_value: bool,

    /// Store the line prefix (indentation, number, marker) as category
    pub line_prefix_as_category: bool,

    /// Terminator written after each line
    pub line_separator: LineSeparator,

    /// Text written before the first item
    pub text_before: Option<String>,

    /// Text written after the last item
    pub text_after: Option<String>,

    /// Do not write records whose value is null
    pub skip_null_value: bool,
}

impl Default for MarkdownListFileSpec {
    fn default() -> Self {
        Self {
            list_marker: ListMarker::default(),
            skip_first_lines: 0,
            line_handling: LineHandling::SkipBlankLine,
            ignore_first_records: 0,
            ignore_last_records: 0,
            trim_value_to_empty: false,
            skip_empty_value: false,
            line_prefix_as_category: false,
            line_separator: LineSeparator::default(),
            text_before: None,
            text_after: None,
            skip_null_value: false,
        }
    }
}

impl MarkdownListFileSpec {
    /// Spec writing items with `list_marker`
    pub fn new(list_marker: ListMarker) -> Self {
        Self {
            list_marker,
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

    /// Set leading and trailing items to drop
    pub fn with_ignored_records(mut self, first: usize, last: usize) -> Self {
        self.ignore_first_records = first;
        self.ignore_last_records = last;
        self
    }

    /// Set how item values are cleaned up while reading
    pub fn with_value_handling(mut self, trim_to_empty: bool, skip_empty: bool) -> Self {
        self.trim_value_to_empty = trim_to_empty;
        self.skip_empty_value = skip_empty;
        self
    }

    /// Store the line prefix as category
    pub fn with_line_prefix_as_category(mut self, enabled: bool) -> Self {
        self.line_prefix_as_category = enabled;
        self
    }

    /// Do not write null values
    pub fn with_skip_null_value(mut self, enabled: bool) -> Self {
        self.skip_null_value = enabled;
        self
    }

    /// Set the text written before and after the items
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
        validate_ignored_records(self.ignore_first_records, self.ignore_last_records)
    }
}

/// Decoder for [`MarkdownListFileSpec`]
#[derive(Debug, Clone)]
pub struct MarkdownListDecoder {
    spec: MarkdownListFileSpec,
}

impl RecordDecoder for MarkdownListDecoder {
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
        let item = split(&raw.raw_data).ok_or(RecordError::InvalidListItem {
            index: raw.record_id.unwrap_or_default(),
        })?;
        let value = if self.spec.trim_value_to_empty {
            item.value.trim()
        } else {
            item.value
        };
        if self.spec.skip_empty_value && value.is_empty() {
            return Ok(None);
        }
        let category = self
            .spec
            .line_prefix_as_category
            .then(|| item.line_prefix.to_string());
        Ok(Some(TextRecord::single_value(category, raw.record_id, Some(value.to_string()))))
    }
}

/// Encoder for [`MarkdownListFileSpec`]
#[derive(Debug, Clone)]
pub struct MarkdownListEncoder {
    spec: MarkdownListFileSpec,
    current_number: u64,
}

impl RecordEncoder for MarkdownListEncoder {
    fn encode_before(&mut self, out: &mut String) -> Result<()> {
        if let Some(text) = &self.spec.text_before {
            push_line(out, text, self.spec.line_separator);
        }
        self.current_number = ORDERED_LIST_START_NUMBER;
        Ok(())
    }

    fn encode_record(&mut self, record: &TextRecord, out: &mut String) -> Result<()> {
        let value = record.value();
        if self.spec.skip_null_value && value.is_none() {
            return Ok(());
        }
        out.push_str(&self.spec.list_marker.line_prefix(self.current_number));
        if let Some(value) = value {
            out.push_str(value);
        }
        out.push_str(self.spec.line_separator.as_str());
        self.current_number += 1;
        Ok(())
    }

    fn encode_after(&mut self, out: &mut String) -> Result<()> {
        if let Some(text) = &self.spec.text_after {
            push_line(out, text, self.spec.line_separator);
        }
        Ok(())
    }
}

impl ReadableFileSpec for MarkdownListFileSpec {
    type Decoder = MarkdownListDecoder;

    fn decoder(&self) -> Result<MarkdownListDecoder> {
        self.validate()?;
        Ok(MarkdownListDecoder { spec: self.clone() })
    }
}

impl WritableFileSpec for MarkdownListFileSpec {
    type Encoder = MarkdownListEncoder;

    fn encoder(&self) -> Result<MarkdownListEncoder> {
        self.validate()?;
        Ok(MarkdownListEncoder {
            spec: self.clone(),
            current_number: ORDERED_LIST_START_NUMBER,
        })
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

    #[test]
    fn test_split_ordered() {
        let item = split("3. item").unwrap();
        assert_eq!(item.number, Some(3));
        assert_eq!(item.marker, ListMarker::OrderedPeriod);
        assert_eq!(item.value, "item");
        assert_eq!(item.line_prefix, "3. ");

        let item = split("  12) twelve").unwrap();
        assert_eq!(item.number, Some(12));
        assert_eq!(item.marker, ListMarker::OrderedParenthesis);
        assert_eq!(item.indentation, "  ");
        assert_eq!(item.line_prefix, "  12) ");
    }

    #[test]
    fn test_split_bullet() {
        let item = split("- item").unwrap();
        assert_eq!(item.marker, ListMarker::BulletHyphenMinus);
        assert_eq!(item.number, None);
        assert_eq!(item.value, "item");

        let item = split("\t* nested  ").unwrap();
        assert_eq!(item.indentation, "\t");
        assert_eq!(item.value, "nested  ");

        let item = split("+").unwrap();
        assert_eq!(item.value, "");
        assert_eq!(item.line_prefix, "+");
    }

    #[test]
    fn test_split_rejects() {
        assert_eq!(split("not a list"), None);
        assert_eq!(split(""), None);
        assert_eq!(split("   "), None);
        assert_eq!(split("-item"), None);
        assert_eq!(split("0. zero"), None);
        assert_eq!(split("x. letter"), None);
        assert_eq!(split(". no number"), None);
        assert_eq!(split("1.5. decimal"), None);
        assert_eq!(split("word - dash"), None);
    }

    #[test]
    fn test_split_keeps_only_one_separator() {
        assert_eq!(split("*  two spaces").unwrap().value, " two spaces");
        assert_eq!(split("*\u{3000}wide").unwrap().value, "wide");
    }

    #[test]
    fn test_read_list() {
        let spec = MarkdownListFileSpec::default()
            .with_skip_first_lines(1)
            .with_value_handling(true, true)
            .with_line_prefix_as_category(true);
        let records = read_from_str(&spec, "# Title\n\n* one\n  2. two \n\n- \n+ three\n").unwrap();
        let values: Vec<_> = records.iter().map(|r| r.value().unwrap()).collect();
        assert_eq!(values, vec!["one", "two", "three"]);
        assert_eq!(records[1].category(), Some("  2. "));
    }

    #[test]
    fn test_huge_ignored_records_are_rejected() {
        let spec = MarkdownListFileSpec::default().with_ignored_records(1, usize::MAX);
        assert!(matches!(read_from_str(&spec, "* a\n"), Err(RecordError::Config(_))));
    }

    #[test]
    fn test_invalid_item_is_error() {
        let err = read_from_str(&MarkdownListFileSpec::default(), "* ok\nplain text\n").unwrap_err();
        assert_eq!(err, RecordError::InvalidListItem { index: 1 });
        assert_eq!(err.to_string(), "Line is not a valid markdown list item! index=1");
    }

    #[test]
    fn test_write_ordered_list() {
        let spec = MarkdownListFileSpec::new(ListMarker::OrderedPeriod)
            .with_skip_null_value(true)
            .with_text(s("Items:"), None);
        let records = vec![
            TextRecord::single_value(None, None, s("a")),
            TextRecord::single_value(None, None, None),
            TextRecord::key_value(None, None, "k", s("b")),
        ];
        let text = write_to_string(&spec, &records, false).unwrap();
        assert_eq!(text, "Items:\n1. a\n2. b\n");
    }

    #[test]
    fn test_write_bullet_list_with_null() {
        let spec = MarkdownListFileSpec::new(ListMarker::BulletHyphenMinus);
        let records = vec![TextRecord::single_value(None, None, None), TextRecord::single_value(None, None, s("x"))];
        assert_eq!(write_to_string(&spec, &records, false).unwrap(), "- \n- x\n");
    }
}
