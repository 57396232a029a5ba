//! Properties files: `key=value` lines with backslash escapes
//!
//! A logical line may span several physical lines: a line ending in an odd number of
//! backslashes continues on the next one, whose leading whitespace is dropped. Lines whose
//! first non-whitespace character is `#` or `!` are comments. The last comment before an
//! entry can become the record's category.
//!
//! Key and value are split on the first unescaped `=`, `:` or whitespace, and then
//! unescaped by a small state machine (`\t \n \r \f`, `\uXXXX`, and `\x` for any other `x`).

use crate::constants::{
    LineSeparator, PRINTABLE_MAX, PRINTABLE_MIN, PROPERTIES_COMMENT_PREFIX, PROPERTIES_DELIMITER,
    PROPERTIES_KEY_PREFIX_DELIMITER, UNICODE_ESCAPE_LENGTH,
};
use crate::consumer::{push_line, RecordEncoder};
use crate::error::RecordError;
use crate::format::{ReadableFileSpec, WritableFileSpec};
use crate::lines;
use crate::producer::RecordDecoder;
use crate::types::{RecordRawData, TextRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

const ESCAPE: char = '\\';

/// Options of a properties file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertiesFileSpec {
    /// Value used when a line has a key but no value
    pub read_null_value_replacement: Option<String>,

    /// Store the last comment before an entry as its category
    pub comment_as_category: bool,

    /// Terminator written after each line
    pub line_separator: LineSeparator,

    /// Text written for a null value
    pub write_null_value_replacement: String,

    /// Write characters outside `0x20..=0x7E` as `\uXXXX`
    pub escape_unicode: bool,

    /// Start the file with a comment holding the current date and time
    pub date_comment: bool,

    /// Write `category + delimiter + key` as key when a record has a category
    pub category_as_key_prefix: bool,

    /// Delimiter between category and key
    pub key_prefix_delimiter: String,
}

impl Default for PropertiesFileSpec {
    fn default() -> Self {
        Self {
            read_null_value_replacement: Some(String::new()),
            comment_as_category: false,
            line_separator: LineSeparator::default(),
            write_null_value_replacement: String::new(),
            escape_unicode: false,
            date_comment: false,
            category_as_key_prefix: false,
            key_prefix_delimiter: PROPERTIES_KEY_PREFIX_DELIMITER.to_string(),
        }
    }
}

impl PropertiesFileSpec {
    /// Spec with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the preceding comment as category
    pub fn with_comment_as_category(mut self, enabled: bool) -> Self {
        self.comment_as_category = enabled;
        self
    }

    /// Set the value used for a missing value while reading
    pub fn with_read_null_value_replacement(mut self, replacement: Option<String>) -> Self {
        self.read_null_value_replacement = replacement;
        self
    }

    /// Set the text written for a null value
    pub fn with_write_null_value_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.write_null_value_replacement = replacement.into();
        self
    }

    /// Escape everything outside printable ASCII
    pub fn with_escape_unicode(mut self, enabled: bool) -> Self {
        self.escape_unicode = enabled;
        self
    }

    /// Write a date comment first
    pub fn with_date_comment(mut self, enabled: bool) -> Self {
        self.date_comment = enabled;
        self
    }

    /// Prefix keys with the record category
    pub fn with_category_as_key_prefix(mut self, delimiter: impl Into<String>) -> Self {
        self.category_as_key_prefix = true;
        self.key_prefix_delimiter = delimiter.into();
        self
    }

    /// Set the line terminator
    pub fn with_line_separator(mut self, separator: LineSeparator) -> Self {
        self.line_separator = separator;
        self
    }

    /// Check the spec
    pub fn validate(&self) -> Result<()> {
        if self.category_as_key_prefix && self.key_prefix_delimiter.is_empty() {
            return Err(RecordError::Config(
                "key prefix delimiter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_separator_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// Read one logical line. Returns the last comment seen before it and the joined text.
fn read_logical_line<R: BufRead + ?Sized>(reader: &mut R) -> Result<Option<(Option<String>, String)>> {
    let mut logical = String::new();
    let mut comment = None;
    let mut multi_line = false;

    loop {
        let line = lines::read_line(reader)?;
        let mut comment_found = false;
        let mut escape = false;
        let mut key_start = None;

        if let Some(line) = &line {
            for (i, c) in line.char_indices() {
                if !multi_line && key_start.is_none() && (c == '#' || c == '!') {
                    comment_found = true;
                    comment = Some(line[i + 1..].to_string());
                    break;
                }
                if key_start.is_none() && !is_separator_whitespace(c) {
                    key_start = Some(i);
                }
                escape = c == ESCAPE && !escape;
            }
            if let (false, Some(start)) = (comment_found, key_start) {
                // a continuation backslash is one byte
                let end = if escape { line.len() - 1 } else { line.len() };
                logical.push_str(&line[start..end]);
            }
        }

        multi_line = escape;
        if !(comment_found || multi_line) {
            if line.is_none() && logical.is_empty() {
                return Ok(None);
            }
            return Ok(Some((comment, logical)));
        }
    }
}

/// Split a logical line into its still escaped key and value
pub fn split_key_value(line: &str) -> (Option<&str>, Option<&str>) {
    let mut escape = false;
    let mut delimiter_found = false;
    let mut key_start = None;
    let mut key_end = None;
    let mut value_start = None;

    for (i, c) in line.char_indices() {
        if key_start.is_none() && !is_separator_whitespace(c) {
            key_start = Some(i);
        }
        if key_end.is_none() {
            if !escape && key_start.is_some() && (matches!(c, '=' | ':') || is_separator_whitespace(c)) {
                key_end = Some(i);
                delimiter_found = matches!(c, '=' | ':');
            }
            escape = c == ESCAPE && !escape;
        } else if !is_separator_whitespace(c) {
            if !delimiter_found && matches!(c, '=' | ':') {
                delimiter_found = true;
            } else {
                value_start = Some(i);
                break;
            }
        }
    }

    let key = key_start.map(|start| &line[start..key_end.unwrap_or(line.len())]);
    let value = value_start.map(|start| &line[start..]);
    (key, value)
}

/// Scanner state while unescaping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    Normal,
    Escape,
    Unicode { digits: usize, value: u32 },
}

struct Unescaper {
    out: String,
    state: EscapeState,
    high_surrogate: Option<u32>,
}

impl Unescaper {
    fn push(&mut self, c: char) -> Result<()> {
        if self.high_surrogate.is_some() {
            return Err(RecordError::decode("Unpaired surrogate in unicode sequence!"));
        }
        self.out.push(c);
        Ok(())
    }

    fn push_code_unit(&mut self, unit: u32) -> Result<()> {
        let invalid = || RecordError::decode(format!("Invalid unicode sequence found! {:04X}", unit));
        match unit {
            0xD800..=0xDBFF => {
                if self.high_surrogate.replace(unit).is_some() {
                    return Err(invalid());
                }
                Ok(())
            }
            0xDC00..=0xDFFF => {
                let high = self.high_surrogate.take().ok_or_else(invalid)?;
                let code = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                self.out.push(char::from_u32(code).ok_or_else(invalid)?);
                Ok(())
            }
            _ => self.push(char::from_u32(unit).ok_or_else(invalid)?),
        }
    }

    fn feed(&mut self, c: char) -> Result<()> {
        let state = self.state;
        self.state = match state {
            EscapeState::Normal if c == ESCAPE => EscapeState::Escape,
            EscapeState::Normal => {
                self.push(c)?;
                EscapeState::Normal
            }
            EscapeState::Escape if c == 'u' => EscapeState::Unicode { digits: 0, value: 0 },
            EscapeState::Escape => {
                self.push(match c {
                    'f' => '\u{c}',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    other => other,
                })?;
                EscapeState::Normal
            }
            EscapeState::Unicode { digits, value } => {
                let digit = c.to_digit(16).ok_or_else(|| {
                    RecordError::decode(format!("Invalid unicode sequence found! {}", c))
                })?;
                let value = value * 16 + digit;
                if digits + 1 == UNICODE_ESCAPE_LENGTH {
                    self.push_code_unit(value)?;
                    EscapeState::Normal
                } else {
                    EscapeState::Unicode {
                        digits: digits + 1,
                        value,
                    }
                }
            }
        };
        Ok(())
    }

    fn finish(self) -> Result<String> {
        match self.state {
            EscapeState::Escape => Err(RecordError::decode(
                "Unhandled or unfinished escape sequence found!",
            )),
            EscapeState::Unicode { .. } => Err(RecordError::decode(
                "Unhandled or unfinished unicode sequence found!",
            )),
            EscapeState::Normal if self.high_surrogate.is_some() => Err(RecordError::decode(
                "Unpaired surrogate in unicode sequence!",
            )),
            EscapeState::Normal => Ok(self.out),
        }
    }
}

/// Resolve backslash escapes
pub fn unescape(encoded: &str) -> Result<String> {
    let mut unescaper = Unescaper {
        out: String::with_capacity(encoded.len()),
        state: EscapeState::Normal,
        high_surrogate: None,
    };
    for c in encoded.chars() {
        unescaper.feed(c)?;
    }
    unescaper.finish()
}

fn push_escaped(out: &mut String, c: char, escape_space: bool, escape_unicode: bool) {
    match c {
        ' ' if escape_space => out.push_str("\\ "),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\u{c}' => out.push_str("\\f"),
        '\\' | '=' | ':' | '#' | '!' => {
            out.push(ESCAPE);
            out.push(c);
        }
        _ if escape_unicode && !(PRINTABLE_MIN..=PRINTABLE_MAX).contains(&c) => {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04X}", unit));
            }
        }
        _ => out.push(c),
    }
}

/// Escape a key. Every space is escaped.
pub fn escape_key(key: &str, escape_unicode: bool) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        push_escaped(&mut out, c, true, escape_unicode);
    }
    out
}

/// Escape a value. Only a leading space is escaped.
pub fn escape_value(value: &str, escape_unicode: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        push_escaped(&mut out, c, i == 0, escape_unicode);
    }
    out
}

/// Decoder for [`PropertiesFileSpec`]
#[derive(Debug, Clone)]
pub struct PropertiesDecoder {
    spec: PropertiesFileSpec,
}

impl RecordDecoder for PropertiesDecoder {
    fn read_raw<R: BufRead>(&mut self, reader: &mut R, record_index: u64) -> Result<Option<RecordRawData>> {
        Ok(read_logical_line(reader)?
            .map(|(comment, line)| RecordRawData::new(comment, Some(record_index), line)))
    }

    fn decode(&self, raw: RecordRawData) -> Result<Option<TextRecord>> {
        let (key, value) = split_key_value(&raw.raw_data);
        let Some(key) = key else {
            return Ok(None);
        };
        let key = unescape(key)?;
        let value = match value {
            Some(value) => Some(unescape(value)?),
            None => self.spec.read_null_value_replacement.clone(),
        };
        let category = if self.spec.comment_as_category {
            raw.category
        } else {
            None
        };
        Ok(Some(TextRecord::key_value(category, raw.record_id, key, value)))
    }
}

/// Encoder for [`PropertiesFileSpec`]
#[derive(Debug, Clone)]
pub struct PropertiesEncoder {
    spec: PropertiesFileSpec,
}

impl RecordEncoder for PropertiesEncoder {
    fn encode_before(&mut self, out: &mut String) -> Result<()> {
        if self.spec.date_comment {
            let now = chrono::Local::now().format("%a %b %d %H:%M:%S %z %Y");
            push_line(
                out,
                &format!("{}{}", PROPERTIES_COMMENT_PREFIX, now),
                self.spec.line_separator,
            );
        }
        Ok(())
    }

    fn encode_record(&mut self, record: &TextRecord, out: &mut String) -> Result<()> {
        let key = record
            .text_at(0)
            .ok_or_else(|| RecordError::Encode(format!("record without key: {}", record)))?;
        let key = match record.category() {
            Some(category) if self.spec.category_as_key_prefix => {
                format!("{}{}{}", category, self.spec.key_prefix_delimiter, key)
            }
            _ => key.to_string(),
        };
        let value = record
            .text_at(1)
            .unwrap_or(&self.spec.write_null_value_replacement);

        out.push_str(&escape_key(&key, self.spec.escape_unicode));
        out.push_str(PROPERTIES_DELIMITER);
        out.push_str(&escape_value(value, self.spec.escape_unicode));
        out.push_str(self.spec.line_separator.as_str());
        Ok(())
    }
}

impl ReadableFileSpec for PropertiesFileSpec {
    type Decoder = PropertiesDecoder;

    fn decoder(&self) -> Result<PropertiesDecoder> {
        self.validate()?;
        Ok(PropertiesDecoder { spec: self.clone() })
    }
}

impl WritableFileSpec for PropertiesFileSpec {
    type Encoder = PropertiesEncoder;

    fn encoder(&self) -> Result<PropertiesEncoder> {
        self.validate()?;
        Ok(PropertiesEncoder { spec: self.clone() })
    }

    fn line_separator(&self) -> LineSeparator {
        self.line_separator
    }
}
