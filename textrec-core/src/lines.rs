//! Line and character reading on top of [`BufRead`]

use crate::error::RecordError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, ErrorKind};

/// Read one line. `\n`, `\r\n` and a lone `\r` all end a line; the terminator is not returned.
///
/// Returns `None` at the end of the input.
pub fn read_line<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<String>> {
    let mut bytes = Vec::new();
    let mut read_any = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            break;
        }
        read_any = true;
        match memchr::memchr2(b'\n', b'\r', available) {
            Some(pos) => {
                let terminator = available[pos];
                bytes.extend_from_slice(&available[..pos]);
                reader.consume(pos + 1);
                if terminator == b'\r' && reader.fill_buf()?.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                return utf8(bytes).map(Some);
            }
            None => {
                let len = available.len();
                bytes.extend_from_slice(available);
                reader.consume(len);
            }
        }
    }
    if read_any {
        utf8(bytes).map(Some)
    } else {
        Ok(None)
    }
}

/// Read up to `count` characters. Fewer are returned only at the end of the input,
/// `None` when no character was left.
pub fn read_chars<R: BufRead + ?Sized>(reader: &mut R, count: usize) -> io::Result<Option<String>> {
    let mut text = String::new();
    let mut read = 0;
    while read < count {
        match read_char(reader)? {
            Some(c) => {
                text.push(c);
                read += 1;
            }
            None => break,
        }
    }
    Ok((read > 0).then_some(text))
}

/// Read and discard `count` lines
pub fn skip_lines<R: BufRead + ?Sized>(reader: &mut R, count: usize) -> io::Result<usize> {
    let mut skipped = 0;
    while skipped < count && read_line(reader)?.is_some() {
        skipped += 1;
    }
    Ok(skipped)
}

fn read_char<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<char>> {
    let mut buf = [0u8; 4];
    let lead = match reader.fill_buf()? {
        [] => return Ok(None),
        [lead, ..] => *lead,
    };
    reader.consume(1);
    buf[0] = lead;
    let width = match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Err(invalid_utf8()),
    };
    reader.read_exact(&mut buf[1..width])?;
    std::str::from_utf8(&buf[..width])
        .map_err(|_| invalid_utf8())
        .map(|s| s.chars().next())
}

fn utf8(bytes: Vec<u8>) -> io::Result<String> {
    String::from_utf8(bytes).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
}

fn invalid_utf8() -> io::Error {
    io::Error::new(ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}

fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

/// What a line-based producer does with empty (`""`) and blank (whitespace only) lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineHandling {
    /// Pass every line through unchanged
    #[default]
    NoHandling,
    /// An empty line ends the input
    TreatEmptyLineLikeEnd,
    /// A blank line ends the input
    TreatBlankLineLikeEnd,
    /// An empty line is a decode error
    ErrorOnEmptyLine,
    /// A blank line is a decode error
    ErrorOnBlankLine,
    /// An empty line becomes a single space
    ConvertEmptyLineToSpace,
    /// A blank line becomes a single space
    ConvertBlankLineToSpace,
    /// A blank line becomes an empty line
    ConvertBlankLineToEmpty,
    /// Empty lines are dropped
    SkipEmptyLine,
    /// Blank lines are dropped
    SkipBlankLine,
}

impl LineHandling {
    /// Read the next line and apply this handling to it
    pub fn read_and_handle<R: BufRead + ?Sized>(&self, reader: &mut R) -> Result<Option<String>> {
        loop {
            let Some(line) = read_line(reader)? else {
                return Ok(None);
            };
            let handled = match self {
                LineHandling::NoHandling => Some(line),
                LineHandling::TreatEmptyLineLikeEnd if line.is_empty() => return Ok(None),
                LineHandling::TreatBlankLineLikeEnd if is_blank(&line) => return Ok(None),
                LineHandling::ErrorOnEmptyLine if line.is_empty() => {
                    return Err(RecordError::decode("An empty line was read in."))
                }
                LineHandling::ErrorOnBlankLine if is_blank(&line) => {
                    return Err(RecordError::decode("A blank line was read in."))
                }
                LineHandling::ConvertEmptyLineToSpace if line.is_empty() => Some(" ".to_string()),
                LineHandling::ConvertBlankLineToSpace if is_blank(&line) => Some(" ".to_string()),
                LineHandling::ConvertBlankLineToEmpty if is_blank(&line) => Some(String::new()),
                LineHandling::SkipEmptyLine if line.is_empty() => None,
                LineHandling::SkipBlankLine if is_blank(&line) => None,
                _ => Some(line),
            };
            if handled.is_some() {
                return Ok(handled);
            }
        }
    }
}
