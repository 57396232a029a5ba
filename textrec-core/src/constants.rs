//! Constants shared by the text formats

use serde::{Deserialize, Serialize};

/// Tab field delimiter
pub const DELIMITER_TAB: &str = "\t";

/// Space field delimiter
pub const DELIMITER_SPACE: &str = " ";

/// Comma field delimiter
pub const DELIMITER_COMMA: &str = ",";

/// Semicolon field delimiter
pub const DELIMITER_SEMICOLON: &str = ";";

/// Vertical line field delimiter
pub const DELIMITER_VERTICAL_LINE: &str = "|";

/// Index assigned to the first raw unit read from a source
pub const FIRST_RECORD_INDEX: u64 = 0;

/// Default fill character for fixed-width fields and markdown table cells
pub const DEFAULT_FILL_CHARACTER: char = ' ';

/// Field delimiter between markdown table cells
pub const TABLE_FIELD_DELIMITER: char = '|';

/// Escaped form of a literal field delimiter inside a markdown table cell
pub const TABLE_FIELD_DELIMITER_ESCAPED: &str = "\\|";

/// Alignment marker of the markdown table header separator row
pub const TABLE_ALIGNMENT_INDICATOR: char = ':';

/// Dash character of the markdown table header separator row
pub const TABLE_HEADER_DELIMITER: char = '-';

/// Smallest allowed markdown table column width
pub const TABLE_COLUMN_MIN_WIDTH: usize = 5;

/// Largest allowed markdown table column width
pub const TABLE_COLUMN_MAX_WIDTH: usize = 1 << 16;

/// Largest fixed-width record, in characters
pub const MAX_RECORD_WIDTH: usize = 1 << 20;

/// Largest number of leading or trailing records a producer may hold back
pub const MAX_IGNORED_RECORDS: usize = 1 << 20;

/// First number of an ordered markdown list
pub const ORDERED_LIST_START_NUMBER: u64 = 1;

/// Separator between a markdown list marker and the item text
pub const LIST_MARKER_SEPARATOR: &str = " ";

/// Key/value delimiter written by the properties encoder
pub const PROPERTIES_DELIMITER: &str = "=";

/// Prefix of a properties comment line written by the encoder
pub const PROPERTIES_COMMENT_PREFIX: &str = "#";

/// Default delimiter between category and key when the category is used as key prefix
pub const PROPERTIES_KEY_PREFIX_DELIMITER: &str = ".";

/// Number of hex digits in a `\uXXXX` escape
pub const UNICODE_ESCAPE_LENGTH: usize = 4;

/// Lowest character written unescaped when unicode escaping is enabled
pub const PRINTABLE_MIN: char = '\u{20}';

/// Highest character written unescaped when unicode escaping is enabled
pub const PRINTABLE_MAX: char = '\u{7e}';

/// Line terminator written after each line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSeparator {
    /// `\n`
    #[default]
    Lf,
    /// `\r`
    Cr,
    /// `\r\n`
    CrLf,
}

impl LineSeparator {
    /// The terminator as text
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineSeparator::Lf => "\n",
            LineSeparator::Cr => "\r",
            LineSeparator::CrLf => "\r\n",
        }
    }

    /// The terminator of the platform this was compiled for
    pub const fn system() -> Self {
        if cfg!(windows) {
            LineSeparator::CrLf
        } else {
            LineSeparator::Lf
        }
    }
}

/// Placement of a text inside a wider column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Text starts at the left edge, fill follows
    #[default]
    Start,
    /// Text is centered, fill on both sides
    Center,
    /// Text ends at the right edge, fill precedes
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_separator_text() {
        assert_eq!(LineSeparator::Lf.as_str(), "\n");
        assert_eq!(LineSeparator::Cr.as_str(), "\r");
        assert_eq!(LineSeparator::CrLf.as_str(), "\r\n");
        assert_eq!(LineSeparator::default(), LineSeparator::Lf);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LineSeparator::CrLf).unwrap();
        assert_eq!(json, "\"cr_lf\"");
        let alignment: Alignment = serde_json::from_str("\"center\"").unwrap();
        assert_eq!(alignment, Alignment::Center);
    }
}
