//! Error types for textrec operations

/// Errors that can occur while reading, writing or unpacking text records
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// A file spec or field spec was rejected before any I/O happened
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A raw unit could not be turned into a record
    #[error("Decode error at record index {index:?}: {message}")]
    Decode {
        /// Index of the raw unit, when known.
        index: Option<u64>,
        /// What went wrong.
        message: String,
    },

    /// A markdown list line carried no valid list marker
    #[error("Line is not a valid markdown list item! index={index}")]
    InvalidListItem {
        /// Index of the offending raw unit.
        index: u64,
    },

    /// A markdown table line was not enclosed in field delimiters
    #[error("Line is not a valid markdown table row! index={index}")]
    InvalidTableRow {
        /// Index of the offending raw unit.
        index: u64,
    },

    /// The underlying source failed while the window was being filled
    #[error("Read failed at record index {record_index} (end reached: {end_reached}): {message}")]
    ReadFailed {
        /// Index of the raw unit that was being read.
        record_index: u64,
        /// Whether the end of the source had already been seen.
        end_reached: bool,
        /// The underlying I/O error.
        message: String,
    },

    /// A record cannot be written in the target format
    #[error("Encode error: {0}")]
    Encode(String),

    /// IO error during read/write
    #[error("IO error: {0}")]
    Io(String),

    /// A lifecycle operation was called out of order
    #[error("Illegal state transition: {from} -> {to}")]
    IllegalState {
        /// The current state.
        from: &'static str,
        /// The requested state.
        to: &'static str,
    },

    /// `next` was called on a window without remaining elements
    #[error("No more raw data available")]
    Exhausted,

    /// A packed record could not be unpacked
    #[error("Unpack failed: {0}")]
    Unpack(String),
}

impl RecordError {
    /// Shorthand for a [`RecordError::Decode`] without a known index.
    pub fn decode(message: impl Into<String>) -> Self {
        RecordError::Decode {
            index: None,
            message: message.into(),
        }
    }

    /// Attach a record index to a decode error that does not have one yet.
    pub fn at_index(self, record_index: u64) -> Self {
        match self {
            RecordError::Decode {
                index: None,
                message,
            } => RecordError::Decode {
                index: Some(record_index),
                message,
            },
            other => other,
        }
    }
}

impl From<std::io::Error> for RecordError {
    fn from(err: std::io::Error) -> Self {
        RecordError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_index_only_fills_missing_index() {
        let err = RecordError::decode("bad escape").at_index(7);
        assert_eq!(
            err,
            RecordError::Decode {
                index: Some(7),
                message: "bad escape".to_string()
            }
        );

        let already = RecordError::Decode {
            index: Some(1),
            message: "x".to_string(),
        };
        assert_eq!(already.clone().at_index(9), already);
        assert_eq!(RecordError::Exhausted.at_index(3), RecordError::Exhausted);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: RecordError = io.into();
        assert!(matches!(err, RecordError::Io(msg) if msg.contains("pipe closed")));
    }

    #[test]
    fn test_display_names_transition() {
        let err = RecordError::IllegalState {
            from: "Closed",
            to: "ReadRecords",
        };
        assert_eq!(err.to_string(), "Illegal state transition: Closed -> ReadRecords");
    }
}
