//! # Textrec Core
//!
//! Read and write text records in line and column oriented formats, and pack records of any
//! shape into a flat, self-describing container record.
//!
//! ## Modules
//!
//! - `types`: Records and fields
//! - `window`: Lookahead window that holds back the first and last raw units
//! - `lines`: Line reading and empty/blank line handling
//! - `lifecycle`: Producer and consumer state machines
//! - `producer` / `consumer`: Reading and writing records through a format
//! - `format`: Delimited, fixed-width, properties, markdown list and markdown table
//! - `container`: Packing and unpacking records
//! - `streams`: One-call read/write helpers

#![warn(missing_docs)]

pub mod constants;
pub mod consumer;
pub mod container;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod lines;
pub mod producer;
pub mod streams;
pub mod types;
pub mod window;

// Re-export commonly used types
pub use consumer::{RecordConsumer, SharedConsumer, SharedWriter, TextConsumer};
pub use container::{ContainerProfile, RecordContainer, UnpackResult};
pub use error::RecordError;
pub use format::{FileSpec, ReadableFileSpec, WritableFileSpec};
pub use producer::{RecordProducer, TextProducer};
pub use types::{RecordKind, RecordRawData, TextField, TextRecord};

/// Result type alias for textrec operations
pub type Result<T> = core::result::Result<T, RecordError>;
