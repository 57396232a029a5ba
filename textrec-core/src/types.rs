//! Core types for text records

use crate::error::RecordError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One slot of a [`TextRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TextField {
    /// Position inside the record, starting at 0
    pub index: usize,

    /// Whether this is the last field of the record
    pub last: bool,

    /// The text, absent when the field is null
    pub text: Option<String>,
}

impl TextField {
    /// Create a new field
    pub fn new(index: usize, last: bool, text: Option<String>) -> Self {
        Self { index, last, text }
    }

    /// Check if this is the first field of the record
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Check if this is the last field of the record
    pub fn is_last(&self) -> bool {
        self.last
    }

    /// The text as a string slice
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The text, or `default` when the field is null
    pub fn text_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.text.as_deref().unwrap_or(default)
    }

    /// Check if the text is null or empty
    pub fn is_null_or_empty(&self) -> bool {
        self.text.as_deref().map_or(true, str::is_empty)
    }
}

/// Kind of file system entry described by a DOS path record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PathType {
    /// A directory
    Directory,
    /// A regular file
    RegularFile,
    /// A symbolic link
    SymbolicLink,
    /// Anything else
    Other,
}

impl PathType {
    /// Name written into the category of a DOS path record
    pub const fn name(&self) -> &'static str {
        match self {
            PathType::Directory => "DIRECTORY",
            PathType::RegularFile => "REGULAR_FILE",
            PathType::SymbolicLink => "SYMBOLIC_LINK",
            PathType::Other => "OTHER",
        }
    }
}

impl FromStr for PathType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DIRECTORY" => Ok(PathType::Directory),
            "REGULAR_FILE" => Ok(PathType::RegularFile),
            "SYMBOLIC_LINK" => Ok(PathType::SymbolicLink),
            "OTHER" => Ok(PathType::Other),
            other => Err(RecordError::decode(format!("Unknown path type: {}", other))),
        }
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of fields of a DOS path record
pub const DOS_PATH_FIELD_COUNT: usize = 14;

/// Field names of a DOS path record, in field order
pub const DOS_PATH_FIELD_NAMES: [&str; DOS_PATH_FIELD_COUNT] = [
    "fileName",
    "path",
    "parent",
    "pathNameCount",
    "fileSize",
    "creationTime",
    "lastModifiedTime",
    "lastAccessTime",
    "absolute",
    "archive",
    "readOnly",
    "hidden",
    "system",
    "fileExtension",
];

/// Fields of a DOS path record that may be null: file name, parent and file extension
const DOS_PATH_NULLABLE: [usize; 3] = [0, 2, 13];

/// Shape of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    /// No fields, no category, no record id
    Empty,
    /// A single value field
    Value,
    /// Key and value; the key is never null
    KeyValue,
    /// Key, value and comment; the key is never null
    KeyValueComment,
    /// Exactly two fields
    TwoFields,
    /// Any number of fields
    ManyFields,
    /// File system attributes of a path in DOS style
    DosPath(PathType),
}

impl RecordKind {
    /// Tag naming this shape inside a record container
    pub const fn tag(&self) -> &'static str {
        match self {
            RecordKind::Empty => "EmptyRecord",
            RecordKind::Value => "ValueFieldRecord",
            RecordKind::KeyValue => "KeyValueFieldsRecord",
            RecordKind::KeyValueComment => "KeyValueCommentFieldsRecord",
            RecordKind::TwoFields => "TwoFieldsRecord",
            RecordKind::ManyFields => "ManyFieldsRecord",
            RecordKind::DosPath(_) => "DosPathFieldsRecord",
        }
    }
}

/// An immutable, ordered list of nullable text fields with optional category and record id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TextRecord {
    kind: RecordKind,
    category: Option<String>,
    record_id: Option<u64>,
    fields: Vec<TextField>,
}

impl TextRecord {
    fn build(
        kind: RecordKind,
        category: Option<String>,
        record_id: Option<u64>,
        texts: Vec<Option<String>>,
    ) -> Self {
        let max_index = texts.len().saturating_sub(1);
        let fields = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| TextField::new(index, index == max_index, text))
            .collect();
        Self {
            kind,
            category,
            record_id,
            fields,
        }
    }

    /// A record without fields, category or record id
    pub fn empty() -> Self {
        Self::build(RecordKind::Empty, None, None, Vec::new())
    }

    /// A record holding a single value
    pub fn single_value(category: Option<String>, record_id: Option<u64>, value: Option<String>) -> Self {
        Self::build(RecordKind::Value, category, record_id, vec![value])
    }

    /// A key/value record
    pub fn key_value(
        category: Option<String>,
        record_id: Option<u64>,
        key: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::build(
            RecordKind::KeyValue,
            category,
            record_id,
            vec![Some(key.into()), value],
        )
    }

    /// A key/value record with a comment
    pub fn key_value_comment(
        category: Option<String>,
        record_id: Option<u64>,
        key: impl Into<String>,
        value: Option<String>,
        comment: Option<String>,
    ) -> Self {
        Self::build(
            RecordKind::KeyValueComment,
            category,
            record_id,
            vec![Some(key.into()), value, comment],
        )
    }

    /// A record with exactly two fields
    pub fn two_fields(
        category: Option<String>,
        record_id: Option<u64>,
        first: Option<String>,
        second: Option<String>,
    ) -> Self {
        Self::build(RecordKind::TwoFields, category, record_id, vec![first, second])
    }

    /// A record with any number of fields
    pub fn many_fields(
        category: Option<String>,
        record_id: Option<u64>,
        texts: Vec<Option<String>>,
    ) -> Self {
        Self::build(RecordKind::ManyFields, category, record_id, texts)
    }

    /// A many-field record of non-null texts without category or record id
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let texts = texts.into_iter().map(|t| Some(t.into())).collect();
        Self::build(RecordKind::ManyFields, None, None, texts)
    }

    /// A DOS path record. The path type is stored as the category.
    pub fn dos_path(path_type: PathType, texts: Vec<Option<String>>) -> Result<Self, RecordError> {
        if texts.len() != DOS_PATH_FIELD_COUNT {
            return Err(RecordError::decode(format!(
                "DOS path record needs {} fields, got {}",
                DOS_PATH_FIELD_COUNT,
                texts.len()
            )));
        }
        if let Some((index, _)) = texts
            .iter()
            .enumerate()
            .find(|(i, t)| t.is_none() && !DOS_PATH_NULLABLE.contains(i))
        {
            return Err(RecordError::decode(format!(
                "DOS path field {} must not be null",
                DOS_PATH_FIELD_NAMES[index]
            )));
        }
        Ok(Self::build(
            RecordKind::DosPath(path_type),
            Some(path_type.name().to_string()),
            None,
            texts,
        ))
    }

    /// The shape of this record
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Optional category
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Optional record id
    pub fn record_id(&self) -> Option<u64> {
        self.record_id
    }

    /// All fields in order
    pub fn fields(&self) -> &[TextField] {
        &self.fields
    }

    /// Number of fields
    pub fn size(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check if `index` addresses a field of this record
    pub fn is_valid_index(&self, index: usize) -> bool {
        index < self.fields.len()
    }

    /// Field at `index`
    pub fn field_at(&self, index: usize) -> Option<&TextField> {
        self.fields.get(index)
    }

    /// Text of the field at `index`; absent for null fields and out-of-range indices
    pub fn text_at(&self, index: usize) -> Option<&str> {
        self.fields.get(index).and_then(TextField::text)
    }

    /// First field
    pub fn first_field(&self) -> Option<&TextField> {
        self.fields.first()
    }

    /// Last field
    pub fn last_field(&self) -> Option<&TextField> {
        self.fields.last()
    }

    /// Texts of all fields in order
    pub fn texts(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.fields.iter().map(TextField::text)
    }

    /// Owned copies of all texts in order
    pub fn to_texts(&self) -> Vec<Option<String>> {
        self.fields.iter().map(|f| f.text.clone()).collect()
    }

    /// Key of a key/value record
    pub fn key(&self) -> Option<&str> {
        match self.kind {
            RecordKind::KeyValue | RecordKind::KeyValueComment => self.text_at(0),
            _ => None,
        }
    }

    /// Value text. Shapes without a designated value field report their first field.
    pub fn value(&self) -> Option<&str> {
        match self.kind {
            RecordKind::KeyValue | RecordKind::KeyValueComment => self.text_at(1),
            _ => self.text_at(0),
        }
    }

    /// Comment of a key/value/comment record
    pub fn comment(&self) -> Option<&str> {
        match self.kind {
            RecordKind::KeyValueComment => self.text_at(2),
            _ => None,
        }
    }
}

impl fmt::Display for TextRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.kind.tag())?;
        if let Some(category) = &self.category {
            write!(f, "category={}, ", category)?;
        }
        if let Some(id) = self.record_id {
            write!(f, "recordId={}, ", id)?;
        }
        f.write_str("[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match &field.text {
                Some(text) => write!(f, "{:?}", text)?,
                None => f.write_str("null")?,
            }
        }
        f.write_str("]}")
    }
}

/// A raw unit read from a source before it is decoded into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRawData {
    /// Category assigned while reading, e.g. a preceding comment
    pub category: Option<String>,

    /// Index of the raw unit in the source
    pub record_id: Option<u64>,

    /// The unparsed text
    pub raw_data: String,
}

impl RecordRawData {
    /// Create raw data
    pub fn new(category: Option<String>, record_id: Option<u64>, raw_data: impl Into<String>) -> Self {
        Self {
            category,
            record_id,
            raw_data: raw_data.into(),
        }
    }
}
