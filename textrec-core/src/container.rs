//! Record containers: pack any record into a flat, self-describing record and back
//!
//! A packed record starts with the metadata fields of its [`ContainerProfile`], followed by
//! the fields of the original record:
//!
//! ```text
//! Small:  [Tag]                                          + fields
//! Medium: [Tag, Category, RecordId]                      + fields
//! Large:  [ContainerName, Tag, Size, Category, RecordId] + fields
//! ```
//!
//! The small profile keeps category and record id on the packed record itself. Unpacking
//! dispatches on the tag; an unknown tag still yields a many-field record, together with an
//! error message.

use crate::error::RecordError;
use crate::format::{ReadableFileSpec, WritableFileSpec};
use crate::streams;
use crate::types::{PathType, RecordKind, TextRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "logging")]
use tracing::warn;

/// First field of every large container
pub const LARGE_CONTAINER_NAME: &str = "RecordContainerLarge";

const WRONG_RECORD_SIZE: &str = "Wrong record size!";

/// A metadata field of a container, extracted from the original record while packing
#[derive(Clone, Copy)]
pub struct ContainerField {
    name: &'static str,
    index: usize,
    extract: fn(&TextRecord) -> Option<String>,
}

impl ContainerField {
    /// Name of the field
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Position inside the packed record
    pub fn index(&self) -> usize {
        self.index
    }

    /// Text of this field for `record`
    pub fn extract(&self, record: &TextRecord) -> Option<String> {
        (self.extract)(record)
    }
}

impl fmt::Debug for ContainerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerField")
            .field("name", &self.name)
            .field("index", &self.index)
            .finish()
    }
}

fn extract_tag(record: &TextRecord) -> Option<String> {
    Some(record.kind().tag().to_string())
}

fn extract_container_name(_: &TextRecord) -> Option<String> {
    Some(LARGE_CONTAINER_NAME.to_string())
}

fn extract_size(record: &TextRecord) -> Option<String> {
    Some(record.size().to_string())
}

fn extract_category(record: &TextRecord) -> Option<String> {
    record.category().map(str::to_string)
}

fn extract_record_id(record: &TextRecord) -> Option<String> {
    record.record_id().map(|id| id.to_string())
}

static SMALL_FIELDS: [ContainerField; 1] = [ContainerField {
    name: "ClassName",
    index: 0,
    extract: extract_tag,
}];

static MEDIUM_FIELDS: [ContainerField; 3] = [
    ContainerField {
        name: "ClassName",
        index: 0,
        extract: extract_tag,
    },
    ContainerField {
        name: "Category",
        index: 1,
        extract: extract_category,
    },
    ContainerField {
        name: "RecordId",
        index: 2,
        extract: extract_record_id,
    },
];

static LARGE_FIELDS: [ContainerField; 5] = [
    ContainerField {
        name: "RecordContainerName",
        index: 0,
        extract: extract_container_name,
    },
    ContainerField {
        name: "ClassName",
        index: 1,
        extract: extract_tag,
    },
    ContainerField {
        name: "Size",
        index: 2,
        extract: extract_size,
    },
    ContainerField {
        name: "Category",
        index: 3,
        extract: extract_category,
    },
    ContainerField {
        name: "RecordId",
        index: 4,
        extract: extract_record_id,
    },
];

/// Record shape named by the tag of a packed record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantTag {
    /// No fields
    Empty,
    /// One value field
    Value,
    /// Key and value
    KeyValue,
    /// Key, value and comment
    KeyValueComment,
    /// Two fields
    TwoFields,
    /// Any number of fields
    ManyFields,
    /// DOS path attributes
    DosPath,
    /// A tag this crate does not know
    Unknown(String),
}

impl VariantTag {
    /// Tag of a record's shape
    pub fn of(record: &TextRecord) -> Self {
        match record.kind() {
            RecordKind::Empty => VariantTag::Empty,
            RecordKind::Value => VariantTag::Value,
            RecordKind::KeyValue => VariantTag::KeyValue,
            RecordKind::KeyValueComment => VariantTag::KeyValueComment,
            RecordKind::TwoFields => VariantTag::TwoFields,
            RecordKind::ManyFields => VariantTag::ManyFields,
            RecordKind::DosPath(_) => VariantTag::DosPath,
        }
    }

    /// Parse a tag as written by [`VariantTag::as_str`]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "EmptyRecord" => VariantTag::Empty,
            "ValueFieldRecord" => VariantTag::Value,
            "KeyValueFieldsRecord" => VariantTag::KeyValue,
            "KeyValueCommentFieldsRecord" => VariantTag::KeyValueComment,
            "TwoFieldsRecord" => VariantTag::TwoFields,
            "ManyFieldsRecord" => VariantTag::ManyFields,
            "DosPathFieldsRecord" => VariantTag::DosPath,
            other => VariantTag::Unknown(other.to_string()),
        }
    }

    /// The tag text
    pub fn as_str(&self) -> &str {
        match self {
            VariantTag::Empty => "EmptyRecord",
            VariantTag::Value => "ValueFieldRecord",
            VariantTag::KeyValue => "KeyValueFieldsRecord",
            VariantTag::KeyValueComment => "KeyValueCommentFieldsRecord",
            VariantTag::TwoFields => "TwoFieldsRecord",
            VariantTag::ManyFields => "ManyFieldsRecord",
            VariantTag::DosPath => "DosPathFieldsRecord",
            VariantTag::Unknown(tag) => tag,
        }
    }

    /// Exact number of fields of the shape, `None` if any number is allowed
    pub fn field_count(&self) -> Option<usize> {
        match self {
            VariantTag::Empty => Some(0),
            VariantTag::Value => Some(1),
            VariantTag::KeyValue | VariantTag::TwoFields => Some(2),
            VariantTag::KeyValueComment => Some(3),
            VariantTag::DosPath => Some(crate::types::DOS_PATH_FIELD_COUNT),
            VariantTag::ManyFields | VariantTag::Unknown(_) => None,
        }
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of unpacking: a record, an error message, or both for an unknown tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackResult {
    record: Option<TextRecord>,
    error_message: Option<String>,
}

impl UnpackResult {
    /// A successfully unpacked record
    pub fn ok(record: TextRecord) -> Self {
        Self {
            record: Some(record),
            error_message: None,
        }
    }

    /// A failure without a record
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            record: None,
            error_message: Some(message.into()),
        }
    }

    /// A usable record that could not be unpacked faithfully
    pub fn partial(record: TextRecord, message: impl Into<String>) -> Self {
        Self {
            record: Some(record),
            error_message: Some(message.into()),
        }
    }

    /// The unpacked record, if any
    pub fn record(&self) -> Option<&TextRecord> {
        self.record.as_ref()
    }

    /// The error message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Check for a record without error
    pub fn is_ok(&self) -> bool {
        self.record.is_some() && self.error_message.is_none()
    }

    /// The record, ignoring any error message
    pub fn into_record(self) -> Option<TextRecord> {
        self.record
    }

    /// The record, treating any error message as fatal
    pub fn into_result(self) -> Result<TextRecord> {
        match (self.record, self.error_message) {
            (_, Some(message)) => Err(RecordError::Unpack(message)),
            (Some(record), None) => Ok(record),
            (None, None) => Err(RecordError::Unpack("no record".to_string())),
        }
    }
}

/// Pack `record` behind the given container fields
pub fn pack(
    record: &TextRecord,
    container_fields: &[ContainerField],
    category: Option<String>,
    record_id: Option<u64>,
) -> TextRecord {
    let mut texts = Vec::with_capacity(container_fields.len() + record.size());
    texts.extend(container_fields.iter().map(|field| field.extract(record)));
    texts.extend(record.texts().map(|text| text.map(str::to_string)));
    TextRecord::many_fields(category, record_id, texts)
}

/// Rebuild a record from the fields after the first `container_fields_size`
pub fn unpack(
    packed: &TextRecord,
    tag: Option<&str>,
    container_fields_size: usize,
    category: Option<String>,
    record_id: Option<u64>,
) -> UnpackResult {
    let Some(tag) = tag.filter(|tag| !tag.trim().is_empty()) else {
        return UnpackResult::error("ClassName is null or blank!");
    };
    if packed.size() < container_fields_size {
        return UnpackResult::error(WRONG_RECORD_SIZE);
    }

    let texts: Vec<Option<String>> = packed
        .texts()
        .skip(container_fields_size)
        .map(|text| text.map(str::to_string))
        .collect();
    let variant = VariantTag::parse(tag);
    match reconstruct(&variant, texts, category, record_id) {
        Ok(record) => match variant {
            VariantTag::Unknown(name) => {
                #[cfg(feature = "logging")]
                warn!("Unpacked unknown variant {} as many-field record", name);

                UnpackResult::partial(record, format!("Unknown class name! {}", name))
            }
            _ => UnpackResult::ok(record),
        },
        Err(message) => UnpackResult::error(message),
    }
}

fn reconstruct(
    variant: &VariantTag,
    texts: Vec<Option<String>>,
    category: Option<String>,
    record_id: Option<u64>,
) -> std::result::Result<TextRecord, String> {
    if variant.field_count().is_some_and(|count| count != texts.len()) {
        return Err(WRONG_RECORD_SIZE.to_string());
    }
    let mut fields = texts.into_iter();
    match variant {
        VariantTag::Empty => {
            if let Some(category) = category {
                return Err(format!("Category is not null! {}", category));
            }
            if let Some(record_id) = record_id {
                return Err(format!("RecordId is not null! {}", record_id));
            }
            Ok(TextRecord::empty())
        }
        VariantTag::KeyValueComment => {
            let key = fields.next().flatten().ok_or("Text is null! 'key'")?;
            let value = fields.next().flatten();
            let comment = fields.next().flatten();
            Ok(TextRecord::key_value_comment(category, record_id, key, value, comment))
        }
        VariantTag::KeyValue => {
            let key = fields.next().flatten().ok_or("Text is null! 'key'")?;
            Ok(TextRecord::key_value(category, record_id, key, fields.next().flatten()))
        }
        VariantTag::TwoFields => {
            let first = fields.next().flatten();
            Ok(TextRecord::two_fields(category, record_id, first, fields.next().flatten()))
        }
        VariantTag::Value => Ok(TextRecord::single_value(category, record_id, fields.next().flatten())),
        VariantTag::DosPath => {
            let path_type = category
                .filter(|category| !category.trim().is_empty())
                .ok_or("Category is null or blank!")?;
            if let Some(record_id) = record_id {
                return Err(format!("RecordId is not null! {}", record_id));
            }
            let path_type: PathType = path_type.parse().map_err(error_text)?;
            TextRecord::dos_path(path_type, fields.collect()).map_err(error_text)
        }
        VariantTag::ManyFields | VariantTag::Unknown(_) => {
            Ok(TextRecord::many_fields(category, record_id, fields.collect()))
        }
    }
}

fn error_text(err: RecordError) -> String {
    match err {
        RecordError::Decode { message, .. } => message,
        other => other.to_string(),
    }
}

fn parse_record_id(text: Option<&str>) -> std::result::Result<Option<u64>, String> {
    match text.filter(|text| !text.trim().is_empty()) {
        None => Ok(None),
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(|_| format!("RecordId has wrong format! {}", text)),
    }
}

/// How much metadata a container carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerProfile {
    /// Tag only
    Small,
    /// Tag, category and record id
    #[default]
    Medium,
    /// Container name, tag, size, category and record id
    Large,
}

impl ContainerProfile {
    /// Metadata fields in front of the original fields
    pub fn fields(&self) -> &'static [ContainerField] {
        match self {
            ContainerProfile::Small => &SMALL_FIELDS,
            ContainerProfile::Medium => &MEDIUM_FIELDS,
            ContainerProfile::Large => &LARGE_FIELDS,
        }
    }
}

/// Packs and unpacks records with one [`ContainerProfile`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordContainer {
    profile: ContainerProfile,
}

impl RecordContainer {
    /// Container using `profile`
    pub fn new(profile: ContainerProfile) -> Self {
        Self { profile }
    }

    /// The profile
    pub fn profile(&self) -> ContainerProfile {
        self.profile
    }

    /// Pack a single record
    pub fn pack(&self, record: &TextRecord) -> TextRecord {
        let fields = self.profile.fields();
        match self.profile {
            ContainerProfile::Small => pack(
                record,
                fields,
                record.category().map(str::to_string),
                record.record_id(),
            ),
            ContainerProfile::Medium | ContainerProfile::Large => pack(record, fields, None, None),
        }
    }

    /// Unpack a single record
    pub fn unpack(&self, packed: &TextRecord) -> UnpackResult {
        let size = self.profile.fields().len();
        match self.profile {
            ContainerProfile::Small => unpack(
                packed,
                packed.text_at(0),
                size,
                packed.category().map(str::to_string),
                packed.record_id(),
            ),
            ContainerProfile::Medium => match parse_record_id(packed.text_at(2)) {
                Ok(record_id) => unpack(
                    packed,
                    packed.text_at(0),
                    size,
                    packed.text_at(1).map(str::to_string),
                    record_id,
                ),
                Err(message) => UnpackResult::error(message),
            },
            ContainerProfile::Large => match check_large(packed, size) {
                Ok(record_id) => unpack(
                    packed,
                    packed.text_at(1),
                    size,
                    packed.text_at(3).map(str::to_string),
                    record_id,
                ),
                Err(message) => UnpackResult::error(message),
            },
        }
    }

    /// Pack every record of `records`
    pub fn pack_all<'a, I>(&'a self, records: I) -> impl Iterator<Item = TextRecord> + 'a
    where
        I: IntoIterator<Item = &'a TextRecord>,
        I::IntoIter: 'a,
    {
        records.into_iter().map(move |record| self.pack(record))
    }

    /// Unpack every record of `packed`
    pub fn unpack_all<'a, I>(&'a self, packed: I) -> impl Iterator<Item = UnpackResult> + 'a
    where
        I: IntoIterator<Item = &'a TextRecord>,
        I::IntoIter: 'a,
    {
        packed.into_iter().map(move |record| self.unpack(record))
    }

    /// Pack every record and write each into one field of a single many-field record
    pub fn pack_record_of_records<'a, S, I>(&self, spec: &S, records: I) -> Result<TextRecord>
    where
        S: WritableFileSpec + ?Sized,
        I: IntoIterator<Item = &'a TextRecord>,
    {
        let texts = records
            .into_iter()
            .map(|record| streams::write_record_to_string(spec, &self.pack(record), true).map(Some))
            .collect::<Result<Vec<_>>>()?;
        Ok(TextRecord::many_fields(None, None, texts))
    }

    /// Reverse of [`RecordContainer::pack_record_of_records`].
    ///
    /// Texts that cannot be read or unpacked are logged and dropped. A record of an unknown
    /// variant is kept.
    pub fn unpack_record_of_records<S>(&self, spec: &S, record: &TextRecord) -> Vec<TextRecord>
    where
        S: ReadableFileSpec + ?Sized,
    {
        record
            .texts()
            .flatten()
            .filter_map(|text| match streams::read_from_str(spec, text) {
                Ok(records) => records.into_iter().next(),
                Err(err) => {
                    #[cfg(feature = "logging")]
                    warn!("Dropping unreadable packed record: {}", err);
                    #[cfg(not(feature = "logging"))]
                    let _ = err;

                    None
                }
            })
            .filter_map(|packed| {
                let result = self.unpack(&packed);
                if let Some(message) = result.error_message() {
                    #[cfg(feature = "logging")]
                    warn!("Unpacking {} failed: {}", packed, message);
                    #[cfg(not(feature = "logging"))]
                    let _ = message;
                }
                result.into_record()
            })
            .collect()
    }
}

fn check_large(packed: &TextRecord, container_fields_size: usize) -> std::result::Result<Option<u64>, String> {
    let container_name = packed.text_at(0);
    if container_name != Some(LARGE_CONTAINER_NAME) {
        return Err(format!(
            "Wrong container class name! {}",
            container_name.unwrap_or("null")
        ));
    }
    let record_id = parse_record_id(packed.text_at(4))?;
    let size = packed
        .text_at(2)
        .filter(|size| !size.trim().is_empty())
        .ok_or("Size is null or blank!")?;
    let size: usize = size
        .parse()
        .map_err(|_| format!("Size has wrong format! {}", size))?;
    if packed.size() != container_fields_size + size {
        return Err(format!("Wrong size! {}", packed.size()));
    }
    Ok(record_id)
}
