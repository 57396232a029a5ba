//! Fuzzing entry points for textrec-core decoders
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Call these functions from `fuzz_target!` bodies and run `cargo fuzz run <target>`

use std::io::Cursor;
use textrec_core::{
    container::{ContainerProfile, RecordContainer},
    format::{
        markdown_list, markdown_table, DelimitedFileSpec, FixedWidthFieldSpec, FixedWidthFileSpec,
        MarkdownListFileSpec, MarkdownTableFileSpec, PropertiesFileSpec, ReadableFileSpec,
    },
    streams::read_all,
};

fn read_bytes<S: ReadableFileSpec>(spec: &S, data: &[u8]) {
    if let Ok(mut producer) = spec.producer(Cursor::new(data)) {
        // Errors are fine, panics are not
        let _ = read_all(&mut producer);
    }
}

pub fn fuzz_properties(data: &[u8]) {
    read_bytes(&PropertiesFileSpec::new(), data);
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = textrec_core::format::properties::unescape(text);
    }
}

pub fn fuzz_markdown_list(data: &[u8]) {
    if let Ok(text) = std::str::from_utf8(data) {
        for line in text.lines() {
            let _ = markdown_list::split(line);
        }
    }
    read_bytes(&MarkdownListFileSpec::default().with_line_prefix_as_category(true), data);
}

pub fn fuzz_delimited(data: &[u8]) {
    read_bytes(&DelimitedFileSpec::new(",", 3), data);
    read_bytes(&DelimitedFileSpec::new("::", 2).with_ignored_records(1, 2), data);
}

pub fn fuzz_fixed_width(data: &[u8]) {
    let fields = vec![FixedWidthFieldSpec::new(0, 3), FixedWidthFieldSpec::new(2, 6)];
    read_bytes(&FixedWidthFileSpec::new(7, fields.clone()), data);
    read_bytes(&FixedWidthFileSpec::new(5, fields).with_blocks(), data);
}

pub fn fuzz_table(data: &[u8]) {
    if let Ok(text) = std::str::from_utf8(data) {
        for line in text.lines() {
            let _ = markdown_table::split_row(line);
        }
    }
    read_bytes(&MarkdownTableFileSpec::default(), data);
}

/// Decode `data` as delimited text and unpack every record with every profile
pub fn fuzz_unpack(data: &[u8]) {
    let spec = DelimitedFileSpec::new(";", 8);
    let Ok(mut producer) = spec.producer(Cursor::new(data)) else {
        return;
    };
    let Ok(records) = read_all(&mut producer) else {
        return;
    };
    for profile in [ContainerProfile::Small, ContainerProfile::Medium, ContainerProfile::Large] {
        for result in RecordContainer::new(profile).unpack_all(&records) {
            let _ = result.into_result();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_properties_empty() {
        fuzz_properties(&[]);
    }

    #[test]
    fn test_fuzz_properties_broken_escapes() {
        fuzz_properties(b"a=\\u12\nb=\\uD800\nc=\\\n");
        fuzz_properties(&[0xFF, b'=', 0xFE]);
    }

    #[test]
    fn test_fuzz_markdown_list_random() {
        fuzz_markdown_list("1.\n  -x\n99999999999999999999999) y\n\u{3000}* z\n".as_bytes());
        fuzz_markdown_list(&[0xFF; 64]);
    }

    #[test]
    fn test_fuzz_delimited_random() {
        fuzz_delimited(b",,,,\n::\n\n\r\r\n");
        fuzz_delimited("ä,ö,ü\n€::€".as_bytes());
    }

    #[test]
    fn test_fuzz_fixed_width_random() {
        fuzz_fixed_width("日本語のテキスト\nab".as_bytes());
        fuzz_fixed_width(&[0x42; 1024]);
    }

    #[test]
    fn test_fuzz_table_random() {
        fuzz_table(b"|\n||\n|\\|\n| a | b\n");
    }

    #[test]
    fn test_fuzz_unpack_random() {
        fuzz_unpack(b"DosPathFieldsRecord;;;\nRecordContainerLarge;EmptyRecord;x;;;\n;;;;\n");
    }
}
