//! Test vectors for the text formats
//!
//! Each vector pairs a file spec with a concrete input text and the records it must decode
//! to, or with records and the exact text they must encode to.

use textrec_core::{
    constants::{Alignment, LineSeparator},
    format::{
        DelimitedFileSpec, FixedWidthFieldSpec, FixedWidthFileSpec, ListMarker, MarkdownListFileSpec,
        MarkdownTableFieldSpec, MarkdownTableFileSpec, PropertiesFileSpec,
    },
    lines::LineHandling,
    streams::{read_from_str, write_to_string},
    TextRecord,
};

type Texts = Vec<Option<String>>;

fn t(texts: &[Option<&str>]) -> Texts {
    texts.iter().map(|text| text.map(str::to_string)).collect()
}

fn decoded<S: textrec_core::ReadableFileSpec>(spec: &S, input: &str) -> Vec<Texts> {
    read_from_str(spec, input)
        .unwrap()
        .iter()
        .map(TextRecord::to_texts)
        .collect()
}

fn records(rows: &[&[Option<&str>]]) -> Vec<TextRecord> {
    rows.iter().map(|row| TextRecord::many_fields(None, None, t(row))).collect()
}

#[test]
fn test_delimited_vectors() {
    let vectors: Vec<(DelimitedFileSpec, &str, Vec<Texts>)> = vec![
        (
            DelimitedFileSpec::new(",", 3),
            "1,2,3\n4,,6\n",
            vec![t(&[Some("1"), Some("2"), Some("3")]), t(&[Some("4"), None, Some("6")])],
        ),
        (
            DelimitedFileSpec::new("\t", 2),
            "a\tb\r\nc\r\n",
            vec![t(&[Some("a"), Some("b")]), t(&[Some("c"), None])],
        ),
        (
            DelimitedFileSpec::new("<>", 2),
            "x<>y<>z\n<>\n",
            vec![t(&[Some("x"), Some("y")]), t(&[None, None])],
        ),
        (
            DelimitedFileSpec::new(";", 2).with_line_handling(LineHandling::SkipBlankLine),
            "\n a ;b \n   \n",
            vec![t(&[Some(" a "), Some("b ")])],
        ),
        (
            DelimitedFileSpec::new(",", 1).with_skip_all_null_or_empty(true),
            "a\r,\rb",
            vec![t(&[Some("a")]), t(&[Some("b")])],
        ),
    ];

    for (spec, input, expected) in vectors {
        assert_eq!(decoded(&spec, input), expected, "input {:?}", input);
    }
}

#[test]
fn test_fixed_width_vectors() {
    let fields = vec![
        FixedWidthFieldSpec::new(0, 4),
        FixedWidthFieldSpec::new(4, 4).with_alignment(Alignment::End).with_fill_character('0'),
        FixedWidthFieldSpec::new(8, 5).with_alignment(Alignment::Center).with_fill_character('*'),
    ];
    let spec = FixedWidthFileSpec::new(13, fields);

    assert_eq!(
        decoded(&spec, "ab  0042*xy**\n    0000*****\nabcd1234\n"),
        vec![
            t(&[Some("ab"), Some("42"), Some("xy")]),
            t(&[Some(""), Some(""), Some("")]),
            t(&[Some("abcd"), Some("1234"), None]),
        ]
    );

    let rows = records(&[
        &[Some("ab"), Some("42"), Some("xy")],
        &[None, Some("123456"), Some("abcdefg")],
    ]);
    assert_eq!(
        write_to_string(&spec, &rows, false).unwrap(),
        "ab  0042*xy**\n    3456bcdef\n"
    );
}

#[test]
fn test_properties_vectors() {
    let spec = PropertiesFileSpec::new();
    let vectors: Vec<(&str, Vec<Texts>)> = vec![
        ("a=b\n", vec![t(&[Some("a"), Some("b")])]),
        ("a:b\n", vec![t(&[Some("a"), Some("b")])]),
        ("a b\n", vec![t(&[Some("a"), Some("b")])]),
        ("  a  =  b  \n", vec![t(&[Some("a"), Some("b  ")])]),
        ("a\\ b=c\n", vec![t(&[Some("a b"), Some("c")])]),
        ("a=\\\\\\=\\:\\#\\!\n", vec![t(&[Some("a"), Some("\\=:#!")])]),
        ("k=\\uD83D\\uDE00\n", vec![t(&[Some("k"), Some("\u{1F600}")])]),
        ("k=a\\\n   b\\\n\n", vec![t(&[Some("k"), Some("ab")])]),
        ("#only\n!comments\n", vec![]),
        ("x\n", vec![t(&[Some("x"), Some("")])]),
    ];
    for (input, expected) in vectors {
        assert_eq!(decoded(&spec, input), expected, "input {:?}", input);
    }

    let escaping = PropertiesFileSpec::new()
        .with_escape_unicode(true)
        .with_line_separator(LineSeparator::CrLf);
    let rows = vec![
        TextRecord::key_value(None, None, "key with space", Some(" leading".to_string())),
        TextRecord::key_value(None, None, "é", Some("a=b:c".to_string())),
    ];
    assert_eq!(
        write_to_string(&escaping, &rows, false).unwrap(),
        "key\\ with\\ space=\\ leading\r\n\\u00E9=a\\=b\\:c\r\n"
    );
}

#[test]
fn test_markdown_list_vectors() {
    let spec = MarkdownListFileSpec::default().with_line_prefix_as_category(true);
    let records = read_from_str(&spec, "* a\n  - b\n10) c\n2. \n+\n").unwrap();
    let got: Vec<_> = records
        .iter()
        .map(|r| (r.category().unwrap_or_default(), r.value().unwrap_or_default()))
        .collect();
    assert_eq!(
        got,
        vec![("* ", "a"), ("  - ", "b"), ("10) ", "c"), ("2. ", ""), ("+", "")]
    );

    for (marker, expected) in [
        (ListMarker::BulletAsterisk, "* a\n* b\n"),
        (ListMarker::BulletHyphenMinus, "- a\n- b\n"),
        (ListMarker::BulletPlusSign, "+ a\n+ b\n"),
        (ListMarker::OrderedPeriod, "1. a\n2. b\n"),
        (ListMarker::OrderedParenthesis, "1) a\n2) b\n"),
    ] {
        let rows = records_of_values(&["a", "b"]);
        let spec = MarkdownListFileSpec::new(marker);
        assert_eq!(write_to_string(&spec, &rows, false).unwrap(), expected);
    }
}

fn records_of_values(values: &[&str]) -> Vec<TextRecord> {
    values
        .iter()
        .map(|value| TextRecord::single_value(None, None, Some(value.to_string())))
        .collect()
}

#[test]
fn test_markdown_table_vectors() {
    let spec = MarkdownTableFileSpec::new(vec![
        MarkdownTableFieldSpec::new("Left"),
        MarkdownTableFieldSpec::new("Mid").with_alignment(Alignment::Center),
        MarkdownTableFieldSpec::new("Right").with_alignment(Alignment::End).with_min_width(7),
    ])
    .with_text(Some("Table:".to_string()), Some("End.".to_string()));

    let rows = records(&[&[Some("a"), Some("b|c"), Some("1")], &[None, None, None]]);
    let text = write_to_string(&spec, &rows, false).unwrap();
    assert_eq!(
        text,
        "Table:\n\
         | Left  |  Mid  |   Right |\n\
         |:------|:-----:|--------:|\n\
         | a     | b\\|c  |       1 |\n\
         |       |       |         |\n\
         End.\n"
    );

    let reread = MarkdownTableFileSpec {
        skip_first_lines: 1,
        ignore_last_records: 1,
        ..spec
    };
    let mut lenient = reread.clone();
    lenient.ignore_last_records = 0;
    assert_eq!(
        decoded(&reread, &text),
        vec![t(&[Some("a"), Some("b|c"), Some("1")]), t(&[None, None, None])]
    );
    assert!(read_from_str(&lenient, &text).is_err());
}
