use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

use textrec_cli::{
    commands::{pack, unpack},
    Profile,
};

fn write_file<P: AsRef<Path>>(p: P, s: &str) {
    fs::write(p, s.as_bytes()).unwrap();
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

struct Specs {
    properties: String,
    packed: String,
}

fn specs(dir: &Path, packed_fields: usize) -> Specs {
    let properties = dir.join("properties.json");
    let packed = dir.join("packed.json");
    write_file(&properties, r#"{"format": "properties"}"#);
    let fields = vec!["{}"; packed_fields].join(", ");
    write_file(
        &packed,
        &format!(
            r#"{{"format": "delimited", "field_delimiter": ";", "line_handling": "skip_blank_line", "fields": [{}]}}"#,
            fields
        ),
    );
    Specs {
        properties: path_str(&properties).to_string(),
        packed: path_str(&packed).to_string(),
    }
}

#[test]
fn pack_and_unpack_properties_medium() {
    let td = tempdir().unwrap();
    let specs = specs(td.path(), 5);
    let in_path = td.path().join("in.properties");
    let packed_path = td.path().join("packed.txt");
    let out_path = td.path().join("out.properties");

    write_file(&in_path, "host=localhost\nport=8080\n");

    pack::execute(
        path_str(&in_path),
        path_str(&packed_path),
        &specs.properties,
        &specs.packed,
        Profile::Medium,
    )
    .unwrap();

    let packed = fs::read_to_string(&packed_path).unwrap();
    let lines: Vec<_> = packed.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("KeyValueFieldsRecord;;"));
    assert!(lines[0].ends_with(";host;localhost"));

    let summary = unpack::execute(
        path_str(&packed_path),
        path_str(&out_path),
        &specs.packed,
        &specs.properties,
        Profile::Medium,
        false,
        None,
    )
    .unwrap();

    assert_eq!(summary.unpacked, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(fs::read_to_string(&out_path).unwrap(), "host=localhost\nport=8080\n");
}

#[test]
fn pack_large_writes_container_name_and_size() {
    let td = tempdir().unwrap();
    let specs = specs(td.path(), 7);
    let in_path = td.path().join("in.properties");
    let packed_path = td.path().join("packed.txt");

    write_file(&in_path, "key=value\n");

    pack::execute(
        path_str(&in_path),
        path_str(&packed_path),
        &specs.properties,
        &specs.packed,
        Profile::Large,
    )
    .unwrap();

    let packed = fs::read_to_string(&packed_path).unwrap();
    assert!(packed.starts_with("RecordContainerLarge;KeyValueFieldsRecord;2;"));
    assert!(packed.trim_end().ends_with(";key;value"));
}

#[test]
fn unpack_counts_partial_and_failed_records() {
    let td = tempdir().unwrap();
    let specs = specs(td.path(), 5);
    let packed_path = td.path().join("packed.txt");
    let out_path = td.path().join("out.properties");

    write_file(
        &packed_path,
        "KeyValueFieldsRecord;;1;a;b\nCustomRecord;;;x;y\nValueFieldRecord;;;v;\nKeyValueFieldsRecord;;abc;c;d\n",
    );

    let summary = unpack::execute(
        path_str(&packed_path),
        path_str(&out_path),
        &specs.packed,
        &specs.properties,
        Profile::Medium,
        false,
        None,
    )
    .unwrap();

    assert_eq!(
        summary,
        unpack::UnpackSummary {
            unpacked: 1,
            partial: 1,
            failed: 2,
        }
    );
    assert_eq!(fs::read_to_string(&out_path).unwrap(), "a=b\nx=y\n");
}

#[test]
fn unpack_strict_fails_on_unknown_variant() {
    let td = tempdir().unwrap();
    let specs = specs(td.path(), 5);
    let packed_path = td.path().join("packed.txt");
    let out_path = td.path().join("out.properties");

    write_file(&packed_path, "KeyValueFieldsRecord;;1;a;b\nCustomRecord;;;x;y\n");

    let err = unpack::execute(
        path_str(&packed_path),
        path_str(&out_path),
        &specs.packed,
        &specs.properties,
        Profile::Medium,
        true,
        None,
    )
    .unwrap_err();

    assert!(format!("{:#}", err).contains("Unknown class name! CustomRecord"));
    assert!(!out_path.exists());
}

#[test]
fn unpack_to_stdout_keeps_status_lines_off_stdout() {
    let td = tempdir().unwrap();
    let specs = specs(td.path(), 5);
    let packed_path = td.path().join("packed.txt");
    let summary_path = td.path().join("summary.json");

    write_file(
        &packed_path,
        "KeyValueFieldsRecord;;1;a;b\nCustomRecord;;;x;y\nValueFieldRecord;;;v;\n",
    );

    let output = Command::new(env!("CARGO_BIN_EXE_textrec"))
        .args(["unpack", "-i", path_str(&packed_path), "-o", "-"])
        .args(["--read-spec", &specs.packed, "--write-spec", &specs.properties])
        .args(["--summary-json", path_str(&summary_path)])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "a=b\nx=y\n");
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("record 1: Unknown class name! CustomRecord"));
    assert!(stderr.contains("record 2: Wrong record size!"));

    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["unpacked"], 1);
    assert_eq!(summary["partial"], 1);
    assert_eq!(summary["failed"], 1);
}
