use reservoscope::error::IngestError;
use reservoscope::ingest::{self, InputFormat};
use std::io::{Cursor, Write};
use std::path::Path;

#[test]
fn reads_json_lines_skipping_blanks() {
    let text = r#"{"location":"Denver","id":1,"datetime":"9/28/25 9:30 AM"}

{"location":"Tampa","id":"2","datetime":"9/29/25 10:00 AM"}
"#;
    let recs = ingest::read_jsonl(Cursor::new(text)).unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[1].location, "Tampa");
    assert_eq!(recs[1].id, 2);
}

#[test]
fn json_lines_error_names_the_line() {
    let text = "{\"location\":\"Denver\",\"id\":1,\"datetime\":\"x\"}\n{\"location\":\"Denver\"}\n";
    match ingest::read_jsonl(Cursor::new(text)) {
        Err(IngestError::Json { record, .. }) => assert_eq!(record, 2),
        other => panic!("expected json error, got {other:?}"),
    }
}

#[test]
fn reads_json_array() {
    let text = r#"[{"location":"Denver","id":1.0,"datetime":"9/28/25 9:30 AM"},
                   {"location":"Denver","id":2,"datetime":"9/28/25 9:45 AM"}]"#;
    let recs = ingest::read_records(Cursor::new(text), InputFormat::JsonArray).unwrap();
    assert_eq!(recs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn reads_csv_file_by_extension() {
    let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(f, "location, id, datetime").unwrap();
    writeln!(f, "Denver, 1, 9/28/25 9:30 AM").unwrap();
    writeln!(f, "San Francisco,2,9/29/2025 5:30 PM").unwrap();
    let path = f.path().to_string_lossy().to_string();
    assert_eq!(InputFormat::from_path(Path::new(&path)), InputFormat::Csv);

    let recs = ingest::load_records(&[path], None).unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].datetime, "9/28/25 9:30 AM");
    assert_eq!(recs[1].location, "San Francisco");
    assert_eq!(recs[1].id, 2);
}

#[test]
fn csv_requires_all_columns() {
    let text = "location,id,when\nDenver,1,9/28/25 9:30 AM\n";
    assert!(matches!(ingest::read_csv(Cursor::new(text)), Err(IngestError::MissingColumn("datetime"))));
}

#[test]
fn concatenates_inputs_in_order() {
    let mut a = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
    writeln!(a, r#"{{"location":"Denver","id":1,"datetime":"9/28/25 9:30 AM"}}"#).unwrap();
    let mut b = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(b, r#"[{{"location":"Tampa","id":2,"datetime":"9/28/25 9:30 AM"}}]"#).unwrap();
    let paths = vec![a.path().to_string_lossy().to_string(), b.path().to_string_lossy().to_string()];
    let recs = ingest::load_records(&paths, None).unwrap();
    assert_eq!(recs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn format_names() {
    assert_eq!(InputFormat::parse("NDJSON").unwrap(), InputFormat::JsonLines);
    assert_eq!(InputFormat::parse("csv").unwrap(), InputFormat::Csv);
    assert!(matches!(InputFormat::parse("xlsx"), Err(IngestError::UnknownFormat(_))));
    assert_eq!(InputFormat::from_path(Path::new("data.txt")), InputFormat::JsonLines);
}
