//! Differential tests against the `csv` crate.
//!
//! Documents written by one side must be read back identically by the other.

use fastcsv::{Dialect, HeaderMode, LineTerminator, Precision};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    id: u32,
    label: String,
    score: Option<f64>,
    active: bool,
}

fn entries() -> Vec<Entry> {
    vec![
        Entry { id: 1, label: "plain".to_string(), score: Some(0.5), active: true },
        Entry { id: 2, label: "with,comma".to_string(), score: None, active: false },
        Entry { id: 3, label: "quote \"inside\"".to_string(), score: Some(-12.25), active: true },
        Entry { id: 4, label: "line\nbreak".to_string(), score: Some(1e-3), active: false },
        Entry { id: 5, label: "ünïcödé".to_string(), score: None, active: true },
        Entry { id: 6, label: String::new(), score: Some(7.0), active: false },
    ]
}

fn rfc_dialect() -> Dialect {
    Dialect { escape: b'"', line_terminator: LineTerminator::Lf, ..Dialect::default() }
}

#[test]
fn test_csv_crate_reads_backslash_escaped_output() {
    let dialect = Dialect { line_terminator: LineTerminator::Lf, ..Dialect::default() };
    let text = fastcsv::to_string_with(&entries(), &dialect, HeaderMode::Default).unwrap();

    let mut reader = csv::ReaderBuilder::new().escape(Some(b'\\')).double_quote(false).from_reader(text.as_bytes());
    let parsed: Vec<Entry> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(parsed, entries());
}

#[test]
fn test_csv_crate_reads_rfc_output() {
    let text = fastcsv::to_string_with(&entries(), &rfc_dialect(), HeaderMode::Default).unwrap();

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["id", "label", "score", "active"]);

    let parsed: Vec<Entry> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(parsed, entries());
}

#[test]
fn test_reads_csv_crate_output() {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    for entry in entries() {
        writer.serialize(entry).unwrap();
    }
    let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    let parsed: Vec<Entry> = fastcsv::from_str_with(&text, &rfc_dialect(), HeaderMode::Default).unwrap();
    assert_eq!(parsed, entries());
}

#[test]
fn test_raw_rows_match_csv_crate() {
    let text = "a,\"b,c\",d\r\n\"multi\nline\",,\"x\"\"y\"\n";

    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(text.as_bytes());
    let expected: Vec<Vec<String>> = reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect();

    let actual: Vec<Vec<String>> = fastcsv::from_str_with(text, &rfc_dialect(), HeaderMode::NoHeader).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_fixed_precision_column() {
    #[derive(Serialize, Deserialize)]
    struct Price {
        ticker: String,
        price: Precision<2>,
    }

    let prices = [Price { ticker: "ACME".to_string(), price: Precision(3.14159) }];
    let text = fastcsv::to_string(&prices, HeaderMode::NoHeader).unwrap();
    assert!(text.starts_with("ACME,3.14"));

    let back: Vec<Price> = fastcsv::from_str(&text, HeaderMode::NoHeader).unwrap();
    assert_eq!(back[0].ticker, "ACME");
    assert_eq!(back[0].price, Precision(3.14));
}
