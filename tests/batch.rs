use std::collections::BTreeMap;
use std::path::PathBuf;

use car_eval::{
    read_records, resolve_batch, Artifact, CarEvalError, EncodingTable, HeaderMode, Normalizer,
    RawRecord, Session,
};

fn row(cells: [&str; 6]) -> RawRecord {
    RawRecord::new(cells.map(str::to_string))
}

fn demo_session() -> Session {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/car_bundle.json");
    Session::new(Artifact::load(path).unwrap(), 0.6)
}

#[test]
fn bad_rows_are_skipped_not_fatal() {
    let table = EncodingTable::build(BTreeMap::new());
    let n = Normalizer::new(&table);
    let records = vec![
        row(["low", "low", "2", "2", "small", "low"]),
        row(["med", "med", "3", "4", "med", "med"]),
        row(["???", "med", "3", "4", "med", "med"]),
        row(["high", "high", "4", "more", "big", "high"]),
        row(["vhigh", "vhigh", "5more", "more", "big", "high"]),
        row(["low", "low", "many", "2", "small", "low"]),
        row(["low", "hgh", "2", "4", "big", "med"]),
        row(["med", "low", "2", "4", "big", "med"]),
        row(["med", "low", "2", "4", "big", "zzzz"]),
        row(["high", "low", "3", "2", "small", "high"]),
    ];

    let out = resolve_batch(&n, records).unwrap();
    assert_eq!(out.resolved.len(), 7);
    let rejected: Vec<usize> = out.rejected.iter().map(|r| r.index).collect();
    assert_eq!(rejected, vec![2, 5, 8]);
    let resolved: Vec<usize> = out.resolved.iter().map(|r| r.index).collect();
    assert_eq!(resolved, vec![0, 1, 3, 4, 6, 7, 9]);
    assert!(out.rejected[1].message.contains("doors"));
    assert_eq!(out.resolved[4].numeric.codes(), [1, 3, 2, 4, 3, 2]);
}

#[test]
fn all_rows_bad_means_no_valid_rows() {
    let table = EncodingTable::build(BTreeMap::new());
    let n = Normalizer::new(&table);
    let records = vec![
        row(["???", "low", "2", "2", "small", "low"]),
        row(["low", "low", "2", "none", "small", "low"]),
    ];
    match resolve_batch(&n, records) {
        Err(CarEvalError::NoValidRows { rejected }) => {
            let indices: Vec<usize> = rejected.iter().map(|r| r.index).collect();
            assert_eq!(indices, vec![0, 1]);
            assert!(rejected[0].message.contains("buying"));
            assert!(rejected[1].message.contains("persons"));
        }
        other => panic!("expected no valid rows, got {other:?}"),
    }
}

#[test]
fn session_predicts_demo_csv() {
    let session = demo_session();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/cars.csv");
    let input = read_records(std::fs::File::open(path).unwrap(), HeaderMode::Auto).unwrap();
    assert_eq!(input.columns, 7);

    let report = session.evaluate_batch(input.records).unwrap();
    assert!(report.rejected.is_empty());
    for (row, prediction) in &report.rows {
        assert_eq!(Some(prediction.label.as_str()), row.raw.class.as_deref(), "row {}", row.index);
    }
}

#[test]
fn session_batch_keeps_rejections() {
    let session = demo_session();
    let records = vec![
        row(["low", "low", "4", "4", "big", "high"]),
        row(["low", "low", "4", "4", "huge-ish", "high"]),
    ];
    let report = session.evaluate_batch(records).unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].1.label, "vgood");
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].index, 1);
}
