//! CSV intake and prediction output for the batch path.
//!
//! Input files have exactly six or seven columns in fixed order
//! (`buying,maint,doors,persons,lug_boot,safety[,class]`), with or without a
//! header row. The output repeats the input columns and appends
//! `predicted_class`.

use std::io::{Read, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::feature::{Feature, FEATURE_COUNT};
use crate::record::RawRecord;
use crate::{CarEvalError, Result};

/// Name of the appended output column.
pub const PREDICTION_COLUMN: &str = "predicted_class";
/// Name of the optional seventh input column.
pub const CLASS_COLUMN: &str = "class";

/// How the first row of a CSV file is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Header present when the first row names the six features.
    #[default]
    Auto,
    Yes,
    No,
}

/// Parsed CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvInput {
    /// Header cells when the file had a header row.
    pub header: Option<Vec<String>>,
    pub records: Vec<RawRecord>,
    /// Column count shared by every row (6 or 7).
    pub columns: usize,
}

impl CsvInput {
    /// Header for the prediction output: the input header (or the canonical
    /// column names) followed by [`PREDICTION_COLUMN`].
    pub fn output_header(&self) -> Vec<String> {
        let mut header = match &self.header {
            Some(h) => h.clone(),
            None => {
                let mut names: Vec<String> =
                    Feature::ALL.iter().map(|f| f.as_str().to_string()).collect();
                if self.columns > FEATURE_COUNT {
                    names.push(CLASS_COLUMN.to_string());
                }
                names
            }
        };
        header.push(PREDICTION_COLUMN.to_string());
        header
    }
}

fn names_features(row: &csv::StringRecord) -> bool {
    Feature::ALL
        .iter()
        .zip(row.iter())
        .all(|(f, cell)| cell.trim().eq_ignore_ascii_case(f.as_str()))
        && row.len() >= FEATURE_COUNT
}

fn check_width(width: usize, line: u64) -> Result<()> {
    if width == FEATURE_COUNT || width == FEATURE_COUNT + 1 {
        Ok(())
    } else {
        Err(CarEvalError::MalformedInput(format!(
            "line {line} has {width} columns, expected {FEATURE_COUNT} or {}",
            FEATURE_COUNT + 1
        )))
    }
}

/// Read every row of a CSV source into raw records.
pub fn read_records<R: Read>(reader: R, mode: HeaderMode) -> Result<CsvInput> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = rdr.records();
    let first = match rows.next() {
        Some(row) => row?,
        None => return Err(CarEvalError::MalformedInput("CSV file is empty".into())),
    };
    check_width(first.len(), 1)?;
    let columns = first.len();

    let has_header = match mode {
        HeaderMode::Yes if !names_features(&first) => {
            return Err(CarEvalError::MalformedInput(format!(
                "header must start with {}",
                Feature::ALL.map(|f| f.as_str()).join(",")
            )))
        }
        HeaderMode::Yes => true,
        HeaderMode::No => false,
        HeaderMode::Auto => names_features(&first),
    };
    debug!(has_header, columns, "reading CSV");

    let mut input = CsvInput {
        header: None,
        records: Vec::new(),
        columns,
    };
    let mut push = |row: &csv::StringRecord, line: u64| -> Result<()> {
        if row.len() != columns {
            return Err(CarEvalError::MalformedInput(format!(
                "line {line} has {} columns but the file has {columns}",
                row.len()
            )));
        }
        let cells: Vec<&str> = row.iter().collect();
        let record = RawRecord::from_cells(&cells)
            .ok_or_else(|| CarEvalError::MalformedInput(format!("line {line} is too short")))?;
        input.records.push(record);
        Ok(())
    };

    let header = if has_header {
        Some(first.iter().map(|c| c.trim().to_string()).collect())
    } else {
        push(&first, 1)?;
        None
    };
    for (i, row) in rows.enumerate() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or(i as u64 + 2);
        push(&row, line)?;
    }
    input.header = header;
    Ok(input)
}

/// Write the prediction table. `rows` pairs each source record with its
/// predicted label.
pub fn write_predictions<'a, W, I>(writer: W, header: &[String], rows: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a RawRecord, &'a str)>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header)?;
    for (record, label) in rows {
        let mut cells = record.cells();
        cells.push(label);
        wtr.write_record(&cells)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_detects_header() {
        let data = "buying,maint,doors,persons,lug_boot,safety\nlow,med,2,4,big,high\n";
        let input = read_records(data.as_bytes(), HeaderMode::Auto).unwrap();
        assert_eq!(input.records.len(), 1);
        assert_eq!(input.header.as_ref().unwrap()[4], "lug_boot");
        assert_eq!(input.records[0].get(Feature::LugBoot), "big");
    }

    #[test]
    fn headerless_seven_columns() {
        let data = "vhigh,vhigh,2,2,small,low,unacc\nlow,low,4,more,big,high,vgood\n";
        let input = read_records(data.as_bytes(), HeaderMode::Auto).unwrap();
        assert!(input.header.is_none());
        assert_eq!(input.records.len(), 2);
        assert_eq!(input.records[1].class.as_deref(), Some("vgood"));
        assert_eq!(
            input.output_header(),
            vec!["buying", "maint", "doors", "persons", "lug_boot", "safety", "class", "predicted_class"]
        );
    }

    #[test]
    fn wrong_width_is_malformed() {
        let err = read_records("a,b,c\n".as_bytes(), HeaderMode::No).unwrap_err();
        assert!(matches!(err, CarEvalError::MalformedInput(_)));

        let ragged = "low,low,2,2,small,low\nlow,low,2,2,small,low,acc\n";
        let err = read_records(ragged.as_bytes(), HeaderMode::No).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn forced_header_must_name_features() {
        let err = read_records("low,low,2,2,small,low\n".as_bytes(), HeaderMode::Yes).unwrap_err();
        assert!(matches!(err, CarEvalError::MalformedInput(_)));
    }

    #[test]
    fn header_only_file_has_no_records() {
        let data = "buying,maint,doors,persons,lug_boot,safety\n";
        let input = read_records(data.as_bytes(), HeaderMode::Auto).unwrap();
        assert!(input.records.is_empty());
    }

    #[test]
    fn writes_prediction_column() {
        let rec = RawRecord::from_cells(&["low", "low", "2", "2", "small", "low"]).unwrap();
        let mut out = Vec::new();
        let header: Vec<String> = ["buying", "maint", "doors", "persons", "lug_boot", "safety", "predicted_class"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        write_predictions(&mut out, &header, [(&rec, "unacc")]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "buying,maint,doors,persons,lug_boot,safety,predicted_class\nlow,low,2,2,small,low,unacc\n"
        );
    }
}
