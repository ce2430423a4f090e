//! Row-wise resolution of a batch of raw records.
//!
//! Rows are independent: a bad field rejects only its own row and the
//! remaining rows are still processed.

use serde::Serialize;
use tracing::{debug, info};

use crate::normalizer::Normalizer;
use crate::record::{NumericRecord, RawRecord};
use crate::{CarEvalError, Result};

/// A row that failed resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// Zero-based data row index (header excluded).
    pub index: usize,
    pub message: String,
}

/// A row that resolved, kept alongside its source record.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    pub index: usize,
    pub raw: RawRecord,
    pub numeric: NumericRecord,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub resolved: Vec<ResolvedRow>,
    pub rejected: Vec<RejectedRow>,
}

impl BatchOutcome {
    pub fn total_rows(&self) -> usize {
        self.resolved.len() + self.rejected.len()
    }
}

/// Resolve every record, collecting failures instead of stopping at the first.
///
/// Fails with [`CarEvalError::NoValidRows`], carrying every rejection, when
/// nothing resolves.
pub fn resolve_batch(normalizer: &Normalizer<'_>, records: Vec<RawRecord>) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    for (index, raw) in records.into_iter().enumerate() {
        match normalizer.resolve_record(&raw) {
            Ok(numeric) => outcome.resolved.push(ResolvedRow { index, raw, numeric }),
            Err(e) => {
                debug!(row = index, error = %e, "rejected row");
                outcome.rejected.push(RejectedRow {
                    index,
                    message: e.to_string(),
                });
            }
        }
    }
    info!(
        resolved = outcome.resolved.len(),
        rejected = outcome.rejected.len(),
        "batch resolved"
    );
    if outcome.resolved.is_empty() {
        return Err(CarEvalError::NoValidRows {
            rejected: outcome.rejected,
        });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingTable;
    use std::collections::BTreeMap;

    fn rec(cells: [&str; 6]) -> RawRecord {
        RawRecord::new(cells.map(str::to_string))
    }

    #[test]
    fn empty_batch_has_no_valid_rows() {
        let table = EncodingTable::build(BTreeMap::new());
        let n = Normalizer::new(&table);
        assert!(matches!(
            resolve_batch(&n, Vec::new()),
            Err(CarEvalError::NoValidRows { rejected }) if rejected.is_empty()
        ));
    }

    #[test]
    fn rejection_message_names_feature() {
        let table = EncodingTable::build(BTreeMap::new());
        let n = Normalizer::new(&table);
        let out = resolve_batch(
            &n,
            vec![
                rec(["low", "low", "2", "2", "small", "low"]),
                rec(["low", "low", "2", "2", "enormous", "low"]),
            ],
        )
        .unwrap();
        assert_eq!(out.resolved.len(), 1);
        assert_eq!(out.rejected[0].index, 1);
        assert!(out.rejected[0].message.contains("lug_boot"));
        assert_eq!(out.total_rows(), 2);
    }
}
