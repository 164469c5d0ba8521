//! Incremental CSV export and bulk fingerprinting.
//!
//! Rows are appended to the target file in fixed-size chunks. The header is
//! written only when the file starts empty, so repeated exports extend a
//! dataset instead of overwriting it.

use std::fs::OpenOptions;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, warn};

use affinyx_chem::{
    morgan_fingerprint, parse_smiles, Fingerprint, DEFAULT_N_BITS, DEFAULT_RADIUS,
};
use affinyx_common::Result;

use crate::filter::MoleculeRecord;

pub const DEFAULT_CHUNK_ROWS: usize = 500;

/// Append-only CSV writer with chunked flushing.
pub struct ChunkedCsvExporter {
    path: PathBuf,
    chunk_rows: usize,
}

impl ChunkedCsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_rows: DEFAULT_CHUNK_ROWS,
        }
    }

    pub fn with_chunk_rows(mut self, chunk_rows: usize) -> Self {
        self.chunk_rows = chunk_rows.max(1);
        self
    }

    /// Appends all rows in chunk-sized batches. Returns the row count.
    pub fn export<T: Serialize>(&self, rows: &[T]) -> Result<usize> {
        let mut written = 0;
        for chunk in rows.chunks(self.chunk_rows) {
            written += self.append_chunk(chunk)?;
        }
        debug!(rows = written, path = %self.path.display(), "Export complete");
        Ok(written)
    }

    fn append_chunk<T: Serialize>(&self, rows: &[T]) -> Result<usize> {
        // Header only when the file does not exist yet or holds no bytes.
        let write_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(rows.len())
    }
}

/// One exportable fingerprint row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FingerprintRow {
    pub smiles: String,
    pub fingerprint_hex: String,
}

/// Morgan fingerprints for a batch, one row per input in input order.
///
/// Unparsable structures yield the all-zero fingerprint so a single bad
/// row cannot discard the batch.
pub fn fingerprint_rows<R: MoleculeRecord>(records: &[R]) -> Vec<FingerprintRow> {
    records
        .iter()
        .map(|record| {
            let smiles = record.smiles();
            let fingerprint = match parse_smiles(smiles) {
                Ok(molecule) => morgan_fingerprint(&molecule, DEFAULT_RADIUS, DEFAULT_N_BITS),
                Err(err) => {
                    warn!(smiles, error = %err, "Unparsable structure, emitting zero fingerprint");
                    Fingerprint::zeros(DEFAULT_N_BITS)
                }
            };
            FingerprintRow {
                smiles: smiles.to_string(),
                fingerprint_hex: fingerprint.to_hex(),
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Serialize)]
    struct PotencyRow {
        molecule_chembl_id: String,
        pic50: f64,
    }

    fn row(id: &str, pic50: f64) -> PotencyRow {
        PotencyRow {
            molecule_chembl_id: id.to_string(),
            pic50,
        }
    }

    #[test]
    fn test_export_writes_header_once_across_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("potency.csv");
        let exporter = ChunkedCsvExporter::new(&path).with_chunk_rows(2);

        let first = vec![
            row("CHEMBL939", 6.52),
            row("CHEMBL941", 7.85),
            row("CHEMBL553", 8.01),
        ];
        assert_eq!(exporter.export(&first).unwrap(), 3);

        let second = vec![row("CHEMBL1201496", 8.43)];
        assert_eq!(exporter.export(&second).unwrap(), 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "molecule_chembl_id,pic50");
        assert_eq!(contents.matches("molecule_chembl_id").count(), 1);
        assert!(lines[4].starts_with("CHEMBL1201496,"));
    }

    #[test]
    fn test_export_empty_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let exporter = ChunkedCsvExporter::new(&path);

        let rows: Vec<PotencyRow> = Vec::new();
        assert_eq!(exporter.export(&rows).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_fingerprint_rows_preserve_order_and_isolate_failures() {
        let batch = vec![
            "CCO".to_string(),
            "x#!garbage".to_string(),
            "c1ccccc1".to_string(),
        ];
        let rows = fingerprint_rows(&batch);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].smiles, "CCO");
        assert_ne!(rows[0].fingerprint_hex, rows[2].fingerprint_hex);

        // The bad row collapses to the all-zero fingerprint.
        let zeros = Fingerprint::zeros(DEFAULT_N_BITS).to_hex();
        assert_eq!(rows[1].fingerprint_hex, zeros);
        assert_ne!(rows[0].fingerprint_hex, zeros);
    }

    #[test]
    fn test_fingerprint_rows_round_trip_through_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fingerprints.csv");
        let exporter = ChunkedCsvExporter::new(&path).with_chunk_rows(1);

        let rows = fingerprint_rows(&["CCO".to_string()]);
        exporter.export(&rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("smiles,fingerprint_hex"));
        assert!(contents.contains("CCO,"));
    }
}
