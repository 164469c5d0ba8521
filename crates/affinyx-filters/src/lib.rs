//! affinyx-filters — drug-likeness rules and batch compound filtering.
//!
//! Single-molecule rule evaluation (Lipinski rule of five, softened REOS),
//! a rule registry that partitions batches with per-row fault isolation,
//! and chunked CSV export for filtered tables and fingerprint matrices.

pub mod export;
pub mod filter;
pub mod rules;

pub use export::{fingerprint_rows, ChunkedCsvExporter, FingerprintRow, DEFAULT_CHUNK_ROWS};
pub use filter::{CompoundFilter, MoleculeRecord, Violation};
pub use rules::{ro5_properties, soft_reos_properties, Ro5Properties, SoftReosProperties};
