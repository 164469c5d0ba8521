//! affinyx-chembl — bioactivity database access.
//!
//! Thin typed layer over the ChEMBL REST API: target resolution from
//! UniProt accessions, binding-assay IC50 activity queries with offset
//! pagination, and chunked compound structure lookups.
//!
//! | Module   | Contents                                         |
//! |----------|--------------------------------------------------|
//! | `client` | [`ChemblClient`] and its lookup operations       |
//! | `models` | Wire records for target, activity, and molecule  |

pub mod client;
pub mod models;

pub use client::ChemblClient;
pub use models::{BioactivityRecord, CompoundRecord, MoleculeStructures, TargetRecord};
