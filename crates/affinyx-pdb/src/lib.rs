//! affinyx-pdb — structural database access.
//!
//! Field-criterion search over the RCSB PDB search API, per-entry metadata
//! retrieval with bounded fixed-delay retry, and ligand catalog lookups via
//! the GraphQL data service.
//!
//! | Module   | Contents                                            |
//! |----------|-----------------------------------------------------|
//! | `query`  | [`FieldQuery`] constructors, one per searchable field |
//! | `client` | [`RcsbClient`] search/metadata/ligand operations    |
//! | `retry`  | [`RetryPolicy`] and the bounded retry loop          |
//! | `models` | Wire records, including [`LigandRecord`]            |

pub mod client;
pub mod models;
pub mod query;
pub mod retry;

pub use client::RcsbClient;
pub use models::LigandRecord;
pub use query::FieldQuery;
pub use retry::RetryPolicy;
