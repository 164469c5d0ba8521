//! affinyx-pipeline — bioactivity data-request pipeline.
//!
//! Resolves a protein accession against the bioactivity database, fetches
//! and cleans its potency measurements, joins them with compound
//! structures, and normalizes potency to pIC50, most potent first.
//!
//! # Example
//!
//! ```rust,no_run
//! use affinyx_chembl::ChemblClient;
//! use affinyx_pipeline::BioactivityPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ChemblClient::new()?;
//!
//!     // EGFR, with every IC50 measurement normalized to pIC50
//!     let table = BioactivityPipeline::new("P00533").run(&client).await?;
//!     for row in table.iter().take(10) {
//!         println!("{} {:?}", row.molecule_chembl_id, row.pic50);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod pipeline;
pub mod source;

pub use models::{CompoundActivity, CompoundStructure, PotencyMeasurement};
pub use pipeline::{BioactivityPipeline, PipelineError, PipelineStage};
pub use source::BioactivitySource;
