//! Remote source abstraction for the request pipeline.
//!
//! The pipeline only needs three lookups; hiding them behind a trait keeps
//! the orchestrator testable against an in-memory source.

use async_trait::async_trait;

use affinyx_chembl::{BioactivityRecord, ChemblClient, CompoundRecord};
use affinyx_common::Result;

/// The three remote lookups the pipeline performs, in call order.
#[async_trait]
pub trait BioactivitySource {
    /// Bioactivity-database target id for an external protein accession.
    /// Must fail when the accession resolves to nothing.
    async fn resolve_target_id(&self, uniprot_id: &str) -> Result<String>;

    /// Raw potency measurements for a resolved target. An empty table is
    /// a valid answer, not an error.
    async fn bioactivities(&self, target_chembl_id: &str) -> Result<Vec<BioactivityRecord>>;

    /// Raw compound rows for an id batch. Same empty-table contract.
    async fn compounds(&self, compound_ids: &[String]) -> Result<Vec<CompoundRecord>>;
}

#[async_trait]
impl BioactivitySource for ChemblClient {
    async fn resolve_target_id(&self, uniprot_id: &str) -> Result<String> {
        self.target_id_by_uniprot(uniprot_id, 0).await
    }

    async fn bioactivities(&self, target_chembl_id: &str) -> Result<Vec<BioactivityRecord>> {
        self.bioactivities_for_target(target_chembl_id).await
    }

    async fn compounds(&self, compound_ids: &[String]) -> Result<Vec<CompoundRecord>> {
        self.compounds_by_ids(compound_ids).await
    }
}
