//! Bioactivity database client.
//!
//! API docs: https://chembl.gitbook.io/chembl-interface-documentation/web-resources/chembl-api
//! Endpoint: https://www.ebi.ac.uk/chembl/api/data
//!
//! Lookup semantics follow the two-tier policy the orchestrator depends on:
//! target resolution is a hard failure when nothing matches, while activity
//! and compound queries soft-fail to an empty table on an error status so a
//! remote hiccup degrades one stage instead of crashing the run.

use affinyx_common::sandbox::SandboxClient as Client;
use affinyx_common::{AffinyxError, Result};
use tracing::{debug, instrument, warn};

use crate::models::{
    ActivitiesResponse, BioactivityRecord, CompoundRecord, MoleculesResponse, TargetRecord,
    TargetsResponse,
};

const CHEMBL_API_URL: &str = "https://www.ebi.ac.uk/chembl/api/data";

/// Page size for list endpoints (the service caps pages at 1000 rows).
const PAGE_LIMIT: usize = 1000;

/// Compound ids per request for the `__in` filter, kept small enough to
/// stay clear of URL-length limits.
const ID_BATCH: usize = 50;

const ACTIVITY_FIELDS: &str = "activity_id,assay_chembl_id,assay_description,assay_type,\
                               molecule_chembl_id,standard_type,standard_units,\
                               standard_relation,standard_value,target_chembl_id,\
                               target_organism";

const TARGET_FIELDS: &str = "target_chembl_id,pref_name,organism,target_type";

const MOLECULE_FIELDS: &str = "molecule_chembl_id,molecule_structures";

/// Client for target, activity, and compound lookups.
pub struct ChemblClient {
    client: Client,
    base_url: String,
}

impl ChemblClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::new()?,
            base_url: CHEMBL_API_URL.to_string(),
        })
    }

    /// Point the client at a different base URL (stub servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// All targets matching a UniProt accession.
    ///
    /// Resolution is the entry point of every downstream request, so zero
    /// rows and error statuses are both hard failures here.
    #[instrument(skip(self))]
    pub async fn targets_by_uniprot(&self, uniprot_id: &str) -> Result<Vec<TargetRecord>> {
        let accession = uniprot_id.trim();
        if accession.is_empty() {
            return Err(AffinyxError::InvalidInput(
                "UniProt accession must be a non-empty string".to_string(),
            ));
        }

        let url = format!("{}/target.json", self.base_url);
        let limit = PAGE_LIMIT.to_string();
        let params = [
            ("target_components__accession", accession),
            ("only", TARGET_FIELDS),
            ("limit", limit.as_str()),
        ];

        let resp = self.client.get(&url)?.query(&params).send().await?;
        if !resp.status().is_success() {
            return Err(AffinyxError::NotFound(format!(
                "target lookup for UniProt accession '{}' returned HTTP {}",
                accession,
                resp.status()
            )));
        }

        let page: TargetsResponse = resp.json().await?;
        debug!(count = page.targets.len(), "Target lookup returned rows");

        if page.targets.is_empty() {
            return Err(AffinyxError::NotFound(format!(
                "no targets found for UniProt accession '{}'",
                accession
            )));
        }
        Ok(page.targets)
    }

    /// Target id selected by position from the [`targets_by_uniprot`] table.
    ///
    /// [`targets_by_uniprot`]: ChemblClient::targets_by_uniprot
    #[instrument(skip(self))]
    pub async fn target_id_by_uniprot(&self, uniprot_id: &str, index: usize) -> Result<String> {
        let targets = self.targets_by_uniprot(uniprot_id).await?;
        let available = targets.len();
        targets
            .into_iter()
            .nth(index)
            .map(|t| t.target_chembl_id)
            .ok_or(AffinyxError::OutOfRange { index, available })
    }

    /// All binding-assay IC50 measurements for a target, paged to completion.
    ///
    /// Soft-fail: an error status yields an empty table (with a warning)
    /// rather than an error. Callers must branch on emptiness.
    #[instrument(skip(self))]
    pub async fn bioactivities_for_target(
        &self,
        target_chembl_id: &str,
    ) -> Result<Vec<BioactivityRecord>> {
        let target = target_chembl_id.trim();
        if target.is_empty() {
            return Err(AffinyxError::InvalidInput(
                "target id must be a non-empty string".to_string(),
            ));
        }

        let url = format!("{}/activity.json", self.base_url);
        let mut all: Vec<BioactivityRecord> = Vec::new();
        let mut offset = 0usize;

        loop {
            let limit = PAGE_LIMIT.to_string();
            let offset_str = offset.to_string();
            let params = [
                ("target_chembl_id", target),
                ("standard_type", "IC50"),
                ("standard_relation", "="),
                ("assay_type", "B"),
                ("only", ACTIVITY_FIELDS),
                ("limit", limit.as_str()),
                ("offset", offset_str.as_str()),
            ];

            let resp = self.client.get(&url)?.query(&params).send().await?;
            if !resp.status().is_success() {
                warn!(
                    status = %resp.status(),
                    target = target,
                    "Activity query returned error status, treating as empty"
                );
                return Ok(Vec::new());
            }

            let page: ActivitiesResponse = resp.json().await?;
            let rows = page.activities.len();
            let total = page
                .page_meta
                .as_ref()
                .and_then(|m| m.total_count)
                .unwrap_or((all.len() + rows) as u64);
            all.extend(page.activities);

            if rows == 0 || all.len() as u64 >= total {
                break;
            }
            offset += rows;
        }

        debug!(count = all.len(), target = target, "Activity query complete");
        Ok(all)
    }

    /// Compound rows for an id batch, chunked to respect URL-length limits.
    ///
    /// Same soft-fail policy as the activity query. Chunks are fetched
    /// sequentially and concatenated in input order.
    #[instrument(skip(self, compound_ids), fields(n_ids = compound_ids.len()))]
    pub async fn compounds_by_ids(&self, compound_ids: &[String]) -> Result<Vec<CompoundRecord>> {
        if compound_ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/molecule.json", self.base_url);
        let mut all: Vec<CompoundRecord> = Vec::new();

        for chunk in compound_ids.chunks(ID_BATCH) {
            let joined = chunk.join(",");
            let limit = chunk.len().to_string();
            let params = [
                ("molecule_chembl_id__in", joined.as_str()),
                ("only", MOLECULE_FIELDS),
                ("limit", limit.as_str()),
            ];

            let resp = self.client.get(&url)?.query(&params).send().await?;
            if !resp.status().is_success() {
                warn!(
                    status = %resp.status(),
                    chunk_len = chunk.len(),
                    "Compound query returned error status, treating as empty"
                );
                return Ok(Vec::new());
            }

            let page: MoleculesResponse = resp.json().await?;
            all.extend(page.molecules);
        }

        debug!(count = all.len(), "Compound query complete");
        Ok(all)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_default_base_url() {
        let client = ChemblClient::new().unwrap();
        assert!(client.base_url.contains("www.ebi.ac.uk"));
    }

    #[test]
    fn test_with_base_url_overrides() {
        let client = ChemblClient::new()
            .unwrap()
            .with_base_url("http://localhost:9900/chembl/api/data");
        assert!(client.base_url.starts_with("http://localhost"));
    }

    #[tokio::test]
    async fn test_blank_accession_is_invalid_input() {
        let client = ChemblClient::new().unwrap();
        let err = client.targets_by_uniprot("   ").await.unwrap_err();
        assert!(matches!(err, AffinyxError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_blank_target_id_is_invalid_input() {
        let client = ChemblClient::new().unwrap();
        let err = client.bioactivities_for_target("").await.unwrap_err();
        assert!(matches!(err, AffinyxError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_empty_id_batch_short_circuits() {
        let client = ChemblClient::new().unwrap();
        let rows = client.compounds_by_ids(&[]).await.unwrap();
        assert!(rows.is_empty());
    }
}
