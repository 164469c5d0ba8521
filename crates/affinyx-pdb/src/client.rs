//! Structural database client.
//!
//! Search API: https://search.rcsb.org/rcsbsearch/v2/query (criterion nodes
//! composed with a logical AND). Metadata comes from the REST core-entry
//! endpoint behind a bounded retry, and the ligand catalog of an entry from
//! a single GraphQL request against the data service.

use std::collections::HashMap;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use affinyx_common::sandbox::SandboxClient as Client;
use affinyx_common::{AffinyxError, Result};

use crate::models::{LigandRecord, LigandResponse, SearchResponse};
use crate::query::FieldQuery;
use crate::retry::{retry, RetryPolicy};

const RCSB_SEARCH_URL: &str = "https://search.rcsb.org/rcsbsearch/v2/query";
const RCSB_DATA_URL: &str = "https://data.rcsb.org";

/// Client for structural-entry search, metadata, and ligand lookups.
pub struct RcsbClient {
    client: Client,
    search_url: String,
    data_url: String,
    retry: RetryPolicy,
}

impl RcsbClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::new()?,
            search_url: RCSB_SEARCH_URL.to_string(),
            data_url: RCSB_DATA_URL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy (tests drop the delay).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Point search requests at a different endpoint (stub servers in tests).
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Point metadata and ligand requests at a different host.
    pub fn with_data_url(mut self, url: impl Into<String>) -> Self {
        self.data_url = url.into();
        self
    }

    /// Entry ids matching the intersection of all criteria.
    ///
    /// The service answers 204 when nothing matches, which maps to an
    /// empty id list rather than an error.
    #[instrument(skip(self, criteria), fields(n_criteria = criteria.len()))]
    pub async fn search(&self, criteria: &[FieldQuery]) -> Result<Vec<String>> {
        if criteria.is_empty() {
            return Err(AffinyxError::InvalidInput(
                "at least one search criterion must be provided".to_string(),
            ));
        }

        let payload = build_search_payload(criteria);
        let resp = self.client.post(&self.search_url)?.json(&payload).send().await?;
        if resp.status() == StatusCode::NO_CONTENT {
            debug!("Search matched no entries");
            return Ok(Vec::new());
        }
        let resp = resp.error_for_status()?;

        let parsed: SearchResponse = resp.json().await?;
        let ids: Vec<String> = parsed.result_set.into_iter().map(|hit| hit.identifier).collect();
        debug!(count = ids.len(), "Search complete");
        Ok(ids)
    }

    /// Full metadata document for one entry, retried per the policy.
    #[instrument(skip(self))]
    pub async fn entry_metadata(&self, entry_id: &str) -> Result<Value> {
        let id = entry_id.trim();
        if id.is_empty() {
            return Err(AffinyxError::InvalidInput(
                "entry id must be a non-empty string".to_string(),
            ));
        }

        let url = format!("{}/rest/v1/core/entry/{}", self.data_url, id);
        retry(&self.retry, id, || async {
            let resp = self.client.get(&url)?.send().await?;
            if !resp.status().is_success() {
                return Err(AffinyxError::NotFound(format!(
                    "metadata fetch for entry '{id}' returned HTTP {}",
                    resp.status()
                )));
            }
            Ok(resp.json::<Value>().await?)
        })
        .await
    }

    /// Metadata for each entry in turn. An entry that stays unreachable
    /// after its retry budget is skipped with a warning, not fatal.
    #[instrument(skip(self, entry_ids), fields(n_entries = entry_ids.len()))]
    pub async fn entry_metadata_batch(&self, entry_ids: &[String]) -> Vec<Value> {
        let mut documents = Vec::with_capacity(entry_ids.len());
        for entry_id in entry_ids {
            match self.entry_metadata(entry_id).await {
                Ok(metadata) => documents.push(metadata),
                Err(err) => {
                    warn!(entry_id = %entry_id, error = %err, "Skipping entry after exhausted retries");
                }
            }
        }
        documents
    }

    /// Ligand catalog of one entry, keyed by chemical component id.
    #[instrument(skip(self))]
    pub async fn ligands(&self, entry_id: &str) -> Result<HashMap<String, LigandRecord>> {
        let id = entry_id.trim();
        if id.is_empty() {
            return Err(AffinyxError::InvalidInput(
                "entry id must be a non-empty string".to_string(),
            ));
        }

        let query = format!(
            "{{ entry(entry_id: \"{id}\") {{ nonpolymer_entities {{ nonpolymer_comp {{ \
             chem_comp {{ id name formula formula_weight }} \
             rcsb_chem_comp_descriptor {{ SMILES SMILES_stereo InChI InChIKey }} }} }} }} }}"
        );
        let url = format!("{}/graphql", self.data_url);
        let resp = self
            .client
            .post(&url)?
            .json(&json!({ "query": query }))
            .send()
            .await?
            .error_for_status()?;

        let parsed: LigandResponse = resp.json().await?;
        let entry = parsed.data.and_then(|d| d.entry).ok_or_else(|| {
            AffinyxError::NotFound(format!("no structural entry found for id '{id}'"))
        })?;

        let ligands = entry.into_ligand_map();
        debug!(count = ligands.len(), "Ligand catalog fetched");
        Ok(ligands)
    }
}

/// Search payload: all criteria ANDed into one group node.
fn build_search_payload(criteria: &[FieldQuery]) -> Value {
    let nodes: Vec<Value> = criteria.iter().map(FieldQuery::to_node).collect();
    json!({
        "query": {
            "type": "group",
            "logical_operator": "and",
            "nodes": nodes,
        },
        "return_type": "entry",
        "request_options": {
            "return_all_hits": true,
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
