//! Wire models for the bioactivity database.
//!
//! These mirror the JSON the service actually returns: list endpoints wrap
//! their rows next to a `page_meta` block, numeric fields sometimes arrive
//! as strings, and the structure notation sits behind a nested object.

use serde::{Deserialize, Deserializer, Serialize};

/// Pagination block attached to every list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Target row as returned by the target endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRecord {
    pub target_chembl_id: String,
    #[serde(default)]
    pub pref_name: Option<String>,
    #[serde(default)]
    pub organism: Option<String>,
    #[serde(default)]
    pub target_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetsResponse {
    #[serde(default)]
    pub targets: Vec<TargetRecord>,
    #[serde(default)]
    pub page_meta: Option<PageMeta>,
}

/// One potency measurement row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BioactivityRecord {
    #[serde(default)]
    pub activity_id: Option<i64>,
    #[serde(default)]
    pub assay_chembl_id: Option<String>,
    #[serde(default)]
    pub assay_description: Option<String>,
    #[serde(default)]
    pub assay_type: Option<String>,
    pub molecule_chembl_id: String,
    #[serde(default)]
    pub standard_type: Option<String>,
    #[serde(default)]
    pub standard_units: Option<String>,
    #[serde(default)]
    pub standard_relation: Option<String>,
    /// The service serializes this as a string more often than a number.
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub standard_value: Option<f64>,
    #[serde(default)]
    pub target_chembl_id: Option<String>,
    #[serde(default)]
    pub target_organism: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitiesResponse {
    #[serde(default)]
    pub activities: Vec<BioactivityRecord>,
    #[serde(default)]
    pub page_meta: Option<PageMeta>,
}

/// Compound row with the structure block still nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub molecule_chembl_id: String,
    #[serde(default)]
    pub molecule_structures: Option<MoleculeStructures>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleculeStructures {
    #[serde(default)]
    pub canonical_smiles: Option<String>,
    #[serde(default)]
    pub standard_inchi_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoleculesResponse {
    #[serde(default)]
    pub molecules: Vec<CompoundRecord>,
    #[serde(default)]
    pub page_meta: Option<PageMeta>,
}

fn de_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
