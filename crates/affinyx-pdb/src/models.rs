//! Wire records for structural search and ligand lookups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub result_set: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    pub identifier: String,
}

/// One non-polymer chemical component of a structural entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LigandRecord {
    pub component_id: String,
    pub name: Option<String>,
    pub formula: Option<String>,
    pub formula_weight: Option<f64>,
    pub smiles: Option<String>,
    pub smiles_stereo: Option<String>,
    pub inchi: Option<String>,
    pub inchi_key: Option<String>,
}

// Response shape of the ligand catalog query against the GraphQL endpoint.

#[derive(Debug, Deserialize)]
pub(crate) struct LigandResponse {
    pub data: Option<LigandData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LigandData {
    pub entry: Option<LigandEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LigandEntry {
    #[serde(default)]
    pub nonpolymer_entities: Option<Vec<NonpolymerEntity>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NonpolymerEntity {
    pub nonpolymer_comp: Option<NonpolymerComp>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NonpolymerComp {
    pub chem_comp: Option<ChemComp>,
    pub rcsb_chem_comp_descriptor: Option<ChemCompDescriptor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChemComp {
    pub id: String,
    pub name: Option<String>,
    pub formula: Option<String>,
    pub formula_weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChemCompDescriptor {
    #[serde(rename = "SMILES")]
    pub smiles: Option<String>,
    #[serde(rename = "SMILES_stereo")]
    pub smiles_stereo: Option<String>,
    #[serde(rename = "InChI")]
    pub inchi: Option<String>,
    #[serde(rename = "InChIKey")]
    pub inchi_key: Option<String>,
}

impl LigandEntry {
    /// Flattens the nested response into a component-id keyed map.
    /// Components the service returns without an id block are dropped.
    pub(crate) fn into_ligand_map(self) -> HashMap<String, LigandRecord> {
        let mut ligands = HashMap::new();
        for entity in self.nonpolymer_entities.unwrap_or_default() {
            let Some(comp) = entity.nonpolymer_comp else {
                continue;
            };
            let Some(chem) = comp.chem_comp else {
                warn!("Skipping non-polymer component without a chem_comp block");
                continue;
            };
            let descriptor = comp.rcsb_chem_comp_descriptor;
            let record = LigandRecord {
                component_id:   chem.id.clone(),
                name:           chem.name,
                formula:        chem.formula,
                formula_weight: chem.formula_weight,
                smiles:         descriptor.as_ref().and_then(|d| d.smiles.clone()),
                smiles_stereo:  descriptor.as_ref().and_then(|d| d.smiles_stereo.clone()),
                inchi:          descriptor.as_ref().and_then(|d| d.inchi.clone()),
                inchi_key:      descriptor.and_then(|d| d.inchi_key),
            };
            ligands.insert(chem.id, record);
        }
        ligands
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
