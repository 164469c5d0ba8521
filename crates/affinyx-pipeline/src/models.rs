//! Row types flowing through the request pipeline.

use serde::Serialize;

/// One cleaned potency measurement, a single row per compound.
#[derive(Debug, Clone, PartialEq)]
pub struct PotencyMeasurement {
    pub molecule_chembl_id: String,
    pub ic50: f64,
    pub units: String,
}

/// One cleaned compound with its structure string extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundStructure {
    pub molecule_chembl_id: String,
    pub smiles: String,
}

/// Final pipeline row: measurement joined with structure, potency
/// normalized. `pic50` is `None` when the row's value or unit could not
/// be converted; such rows sort after every convertible row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundActivity {
    pub molecule_chembl_id: String,
    pub smiles: String,
    pub ic50: f64,
    pub units: String,
    pub pic50: Option<f64>,
}

impl affinyx_filters::MoleculeRecord for CompoundActivity {
    fn smiles(&self) -> &str {
        &self.smiles
    }
}
