//! Bioactivity data-request pipeline.
//!
//! Orchestrates the full flow for one target accession:
//!   1. Resolve the accession to a bioactivity-database target id
//!   2. Fetch raw potency measurements for that target
//!   3. Clean the measurements (complete IC50 rows, one per compound)
//!   4. Fetch compound rows for the surviving ids
//!   5. Extract structure strings, dropping compounds without one
//!   6. Join measurements with structures on compound id
//!   7. Normalize potency to pIC50 and sort, most potent first
//!   8. Return the final table
//!
//! An empty answer at stage 2 ends the run early with an empty table.
//! Remote failures at stages 1, 2, and 4 abort the run with an error naming
//! the stage; the transforms in between are local and cannot fail.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use affinyx_chem::pic50_from_raw;
use affinyx_chembl::{BioactivityRecord, CompoundRecord};
use affinyx_common::AffinyxError;

use crate::models::{CompoundActivity, CompoundStructure, PotencyMeasurement};
use crate::source::BioactivitySource;

// ── Stages ────────────────────────────────────────────────────────────────────

/// The linear stage sequence. Stages never run out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    ResolveId,
    FetchBioactivity,
    CleanBioactivity,
    FetchCompounds,
    CleanCompounds,
    Merge,
    ConvertPotency,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolveId        => "resolve_id",
            Self::FetchBioactivity => "fetch_bioactivity",
            Self::CleanBioactivity => "clean_bioactivity",
            Self::FetchCompounds   => "fetch_compounds",
            Self::CleanCompounds   => "clean_compounds",
            Self::Merge            => "merge",
            Self::ConvertPotency   => "convert_potency",
            Self::Done             => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote failure tagged with the stage where it surfaced.
#[derive(Debug, Error)]
#[error("pipeline stage '{stage}' failed: {source}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub source: AffinyxError,
}

impl PipelineError {
    fn at(stage: PipelineStage, source: AffinyxError) -> Self {
        Self { stage, source }
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Drives one accession through the full request flow. The instance holds
/// only the accession; every run is independent and stateless.
pub struct BioactivityPipeline {
    uniprot_id: String,
}

impl BioactivityPipeline {
    pub fn new(uniprot_id: impl Into<String>) -> Self {
        Self {
            uniprot_id: uniprot_id.into(),
        }
    }

    pub fn uniprot_id(&self) -> &str {
        &self.uniprot_id
    }

    #[instrument(skip(self, source), fields(uniprot_id = %self.uniprot_id))]
    pub async fn run<S>(&self, source: &S) -> Result<Vec<CompoundActivity>, PipelineError>
    where
        S: BioactivitySource + Sync,
    {
        // ── 1. Resolve the target id ──────────────────────────────────────────
        let target_id = source
            .resolve_target_id(&self.uniprot_id)
            .await
            .map_err(|err| PipelineError::at(PipelineStage::ResolveId, err))?;
        info!(target_id = %target_id, "Target resolved");

        // ── 2. Fetch raw measurements ─────────────────────────────────────────
        let raw_activities = source
            .bioactivities(&target_id)
            .await
            .map_err(|err| PipelineError::at(PipelineStage::FetchBioactivity, err))?;
        if raw_activities.is_empty() {
            info!("No measurements returned, finishing early with an empty table");
            return Ok(Vec::new());
        }
        debug!(rows = raw_activities.len(), "Measurements fetched");

        // ── 3. Clean measurements ─────────────────────────────────────────────
        let measurements = clean_bioactivities(raw_activities);
        debug!(rows = measurements.len(), "Measurements cleaned");

        // ── 4. Fetch compounds for the surviving ids ──────────────────────────
        let compound_ids: Vec<String> = measurements
            .iter()
            .map(|m| m.molecule_chembl_id.clone())
            .collect();
        let raw_compounds = source
            .compounds(&compound_ids)
            .await
            .map_err(|err| PipelineError::at(PipelineStage::FetchCompounds, err))?;
        debug!(rows = raw_compounds.len(), "Compounds fetched");

        // ── 5. Extract structures ─────────────────────────────────────────────
        let structures = clean_compounds(raw_compounds);
        debug!(rows = structures.len(), "Structures extracted");

        // ── 6–7. Join and normalize ───────────────────────────────────────────
        let table = convert_potencies(merge_records(measurements, structures));
        info!(rows = table.len(), "Pipeline complete");
        Ok(table)
    }
}

// ── Local transforms ──────────────────────────────────────────────────────────

/// Stage 3: keep complete IC50 rows, first measurement per compound.
fn clean_bioactivities(records: Vec<BioactivityRecord>) -> Vec<PotencyMeasurement> {
    let mut seen = HashSet::new();
    let mut measurements = Vec::new();

    for record in records {
        if record.standard_type.as_deref() != Some("IC50") {
            continue;
        }
        let BioactivityRecord {
            molecule_chembl_id,
            standard_value,
            standard_units,
            ..
        } = record;
        let (Some(ic50), Some(units)) = (standard_value, standard_units) else {
            continue;
        };
        if !seen.insert(molecule_chembl_id.clone()) {
            continue;
        }
        measurements.push(PotencyMeasurement {
            molecule_chembl_id,
            ic50,
            units,
        });
    }
    measurements
}

/// Stage 5: pull the canonical structure string out of the nested block.
fn clean_compounds(records: Vec<CompoundRecord>) -> Vec<CompoundStructure> {
    let mut seen = HashSet::new();
    let mut structures = Vec::new();

    for record in records {
        let Some(smiles) = record.molecule_structures.and_then(|s| s.canonical_smiles) else {
            continue;
        };
        if smiles.trim().is_empty() {
            continue;
        }
        if !seen.insert(record.molecule_chembl_id.clone()) {
            continue;
        }
        structures.push(CompoundStructure {
            molecule_chembl_id: record.molecule_chembl_id,
            smiles,
        });
    }
    structures
}

/// Stage 6: inner join on compound id, measurement order preserved.
fn merge_records(
    measurements: Vec<PotencyMeasurement>,
    structures: Vec<CompoundStructure>,
) -> Vec<(PotencyMeasurement, String)> {
    let by_id: HashMap<String, String> = structures
        .into_iter()
        .map(|s| (s.molecule_chembl_id, s.smiles))
        .collect();

    measurements
        .into_iter()
        .filter_map(|measurement| {
            by_id
                .get(&measurement.molecule_chembl_id)
                .cloned()
                .map(|smiles| (measurement, smiles))
        })
        .collect()
}

/// Stage 7: normalize to pIC50 and sort, most potent first. Unconvertible
/// rows keep a `None` marker and sink below every convertible row.
fn convert_potencies(rows: Vec<(PotencyMeasurement, String)>) -> Vec<CompoundActivity> {
    let mut table: Vec<CompoundActivity> = rows
        .into_iter()
        .map(|(measurement, smiles)| {
            let pic50 = match pic50_from_raw(measurement.ic50, &measurement.units) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(
                        molecule = %measurement.molecule_chembl_id,
                        error = %err,
                        "Unconvertible potency, marking row invalid"
                    );
                    None
                }
            };
            CompoundActivity {
                molecule_chembl_id: measurement.molecule_chembl_id,
                smiles,
                ic50: measurement.ic50,
                units: measurement.units,
                pic50,
            }
        })
        .collect();

    table.sort_by(|a, b| match (a.pic50, b.pic50) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None)    => Ordering::Less,
        (None, Some(_))    => Ordering::Greater,
        (None, None)       => Ordering::Equal,
    });
    table
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use affinyx_chembl::MoleculeStructures;
    use async_trait::async_trait;

    fn activity(molecule: &str, value: Option<f64>, units: Option<&str>) -> BioactivityRecord {
        BioactivityRecord {
            activity_id: None,
            assay_chembl_id: None,
            assay_description: None,
            assay_type: Some("B".to_string()),
            molecule_chembl_id: molecule.to_string(),
            standard_type: Some("IC50".to_string()),
            standard_units: units.map(str::to_string),
            standard_relation: Some("=".to_string()),
            standard_value: value,
            target_chembl_id: Some("CHEMBL240".to_string()),
            target_organism: Some("Homo sapiens".to_string()),
        }
    }

    fn compound(molecule: &str, smiles: Option<&str>) -> CompoundRecord {
        CompoundRecord {
            molecule_chembl_id: molecule.to_string(),
            molecule_structures: smiles.map(|s| MoleculeStructures {
                canonical_smiles: Some(s.to_string()),
                standard_inchi_key: None,
            }),
        }
    }

    struct MockSource {
        activities: Vec<BioactivityRecord>,
        compounds: Vec<CompoundRecord>,
        fail_resolve: bool,
        fail_compounds: bool,
        bioactivity_calls: AtomicUsize,
        compound_calls: AtomicUsize,
    }

    impl MockSource {
        fn new(activities: Vec<BioactivityRecord>, compounds: Vec<CompoundRecord>) -> Self {
            Self {
                activities,
                compounds,
                fail_resolve: false,
                fail_compounds: false,
                bioactivity_calls: AtomicUsize::new(0),
                compound_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BioactivitySource for MockSource {
        async fn resolve_target_id(&self, uniprot_id: &str) -> affinyx_common::Result<String> {
            if self.fail_resolve {
                return Err(AffinyxError::NotFound(format!(
                    "no targets found for UniProt accession '{uniprot_id}'"
                )));
            }
            Ok("CHEMBL240".to_string())
        }

        async fn bioactivities(
            &self,
            _target: &str,
        ) -> affinyx_common::Result<Vec<BioactivityRecord>> {
            self.bioactivity_calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(self.activities.clone())
        }

        async fn compounds(&self, _ids: &[String]) -> affinyx_common::Result<Vec<CompoundRecord>> {
            self.compound_calls.fetch_add(1, AtomicOrdering::SeqCst);
            if self.fail_compounds {
                return Err(AffinyxError::InvalidInput("simulated outage".to_string()));
            }
            Ok(self.compounds.clone())
        }
    }

    #[tokio::test]
    async fn test_full_run_merges_and_sorts_by_potency() {
        let source = MockSource::new(
            vec![
                activity("CHEMBL939", Some(1.0), Some("µM")),
                activity("CHEMBL1201496", Some(1.0), Some("nM")),
                activity("CHEMBL553", Some(5.0), Some("zeptomolar")),
            ],
            vec![
                compound("CHEMBL939", Some("CCO")),
                compound("CHEMBL1201496", Some("c1ccccc1")),
                compound("CHEMBL553", Some("CCN")),
            ],
        );

        let table = BioactivityPipeline::new("P00533").run(&source).await.unwrap();

        let ids: Vec<&str> = table.iter().map(|r| r.molecule_chembl_id.as_str()).collect();
        assert_eq!(ids, vec!["CHEMBL1201496", "CHEMBL939", "CHEMBL553"]);
        assert_eq!(table[0].pic50, Some(9.0));
        assert_eq!(table[1].pic50, Some(6.0));
        assert_eq!(table[2].pic50, None);
        assert_eq!(table[0].smiles, "c1ccccc1");
    }

    #[tokio::test]
    async fn test_empty_fetch_short_circuits_before_compounds() {
        let source = MockSource::new(Vec::new(), Vec::new());
        let table = BioactivityPipeline::new("P00533").run(&source).await.unwrap();

        assert!(table.is_empty());
        assert_eq!(source.bioactivity_calls.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(source.compound_calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_failure_names_its_stage() {
        let mut source = MockSource::new(Vec::new(), Vec::new());
        source.fail_resolve = true;

        let err = BioactivityPipeline::new("P00000").run(&source).await.unwrap_err();
        assert_eq!(err.stage, PipelineStage::ResolveId);
        assert!(err.to_string().contains("resolve_id"));
        assert_eq!(source.bioactivity_calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compound_fetch_failure_names_its_stage() {
        let mut source = MockSource::new(
            vec![activity("CHEMBL939", Some(50.0), Some("nM"))],
            Vec::new(),
        );
        source.fail_compounds = true;

        let err = BioactivityPipeline::new("P00533").run(&source).await.unwrap_err();
        assert_eq!(err.stage, PipelineStage::FetchCompounds);
    }

    #[test]
    fn test_clean_drops_incomplete_and_duplicate_rows() {
        let cleaned = clean_bioactivities(vec![
            activity("CHEMBL1", Some(10.0), Some("nM")),
            activity("CHEMBL1", Some(99.0), Some("nM")),
            activity("CHEMBL2", None, Some("nM")),
            activity("CHEMBL3", Some(3.0), None),
            {
                let mut kd = activity("CHEMBL4", Some(1.0), Some("nM"));
                kd.standard_type = Some("Kd".to_string());
                kd
            },
        ]);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].molecule_chembl_id, "CHEMBL1");
        assert_eq!(cleaned[0].ic50, 10.0);
    }

    #[test]
    fn test_clean_compounds_requires_a_structure() {
        let cleaned = clean_compounds(vec![
            compound("CHEMBL1", Some("CCO")),
            compound("CHEMBL2", None),
            CompoundRecord {
                molecule_chembl_id: "CHEMBL3".to_string(),
                molecule_structures: Some(MoleculeStructures {
                    canonical_smiles: None,
                    standard_inchi_key: Some("XGALLCUGACUPHD-UHFFFAOYSA-N".to_string()),
                }),
            },
        ]);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].smiles, "CCO");
    }

    #[test]
    fn test_merge_is_an_inner_join_in_measurement_order() {
        let measurements = vec![
            PotencyMeasurement {
                molecule_chembl_id: "CHEMBL1".to_string(),
                ic50: 10.0,
                units: "nM".to_string(),
            },
            PotencyMeasurement {
                molecule_chembl_id: "CHEMBL2".to_string(),
                ic50: 20.0,
                units: "nM".to_string(),
            },
        ];
        let structures = vec![CompoundStructure {
            molecule_chembl_id: "CHEMBL2".to_string(),
            smiles: "CCN".to_string(),
        }];

        let merged = merge_records(measurements, structures);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].0.molecule_chembl_id, "CHEMBL2");
        assert_eq!(merged[0].1, "CCN");
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(PipelineStage::ResolveId.as_str(), "resolve_id");
        assert_eq!(PipelineStage::ConvertPotency.to_string(), "convert_potency");
    }
}
