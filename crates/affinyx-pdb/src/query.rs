//! Field-based search criteria for the structural database.
//!
//! Each constructor validates one searchable field and produces an opaque
//! criterion. Criteria are intersected by
//! [`RcsbClient::search`](crate::client::RcsbClient::search).

use affinyx_common::{AffinyxError, Result};
use chrono::NaiveDate;
use serde_json::{json, Value};

const ATTR_UNIPROT: &str = "rcsb_polymer_entity_container_identifiers.\
                            reference_sequence_identifiers.database_accession";
const ATTR_DEPOSIT_DATE: &str = "rcsb_accession_info.deposit_date";
const ATTR_EXPERIMENTAL_METHOD: &str = "exptl.method";
const ATTR_RESOLUTION: &str = "rcsb_entry_info.resolution_combined";
const ATTR_CHAIN_COUNT: &str = "rcsb_entry_info.deposited_polymer_entity_instance_count";
const ATTR_LIGAND_WEIGHT: &str = "chem_comp.formula_weight";

/// One search criterion against a single attribute.
///
/// Criteria on chemical-component attributes are routed to the chemical
/// text service instead of the entry text service.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldQuery {
    attribute: &'static str,
    operator: &'static str,
    value: Value,
    chemical: bool,
}

impl FieldQuery {
    /// Entries whose polymer entities reference a UniProt accession.
    pub fn uniprot_id(accession: &str) -> Result<Self> {
        let accession = accession.trim();
        if accession.is_empty() {
            return Err(AffinyxError::InvalidInput(
                "UniProt accession must be a non-empty string".to_string(),
            ));
        }
        Ok(Self {
            attribute: ATTR_UNIPROT,
            operator:  "exact_match",
            value:     json!(accession),
            chemical:  false,
        })
    }

    /// Entries deposited strictly before the given `YYYY-MM-DD` date.
    pub fn max_deposition_date(date: &str) -> Result<Self> {
        let date = date.trim();
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(AffinyxError::InvalidInput(format!(
                "deposition date '{date}' must be a valid YYYY-MM-DD date"
            )));
        }
        Ok(Self {
            attribute: ATTR_DEPOSIT_DATE,
            operator:  "less",
            value:     json!(date),
            chemical:  false,
        })
    }

    /// Entries solved with the given experimental method, e.g.
    /// `"X-RAY DIFFRACTION"`.
    pub fn experimental_method(method: &str) -> Result<Self> {
        let method = method.trim();
        if method.is_empty() {
            return Err(AffinyxError::InvalidInput(
                "experimental method must be a non-empty string".to_string(),
            ));
        }
        Ok(Self {
            attribute: ATTR_EXPERIMENTAL_METHOD,
            operator:  "exact_match",
            value:     json!(method),
            chemical:  false,
        })
    }

    /// Entries at or below a resolution ceiling in angstroms.
    pub fn max_resolution(max_resolution: f64) -> Result<Self> {
        if !(max_resolution > 0.0) {
            return Err(AffinyxError::InvalidInput(format!(
                "resolution ceiling must be a positive number, got {max_resolution}"
            )));
        }
        Ok(Self {
            attribute: ATTR_RESOLUTION,
            operator:  "less_or_equal",
            value:     json!(max_resolution),
            chemical:  false,
        })
    }

    /// Entries with exactly this many deposited polymer chains. The type
    /// already rules out negative counts, so construction cannot fail.
    pub fn polymer_chain_count(chain_count: u32) -> Self {
        Self {
            attribute: ATTR_CHAIN_COUNT,
            operator:  "equals",
            value:     json!(chain_count),
            chemical:  false,
        }
    }

    /// Entries containing a chemical component above a weight floor.
    pub fn min_ligand_weight(min_weight: f64) -> Result<Self> {
        if !(min_weight > 0.0) {
            return Err(AffinyxError::InvalidInput(format!(
                "ligand weight floor must be a positive number, got {min_weight}"
            )));
        }
        Ok(Self {
            attribute: ATTR_LIGAND_WEIGHT,
            operator:  "greater",
            value:     json!(min_weight),
            chemical:  true,
        })
    }

    /// Terminal node in the search service wire format.
    pub(crate) fn to_node(&self) -> Value {
        let service = if self.chemical { "text_chem" } else { "text" };
        json!({
            "type": "terminal",
            "service": service,
            "parameters": {
                "attribute": self.attribute,
                "operator": self.operator,
                "value": self.value,
            }
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_uniprot_query_node() {
        let query = FieldQuery::uniprot_id("P00533").unwrap();
        assert_eq!(
            query.to_node(),
            json!({
                "type": "terminal",
                "service": "text",
                "parameters": {
                    "attribute": "rcsb_polymer_entity_container_identifiers.\
                                  reference_sequence_identifiers.database_accession",
                    "operator": "exact_match",
                    "value": "P00533",
                }
            })
        );
    }

    #[test]
    fn test_blank_uniprot_is_rejected() {
        let err = FieldQuery::uniprot_id("   ").unwrap_err();
        assert!(matches!(err, AffinyxError::InvalidInput(_)));
    }

    #[test]
    fn test_deposition_date_requires_iso_format() {
        assert!(FieldQuery::max_deposition_date("2020-01-01").is_ok());
        assert!(FieldQuery::max_deposition_date("  2020-01-01  ").is_ok());
        assert!(FieldQuery::max_deposition_date("").is_err());
        assert!(FieldQuery::max_deposition_date("01/01/2020").is_err());
        assert!(FieldQuery::max_deposition_date("2020-13-01").is_err());
    }

    #[test]
    fn test_deposition_date_uses_less_operator() {
        let node = FieldQuery::max_deposition_date("2020-01-01").unwrap().to_node();
        assert_eq!(node["parameters"]["operator"], "less");
        assert_eq!(node["parameters"]["value"], "2020-01-01");
    }

    #[test]
    fn test_resolution_must_be_positive() {
        assert!(FieldQuery::max_resolution(2.0).is_ok());
        assert!(FieldQuery::max_resolution(0.0).is_err());
        assert!(FieldQuery::max_resolution(-1.5).is_err());
        assert!(FieldQuery::max_resolution(f64::NAN).is_err());
    }

    #[test]
    fn test_chain_count_node() {
        let node = FieldQuery::polymer_chain_count(4).to_node();
        assert_eq!(node["parameters"]["operator"], "equals");
        assert_eq!(node["parameters"]["value"], 4);
    }

    #[test]
    fn test_ligand_weight_uses_chemical_service() {
        let node = FieldQuery::min_ligand_weight(300.0).unwrap().to_node();
        assert_eq!(node["service"], "text_chem");
        assert_eq!(node["parameters"]["operator"], "greater");
        assert!(FieldQuery::min_ligand_weight(0.0).is_err());
    }
}
