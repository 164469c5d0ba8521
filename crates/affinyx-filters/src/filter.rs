//! Batch compound filtering with per-row fault isolation.
//!
//! A [`CompoundFilter`] holds named rules and splits a batch into rows that
//! satisfy every rule and rows that do not. Every rule runs for every row;
//! a rule error is caught and counted as a failure of that rule for that
//! row, so one malformed structure cannot abort the batch.

use tracing::debug;

use affinyx_chem::ChemError;
use affinyx_common::{AffinyxError, Result};

use crate::rules::{ro5_properties, soft_reos_properties};

/// Row types that expose the structure string the rules evaluate.
pub trait MoleculeRecord {
    fn smiles(&self) -> &str;
}

impl MoleculeRecord for String {
    fn smiles(&self) -> &str {
        self
    }
}

impl MoleculeRecord for &str {
    fn smiles(&self) -> &str {
        self
    }
}

type RuleFn = Box<dyn Fn(&str) -> std::result::Result<bool, ChemError> + Send + Sync>;

struct FilterRule {
    name: String,
    eval: RuleFn,
}

/// A non-compliant row plus the names of every rule it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation<R> {
    pub record: R,
    pub violations: Vec<String>,
}

impl<R> Violation<R> {
    /// Violation names joined for tabular output.
    pub fn reason(&self) -> String {
        self.violations.join(", ")
    }
}

/// Ordered collection of named drug-likeness rules.
#[derive(Default)]
pub struct CompoundFilter {
    rules: Vec<FilterRule>,
}

impl CompoundFilter {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rule of five and soft REOS preloaded, in that order.
    pub fn with_default_rules() -> Self {
        let mut filter = Self::new();
        filter.rules.push(FilterRule {
            name: "Lipinski rule of five".to_string(),
            eval: Box::new(|smiles| Ok(ro5_properties(smiles)?.fulfilled)),
        });
        filter.rules.push(FilterRule {
            name: "soft REOS".to_string(),
            eval: Box::new(|smiles| Ok(soft_reos_properties(smiles)?.fulfilled)),
        });
        filter
    }

    /// Adds a named rule. Rules run in registration order; names must be
    /// non-blank and unique.
    pub fn register<F>(&mut self, name: &str, rule: F) -> Result<()>
    where
        F: Fn(&str) -> std::result::Result<bool, ChemError> + Send + Sync + 'static,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(AffinyxError::InvalidInput(
                "rule name must be a non-empty string".to_string(),
            ));
        }
        if self.rules.iter().any(|rule| rule.name == name) {
            return Err(AffinyxError::InvalidInput(format!(
                "a rule named '{name}' is already registered"
            )));
        }

        self.rules.push(FilterRule {
            name: name.to_string(),
            eval: Box::new(rule),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Splits a batch into compliant rows and violations, preserving input
    /// order within both outputs.
    ///
    /// A row is compliant only if every rule reports compliance. Rules that
    /// fail with an error are recorded as `"name: message"` entries.
    pub fn partition<R>(&self, records: &[R]) -> (Vec<R>, Vec<Violation<R>>)
    where
        R: MoleculeRecord + Clone,
    {
        let mut compliant = Vec::new();
        let mut violated = Vec::new();

        for record in records {
            let mut violations = Vec::new();
            for rule in &self.rules {
                match (rule.eval)(record.smiles()) {
                    Ok(true) => {}
                    Ok(false) => violations.push(rule.name.clone()),
                    Err(err) => violations.push(format!("{}: {}", rule.name, err)),
                }
            }
            if violations.is_empty() {
                compliant.push(record.clone());
            } else {
                violated.push(Violation {
                    record: record.clone(),
                    violations,
                });
            }
        }

        debug!(
            compliant = compliant.len(),
            violated = violated.len(),
            rules = self.rules.len(),
            "Batch filtered"
        );
        (compliant, violated)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
