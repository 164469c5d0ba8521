//! Drug-likeness property rules.
//!
//! Both rules compute a descriptor panel and a single `fulfilled` verdict:
//!
//! | Rule        | Compliance                                             |
//! |-------------|--------------------------------------------------------|
//! | Rule of five | at least 3 of the 4 Lipinski thresholds hold          |
//! | Soft REOS   | every band holds                                       |

use serde::Serialize;

use affinyx_chem::{properties_from_smiles, ChemError};

/// Lipinski descriptor panel for one molecule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ro5Properties {
    pub molecular_weight: f64,
    pub hydrogen_bond_acceptors: usize,
    pub hydrogen_bond_donors: usize,
    pub logp: f64,
    pub fulfilled: bool,
}

/// Tests a molecule against Lipinski's rule of five.
///
/// Thresholds: weight <= 500, acceptors <= 10, donors <= 5, logP <= 5.
/// One violation is tolerated; compliance needs at least 3 of 4.
pub fn ro5_properties(smiles: &str) -> Result<Ro5Properties, ChemError> {
    let props = properties_from_smiles(smiles)?;
    let conditions = [
        props.molecular_weight <= 500.0,
        props.hydrogen_bond_acceptors <= 10,
        props.hydrogen_bond_donors <= 5,
        props.logp <= 5.0,
    ];
    let satisfied = conditions.iter().filter(|&&met| met).count();

    Ok(Ro5Properties {
        molecular_weight: props.molecular_weight,
        hydrogen_bond_acceptors: props.hydrogen_bond_acceptors,
        hydrogen_bond_donors: props.hydrogen_bond_donors,
        logp: props.logp,
        fulfilled: satisfied >= 3,
    })
}

/// Softened-REOS descriptor panel for one molecule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftReosProperties {
    pub molecular_weight: f64,
    pub heavy_atoms: usize,
    pub rotatable_bonds: usize,
    pub hydrogen_bond_acceptors: usize,
    pub hydrogen_bond_donors: usize,
    pub logp: f64,
    pub fulfilled: bool,
}

/// Tests a molecule against a softened REOS band set.
///
/// Bands: weight 200..=500, heavy atoms 15..=50, rotatable bonds 0..=8,
/// acceptors 0..=10, donors 0..=5, logP -2..=5. All bands must hold.
pub fn soft_reos_properties(smiles: &str) -> Result<SoftReosProperties, ChemError> {
    let props = properties_from_smiles(smiles)?;
    let conditions = [
        (200.0..=500.0).contains(&props.molecular_weight),
        (15..=50).contains(&props.heavy_atoms),
        props.rotatable_bonds <= 8,
        props.hydrogen_bond_acceptors <= 10,
        props.hydrogen_bond_donors <= 5,
        (-2.0..=5.0).contains(&props.logp),
    ];

    Ok(SoftReosProperties {
        molecular_weight: props.molecular_weight,
        heavy_atoms: props.heavy_atoms,
        rotatable_bonds: props.rotatable_bonds,
        hydrogen_bond_acceptors: props.hydrogen_bond_acceptors,
        hydrogen_bond_donors: props.hydrogen_bond_donors,
        logp: props.logp,
        fulfilled: conditions.iter().all(|&met| met),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
