//! Molecular descriptors over the parsed graph.
//!
//! Everything here is an estimate in the cheminformatics sense: the values
//! are computed from the SMILES graph alone (no 3D, no perception pass) and
//! follow the common counting conventions used by druglikeness filters.

use serde::Serialize;

use crate::error::ChemError;
use crate::smiles::{parse_smiles, BondOrder, Element, Molecule};

/// Descriptor set used by the druglikeness rules.
#[derive(Debug, Clone, Serialize)]
pub struct MolecularProperties {
    pub molecular_weight: f64,
    pub heavy_atoms: usize,
    pub hydrogen_bond_acceptors: usize,
    pub hydrogen_bond_donors: usize,
    pub rotatable_bonds: usize,
    pub logp: f64,
}

/// Parse a SMILES string and compute the full descriptor set.
pub fn properties_from_smiles(smiles: &str) -> Result<MolecularProperties, ChemError> {
    let mol = parse_smiles(smiles)?;
    Ok(compute_properties(&mol))
}

pub fn compute_properties(mol: &Molecule) -> MolecularProperties {
    MolecularProperties {
        molecular_weight: molecular_weight(mol),
        heavy_atoms: heavy_atom_count(mol),
        hydrogen_bond_acceptors: hydrogen_bond_acceptors(mol),
        hydrogen_bond_donors: hydrogen_bond_donors(mol),
        rotatable_bonds: rotatable_bond_count(mol),
        logp: logp_estimate(mol),
    }
}

/// Monoisotopic molecular weight in Daltons, including hydrogens.
pub fn molecular_weight(mol: &Molecule) -> f64 {
    let h_mass = Element::H.monoisotopic_mass();
    mol.atoms()
        .iter()
        .enumerate()
        .map(|(idx, atom)| {
            atom.element.monoisotopic_mass() + mol.attached_hydrogens(idx) as f64 * h_mass
        })
        .sum()
}

/// Non-hydrogen atom count.
pub fn heavy_atom_count(mol: &Molecule) -> usize {
    mol.atoms()
        .iter()
        .filter(|a| a.element != Element::H)
        .count()
}

/// Hydrogen-bond acceptors, Lipinski convention: every N and O counts.
pub fn hydrogen_bond_acceptors(mol: &Molecule) -> usize {
    mol.atoms()
        .iter()
        .filter(|a| matches!(a.element, Element::N | Element::O))
        .count()
}

/// Hydrogen-bond donors, Lipinski convention: N or O carrying at least one H.
pub fn hydrogen_bond_donors(mol: &Molecule) -> usize {
    mol.atoms()
        .iter()
        .enumerate()
        .filter(|(idx, a)| {
            matches!(a.element, Element::N | Element::O) && mol.total_hydrogens(*idx) > 0
        })
        .count()
}

/// Rotatable bonds: acyclic single bonds between heavy atoms, excluding
/// bonds to terminal atoms unless the terminal atom is a heteroatom
/// carrying hydrogen (a terminal hydroxyl or amine still rotates; a methyl
/// cap or halogen does not).
pub fn rotatable_bond_count(mol: &Molecule) -> usize {
    mol.bonds()
        .iter()
        .enumerate()
        .filter(|(bi, bond)| {
            bond.order == BondOrder::Single
                && mol.atoms()[bond.a].element != Element::H
                && mol.atoms()[bond.b].element != Element::H
                && !mol.is_ring_bond(*bi)
                && rotor_end(mol, bond.a)
                && rotor_end(mol, bond.b)
        })
        .count()
}

fn rotor_end(mol: &Molecule, idx: usize) -> bool {
    if mol.degree(idx) > 1 {
        return true;
    }
    mol.atoms()[idx].element.is_heteroatom() && mol.total_hydrogens(idx) > 0
}

// Crippen-style atom contributions, collapsed to element + aromaticity
// classes. Calibrated against common druglike molecules; good to roughly
// half a log unit, which is all the threshold filters need.
const LOGP_H_ON_CARBON: f64 = 0.10;
const LOGP_H_ON_HETERO: f64 = -0.30;

fn logp_atom_contribution(element: Element, aromatic: bool) -> f64 {
    match (element, aromatic) {
        (Element::C, true)   => 0.26,
        (Element::C, false)  => 0.12,
        (Element::N, true)   => -0.45,
        (Element::N, false)  => -0.55,
        (Element::O, true)   => -0.05,
        (Element::O, false)  => -0.32,
        (Element::S, true)   => 0.41,
        (Element::S, false)  => 0.40,
        (Element::P, _)      => -0.45,
        (Element::F, _)      => 0.20,
        (Element::Cl, _)     => 0.63,
        (Element::Br, _)     => 0.85,
        (Element::I, _)      => 1.10,
        (Element::B, _)      => -0.20,
        (Element::H, _)      => LOGP_H_ON_CARBON,
    }
}

/// Lipophilicity estimate (octanol/water logP) by summed atom contributions.
pub fn logp_estimate(mol: &Molecule) -> f64 {
    mol.atoms()
        .iter()
        .enumerate()
        .map(|(idx, atom)| {
            if atom.element == Element::H {
                // explicit graph hydrogens contribute like attached ones
                return LOGP_H_ON_CARBON;
            }
            let h = mol.attached_hydrogens(idx) as f64;
            let h_term = if atom.element == Element::C {
                h * LOGP_H_ON_CARBON
            } else {
                h * LOGP_H_ON_HETERO
            };
            logp_atom_contribution(atom.element, atom.aromatic) + h_term
        })
        .sum()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ethanol_descriptors() {
        let props = properties_from_smiles("CCO").unwrap();
        assert!((props.molecular_weight - 46.0419).abs() < 1e-3);
        assert_eq!(props.heavy_atoms, 3);
        assert_eq!(props.hydrogen_bond_acceptors, 1);
        assert_eq!(props.hydrogen_bond_donors, 1);
        assert_eq!(props.rotatable_bonds, 1);
        assert!(props.logp < 5.0);
    }

    #[test]
    fn test_water_molecular_weight() {
        let mol = parse_smiles("O").unwrap();
        let expected = 2.0 * 1.00782503223 + 15.99491461956;
        assert!((molecular_weight(&mol) - expected).abs() < 1e-8);
    }

    #[test]
    fn test_pentane_rotatable_bonds() {
        let props = properties_from_smiles("CCCCC").unwrap();
        assert_eq!(props.rotatable_bonds, 2);
        assert_eq!(props.hydrogen_bond_acceptors, 0);
        assert_eq!(props.hydrogen_bond_donors, 0);
    }

    #[test]
    fn test_benzene_descriptors() {
        let props = properties_from_smiles("c1ccccc1").unwrap();
        assert_eq!(props.heavy_atoms, 6);
        assert_eq!(props.rotatable_bonds, 0);
        assert!((props.molecular_weight - 78.0470).abs() < 1e-3);
    }

    #[test]
    fn test_toluene_has_no_rotors() {
        // terminal methyl on a ring does not count
        let props = properties_from_smiles("Cc1ccccc1").unwrap();
        assert_eq!(props.rotatable_bonds, 0);
    }

    #[test]
    fn test_aspirin_descriptors() {
        let props = properties_from_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        assert_eq!(props.heavy_atoms, 13);
        assert_eq!(props.hydrogen_bond_acceptors, 4);
        assert_eq!(props.hydrogen_bond_donors, 1);
        assert!((props.molecular_weight - 180.0423).abs() < 1e-3);
    }

    #[test]
    fn test_ibuprofen_descriptors() {
        let props = properties_from_smiles("CC(C)Cc1ccc(cc1)C(C)C(=O)O").unwrap();
        assert_eq!(props.heavy_atoms, 15);
        assert!((props.molecular_weight - 206.1307).abs() < 1e-3);
        assert_eq!(props.hydrogen_bond_acceptors, 2);
        assert_eq!(props.hydrogen_bond_donors, 1);
        assert!(props.logp > -2.0 && props.logp < 5.0);
        assert!(props.rotatable_bonds <= 8);
    }

    #[test]
    fn test_halogen_is_not_a_rotor_anchor() {
        // chloroethane: only the C-C bond is terminal-capped, C-Cl too
        let props = properties_from_smiles("CCCl").unwrap();
        assert_eq!(props.rotatable_bonds, 0);
    }
}
