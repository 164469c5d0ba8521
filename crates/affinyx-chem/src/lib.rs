//! affinyx-chem — Internal chemistry kernel for the Affinyx workspace.
//!
//! Lightweight, dependency-free routines for the small amount of chemistry
//! the toolkit needs: a SMILES subset parser, the descriptor set consumed by
//! the druglikeness filters, potency-unit conversion, and hashed circular
//! fingerprints. This is deliberately not a general cheminformatics toolkit;
//! it computes exactly what the property rules ask for.
//!
//! | Module         | Provides                                             |
//! |----------------|------------------------------------------------------|
//! | `smiles`       | `parse_smiles` → molecular graph                     |
//! | `descriptors`  | MW, HBA, HBD, heavy atoms, rotatable bonds, logP     |
//! | `units`        | `ConcentrationUnit`, IC50 → pIC50                    |
//! | `fingerprint`  | Morgan-style hashed fingerprints, Tanimoto           |

pub mod descriptors;
pub mod error;
pub mod fingerprint;
pub mod smiles;
pub mod units;

pub use descriptors::{compute_properties, properties_from_smiles, MolecularProperties};
pub use error::ChemError;
pub use fingerprint::{
    morgan_fingerprint, tanimoto_similarity, Fingerprint, DEFAULT_N_BITS, DEFAULT_RADIUS,
};
pub use smiles::{parse_smiles, Molecule};
pub use units::{ic50_to_pic50, pic50_from_raw, ConcentrationUnit};
