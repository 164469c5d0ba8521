//! Hashed circular (Morgan-style) fingerprints.
//!
//! Per-atom invariants are iteratively mixed with neighbor invariants for
//! `radius` rounds; every round's invariant folds into a fixed-width bit
//! vector. Deterministic across runs, which the bulk export path relies on.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::smiles::{BondOrder, Molecule};

pub const DEFAULT_RADIUS: usize = 2;
pub const DEFAULT_N_BITS: usize = 1024;

/// A fixed-width bit vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    bits: Vec<u64>,
    n_bits: usize,
}

impl Fingerprint {
    pub fn zeros(n_bits: usize) -> Self {
        Self { bits: vec![0u64; n_bits.div_ceil(64)], n_bits }
    }

    pub fn len(&self) -> usize {
        self.n_bits
    }

    pub fn is_empty(&self) -> bool {
        self.n_bits == 0
    }

    pub fn set_bit(&mut self, i: usize) {
        self.bits[i / 64] |= 1u64 << (i % 64);
    }

    pub fn get_bit(&self, i: usize) -> bool {
        self.bits[i / 64] & (1u64 << (i % 64)) != 0
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of set bits, ascending.
    pub fn on_bits(&self) -> Vec<usize> {
        (0..self.n_bits).filter(|&i| self.get_bit(i)).collect()
    }

    /// Lowercase hex encoding, low word first. Stable across runs, suitable
    /// for tabular export.
    pub fn to_hex(&self) -> String {
        self.bits.iter().map(|w| format!("{:016x}", w)).collect()
    }
}

fn mix(values: &[u64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    values.hash(&mut hasher);
    hasher.finish()
}

fn bond_code(order: BondOrder) -> u64 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

/// Compute a hashed circular fingerprint for a molecule.
pub fn morgan_fingerprint(mol: &Molecule, radius: usize, n_bits: usize) -> Fingerprint {
    let mut fp = Fingerprint::zeros(n_bits);
    if n_bits == 0 || mol.atom_count() == 0 {
        return fp;
    }

    // round 0: atom-local invariants
    let mut invariants: Vec<u64> = (0..mol.atom_count())
        .map(|idx| {
            let atom = &mol.atoms()[idx];
            mix(&[
                atom.element.symbol().as_bytes().iter().map(|&b| b as u64).sum(),
                atom.aromatic as u64,
                atom.charge as u64,
                mol.degree(idx) as u64,
                mol.total_hydrogens(idx) as u64,
            ])
        })
        .collect();

    for inv in &invariants {
        fp.set_bit((inv % n_bits as u64) as usize);
    }

    for round in 1..=radius {
        let mut next = Vec::with_capacity(invariants.len());
        for idx in 0..mol.atom_count() {
            let mut env: Vec<u64> = mol
                .neighbors(idx)
                .iter()
                .map(|(n, bi)| {
                    let code = bond_code(mol.bonds()[*bi].order);
                    mix(&[code, invariants[*n]])
                })
                .collect();
            env.sort_unstable();

            let mut seed = vec![round as u64, invariants[idx]];
            seed.extend(env);
            next.push(mix(&seed));
        }
        invariants = next;
        for inv in &invariants {
            fp.set_bit((inv % n_bits as u64) as usize);
        }
    }

    fp
}

/// Tanimoto similarity between two fingerprints of equal width.
/// Two empty fingerprints compare as 0.0.
pub fn tanimoto_similarity(a: &Fingerprint, b: &Fingerprint) -> f64 {
    debug_assert_eq!(a.n_bits, b.n_bits);
    let mut intersection = 0usize;
    let mut union = 0usize;
    for (wa, wb) in a.bits.iter().zip(b.bits.iter()) {
        intersection += (wa & wb).count_ones() as usize;
        union += (wa | wb).count_ones() as usize;
    }
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

// ── Tests ─────────────────────────────────────────────────────────────────────
