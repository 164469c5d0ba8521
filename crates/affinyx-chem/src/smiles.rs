//! SMILES subset parser producing a molecular graph.
//!
//! Covers the notation that occurs in canonical structure strings from the
//! bioactivity database: organic-subset atoms, aromatic lowercase forms,
//! bracket atoms with isotope/charge/H-count, branches, ring closures
//! (including `%nn`), disconnected components (`.`), and directional bond
//! markers (`/`, `\`, parsed as single bonds — stereochemistry is ignored).
//! Anything else fails with a parse error naming the offending input.

use std::collections::HashMap;

use crate::error::ChemError;

// ── Elements ──────────────────────────────────────────────────────────────────

/// Elements the kernel knows masses and valences for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    P,
    S,
    Cl,
    Br,
    I,
}

impl Element {
    pub fn from_symbol(sym: &str) -> Option<Element> {
        match sym {
            "H"  => Some(Element::H),
            "B"  => Some(Element::B),
            "C"  => Some(Element::C),
            "N"  => Some(Element::N),
            "O"  => Some(Element::O),
            "F"  => Some(Element::F),
            "P"  => Some(Element::P),
            "S"  => Some(Element::S),
            "Cl" => Some(Element::Cl),
            "Br" => Some(Element::Br),
            "I"  => Some(Element::I),
            _    => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H  => "H",
            Element::B  => "B",
            Element::C  => "C",
            Element::N  => "N",
            Element::O  => "O",
            Element::F  => "F",
            Element::P  => "P",
            Element::S  => "S",
            Element::Cl => "Cl",
            Element::Br => "Br",
            Element::I  => "I",
        }
    }

    /// Monoisotopic mass in Daltons. Isotope labels in the input are ignored.
    pub fn monoisotopic_mass(&self) -> f64 {
        match self {
            Element::H  => 1.00782503223,
            Element::B  => 11.00930536,
            Element::C  => 12.0,
            Element::N  => 14.00307400443,
            Element::O  => 15.99491461956,
            Element::F  => 18.998403163,
            Element::P  => 30.97376199842,
            Element::S  => 31.9720711744,
            Element::Cl => 34.968852682,
            Element::Br => 78.9183376,
            Element::I  => 126.90447,
        }
    }

    /// Default valence used for implicit-hydrogen counting on
    /// organic-subset atoms.
    fn default_valence(&self) -> u8 {
        match self {
            Element::H => 1,
            Element::B => 3,
            Element::C => 4,
            Element::N => 3,
            Element::O => 2,
            Element::F => 1,
            Element::P => 3,
            Element::S => 2,
            Element::Cl => 1,
            Element::Br => 1,
            Element::I => 1,
        }
    }

    pub fn is_heteroatom(&self) -> bool {
        !matches!(self, Element::C | Element::H)
    }
}

// ── Graph types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Atom {
    pub element: Element,
    pub aromatic: bool,
    pub charge: i8,
    /// Bracket atoms carry an exact hydrogen count (`Some`, possibly 0);
    /// organic-subset atoms fill hydrogens by valence (`None`).
    pub explicit_h: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    fn order_value(&self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

/// A molecular graph. Atom and bond indices are stable after construction.
#[derive(Debug, Clone)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    // adjacency[i] = (neighbor atom index, bond index)
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bi, bond) in bonds.iter().enumerate() {
            adjacency[bond.a].push((bond.b, bi));
            adjacency[bond.b].push((bond.a, bi));
        }
        Self { atoms, bonds, adjacency }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// (neighbor atom index, bond index) pairs for one atom.
    pub fn neighbors(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    /// Number of heavy (non-hydrogen) neighbors.
    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx]
            .iter()
            .filter(|(n, _)| self.atoms[*n].element != Element::H)
            .count()
    }

    /// Hydrogens attached to this atom but not present as graph atoms:
    /// the bracket H-count when given, otherwise filled from valence.
    pub fn attached_hydrogens(&self, idx: usize) -> u8 {
        match self.atoms[idx].explicit_h {
            Some(h) => h,
            None => self.implicit_hydrogens(idx),
        }
    }

    /// All hydrogens on this atom, including explicit `[H]` neighbors.
    pub fn total_hydrogens(&self, idx: usize) -> u8 {
        let neighbor_h = self.adjacency[idx]
            .iter()
            .filter(|(n, _)| self.atoms[*n].element == Element::H)
            .count() as u8;
        self.attached_hydrogens(idx) + neighbor_h
    }

    fn implicit_hydrogens(&self, idx: usize) -> u8 {
        let atom = &self.atoms[idx];
        if atom.element == Element::H {
            return 0;
        }
        let order_sum: f64 = self.adjacency[idx]
            .iter()
            .map(|(_, bi)| self.bonds[*bi].order.order_value())
            .sum();
        let used = order_sum.ceil() as i32;
        let valence = atom.element.default_valence() as i32;
        (valence - used).max(0) as u8
    }

    /// Whether a bond lies on a cycle (bridge test: the bond's endpoints stay
    /// connected when the bond itself is removed).
    pub fn is_ring_bond(&self, bond_idx: usize) -> bool {
        let bond = &self.bonds[bond_idx];
        let mut visited = vec![false; self.atoms.len()];
        let mut queue = vec![bond.a];
        visited[bond.a] = true;
        while let Some(cur) = queue.pop() {
            for (next, bi) in &self.adjacency[cur] {
                if *bi == bond_idx || visited[*next] {
                    continue;
                }
                if *next == bond.b {
                    return true;
                }
                visited[*next] = true;
                queue.push(*next);
            }
        }
        false
    }
}

// ── Parser ────────────────────────────────────────────────────────────────────

/// Parse a SMILES string into a [`Molecule`].
pub fn parse_smiles(smiles: &str) -> Result<Molecule, ChemError> {
    let input = smiles.trim();
    if input.is_empty() {
        return Err(ChemError::Parse("empty SMILES string".to_string()));
    }

    let chars: Vec<char> = input.chars().collect();
    let mut atoms: Vec<Atom> = Vec::new();
    let mut bonds: Vec<Bond> = Vec::new();
    let mut prev: Option<usize> = None;
    let mut branch_stack: Vec<usize> = Vec::new();
    let mut pending: Option<BondOrder> = None;
    // ring number -> (opening atom, bond symbol seen at the opening)
    let mut ring_open: HashMap<u16, (usize, Option<BondOrder>)> = HashMap::new();
    let mut i = 0usize;

    let mut attach = |atoms: &mut Vec<Atom>,
                      bonds: &mut Vec<Bond>,
                      prev: &mut Option<usize>,
                      pending: &mut Option<BondOrder>,
                      atom: Atom| {
        atoms.push(atom);
        let idx = atoms.len() - 1;
        if let Some(p) = *prev {
            let order = pending.take().unwrap_or_else(|| {
                if atoms[p].aromatic && atoms[idx].aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                }
            });
            bonds.push(Bond { a: p, b: idx, order });
        }
        *prev = Some(idx);
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '[' => {
                let (atom, next) = parse_bracket_atom(&chars, i, input)?;
                attach(&mut atoms, &mut bonds, &mut prev, &mut pending, atom);
                i = next;
            }
            '-' => {
                pending = Some(BondOrder::Single);
                i += 1;
            }
            '=' => {
                pending = Some(BondOrder::Double);
                i += 1;
            }
            '#' => {
                pending = Some(BondOrder::Triple);
                i += 1;
            }
            ':' => {
                pending = Some(BondOrder::Aromatic);
                i += 1;
            }
            '/' | '\\' => {
                // directional single bond; stereo is not tracked
                pending = Some(BondOrder::Single);
                i += 1;
            }
            '(' => {
                let anchor = prev.ok_or_else(|| {
                    ChemError::Parse(format!("branch with no preceding atom in '{}'", input))
                })?;
                branch_stack.push(anchor);
                i += 1;
            }
            ')' => {
                let anchor = branch_stack.pop().ok_or_else(|| {
                    ChemError::Parse(format!("unmatched ')' in '{}'", input))
                })?;
                prev = Some(anchor);
                i += 1;
            }
            '.' => {
                if pending.is_some() {
                    return Err(ChemError::Parse(format!(
                        "bond symbol before '.' separator in '{}'",
                        input
                    )));
                }
                prev = None;
                i += 1;
            }
            '%' => {
                let digits = (
                    chars.get(i + 1).and_then(|c| c.to_digit(10)),
                    chars.get(i + 2).and_then(|c| c.to_digit(10)),
                );
                let (Some(tens), Some(ones)) = digits else {
                    return Err(ChemError::Parse(format!(
                        "'%' ring closure needs two digits in '{}'",
                        input
                    )));
                };
                let key = (tens * 10 + ones) as u16;
                close_ring(
                    key,
                    &mut ring_open,
                    &mut bonds,
                    &atoms,
                    prev,
                    &mut pending,
                    input,
                )?;
                i += 3;
            }
            '0'..='9' => {
                let key = (c as u8 - b'0') as u16;
                close_ring(
                    key,
                    &mut ring_open,
                    &mut bonds,
                    &atoms,
                    prev,
                    &mut pending,
                    input,
                )?;
                i += 1;
            }
            _ => {
                let (atom, next) = parse_organic_atom(&chars, i, input)?;
                attach(&mut atoms, &mut bonds, &mut prev, &mut pending, atom);
                i = next;
            }
        }
    }

    if atoms.is_empty() {
        return Err(ChemError::Parse(format!("no atoms in '{}'", input)));
    }
    if pending.is_some() {
        return Err(ChemError::Parse(format!("dangling bond symbol in '{}'", input)));
    }
    if !branch_stack.is_empty() {
        return Err(ChemError::Parse(format!("unmatched '(' in '{}'", input)));
    }
    if !ring_open.is_empty() {
        let mut keys: Vec<u16> = ring_open.keys().copied().collect();
        keys.sort_unstable();
        return Err(ChemError::Parse(format!(
            "unclosed ring closure(s) {:?} in '{}'",
            keys, input
        )));
    }

    Ok(Molecule::new(atoms, bonds))
}

fn close_ring(
    key: u16,
    ring_open: &mut HashMap<u16, (usize, Option<BondOrder>)>,
    bonds: &mut Vec<Bond>,
    atoms: &[Atom],
    prev: Option<usize>,
    pending: &mut Option<BondOrder>,
    input: &str,
) -> Result<(), ChemError> {
    let current = prev.ok_or_else(|| {
        ChemError::Parse(format!("ring closure with no preceding atom in '{}'", input))
    })?;
    let hint = pending.take();

    match ring_open.remove(&key) {
        Some((other, stored_hint)) => {
            if other == current {
                return Err(ChemError::Parse(format!(
                    "ring closure {} bonds an atom to itself in '{}'",
                    key, input
                )));
            }
            let order = hint.or(stored_hint).unwrap_or_else(|| {
                if atoms[other].aromatic && atoms[current].aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                }
            });
            bonds.push(Bond { a: other, b: current, order });
        }
        None => {
            ring_open.insert(key, (current, hint));
        }
    }
    Ok(())
}

fn parse_organic_atom(
    chars: &[char],
    i: usize,
    input: &str,
) -> Result<(Atom, usize), ChemError> {
    let c = chars[i];

    if c.is_ascii_uppercase() {
        // Two-letter symbols first (Cl, Br), then single letters.
        if let Some(&next) = chars.get(i + 1) {
            let two: String = [c, next].iter().collect();
            if let Some(element) = Element::from_symbol(&two) {
                return Ok((plain_atom(element, false), i + 2));
            }
        }
        let sym = c.to_string();
        let element = match Element::from_symbol(&sym) {
            Some(e) if e != Element::H => e,
            _ => return Err(ChemError::UnknownElement(sym)),
        };
        return Ok((plain_atom(element, false), i + 1));
    }

    if c.is_ascii_lowercase() {
        let element = match c {
            'b' => Element::B,
            'c' => Element::C,
            'n' => Element::N,
            'o' => Element::O,
            'p' => Element::P,
            's' => Element::S,
            _ => return Err(ChemError::UnknownElement(c.to_string())),
        };
        return Ok((plain_atom(element, true), i + 1));
    }

    Err(ChemError::Parse(format!(
        "unexpected character '{}' in '{}'",
        c, input
    )))
}

fn plain_atom(element: Element, aromatic: bool) -> Atom {
    Atom { element, aromatic, charge: 0, explicit_h: None }
}

fn parse_bracket_atom(
    chars: &[char],
    open: usize,
    input: &str,
) -> Result<(Atom, usize), ChemError> {
    let mut end = open + 1;
    while end < chars.len() && chars[end] != ']' {
        end += 1;
    }
    if end >= chars.len() {
        return Err(ChemError::Parse(format!("unclosed '[' in '{}'", input)));
    }
    let content: Vec<char> = chars[open + 1..end].to_vec();
    if content.is_empty() {
        return Err(ChemError::Parse(format!("empty bracket atom in '{}'", input)));
    }

    let mut j = 0usize;

    // isotope label: swallowed, masses stay monoisotopic
    while j < content.len() && content[j].is_ascii_digit() {
        j += 1;
    }
    if j >= content.len() {
        return Err(ChemError::Parse(format!("bracket atom with no element in '{}'", input)));
    }

    let (element, aromatic) = if content[j].is_ascii_uppercase() {
        let mut sym = content[j].to_string();
        // A following lowercase letter is part of the symbol; a following
        // 'H' is the hydrogen count, not part of the symbol.
        if j + 1 < content.len() && content[j + 1].is_ascii_lowercase() {
            sym.push(content[j + 1]);
            j += 1;
        }
        j += 1;
        match Element::from_symbol(&sym) {
            Some(e) => (e, false),
            None => return Err(ChemError::UnknownElement(sym)),
        }
    } else {
        let c = content[j];
        j += 1;
        let element = match c {
            'b' => Element::B,
            'c' => Element::C,
            'n' => Element::N,
            'o' => Element::O,
            'p' => Element::P,
            's' => Element::S,
            _ => {
                // catch lowercase two-letter forms like 'se' for a clearer error
                let mut sym = c.to_string();
                if j < content.len() && content[j].is_ascii_lowercase() {
                    sym.push(content[j]);
                }
                return Err(ChemError::UnknownElement(sym));
            }
        };
        (element, true)
    };

    let mut explicit_h: u8 = 0;
    let mut charge: i8 = 0;

    while j < content.len() {
        match content[j] {
            '@' => {
                // chirality marker, not tracked
                j += 1;
            }
            'H' => {
                j += 1;
                let mut digits = String::new();
                while j < content.len() && content[j].is_ascii_digit() {
                    digits.push(content[j]);
                    j += 1;
                }
                explicit_h = if digits.is_empty() {
                    1
                } else {
                    digits.parse().map_err(|_| {
                        ChemError::Parse(format!("bad hydrogen count in '{}'", input))
                    })?
                };
            }
            '+' | '-' => {
                let sign: i8 = if content[j] == '+' { 1 } else { -1 };
                let symbol = content[j];
                j += 1;
                let mut magnitude: i8 = 1;
                let mut digits = String::new();
                while j < content.len() && content[j].is_ascii_digit() {
                    digits.push(content[j]);
                    j += 1;
                }
                if !digits.is_empty() {
                    magnitude = digits.parse().map_err(|_| {
                        ChemError::Parse(format!("bad charge in '{}'", input))
                    })?;
                } else {
                    // ++ / -- shorthand
                    while j < content.len() && content[j] == symbol {
                        magnitude += 1;
                        j += 1;
                    }
                }
                charge = sign * magnitude;
            }
            other => {
                return Err(ChemError::Parse(format!(
                    "unsupported bracket token '{}' in '{}'",
                    other, input
                )));
            }
        }
    }

    Ok((
        Atom { element, aromatic, charge, explicit_h: Some(explicit_h) },
        end + 1,
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ethanol_graph() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.total_hydrogens(0), 3); // CH3
        assert_eq!(mol.total_hydrogens(1), 2); // CH2
        assert_eq!(mol.total_hydrogens(2), 1); // OH
    }

    #[test]
    fn test_benzene_is_aromatic_ring() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        assert!(mol.atoms().iter().all(|a| a.aromatic));
        assert!(mol.bonds().iter().all(|b| b.order == BondOrder::Aromatic));
        for bi in 0..mol.bond_count() {
            assert!(mol.is_ring_bond(bi));
        }
        for idx in 0..6 {
            assert_eq!(mol.total_hydrogens(idx), 1);
        }
    }

    #[test]
    fn test_branching_isobutane() {
        let mol = parse_smiles("CC(C)C").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(mol.degree(1), 3);
        assert_eq!(mol.total_hydrogens(1), 1);
    }

    #[test]
    fn test_cyclohexane_ring_closure() {
        let mol = parse_smiles("C1CCCCC1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        for bi in 0..mol.bond_count() {
            assert!(mol.is_ring_bond(bi));
        }
    }

    #[test]
    fn test_percent_ring_closure() {
        let a = parse_smiles("C%12CCCCC%12").unwrap();
        let b = parse_smiles("C1CCCCC1").unwrap();
        assert_eq!(a.bond_count(), b.bond_count());
    }

    #[test]
    fn test_bracket_ammonium() {
        let mol = parse_smiles("[NH4+]").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.atoms()[0].charge, 1);
        assert_eq!(mol.total_hydrogens(0), 4);
    }

    #[test]
    fn test_bracket_explicit_charge_magnitude() {
        let mol = parse_smiles("[O-2]").unwrap();
        assert_eq!(mol.atoms()[0].charge, -2);
        assert_eq!(mol.total_hydrogens(0), 0);
    }

    #[test]
    fn test_dot_separates_components() {
        let mol = parse_smiles("CCO.Cl").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_count(), 2);
        // the chloride fragment picks up its implicit hydrogen
        assert_eq!(mol.total_hydrogens(3), 1);
    }

    #[test]
    fn test_directional_bonds_parse_as_single() {
        let mol = parse_smiles("C/C=C/C").unwrap();
        assert_eq!(mol.atom_count(), 4);
        let doubles = mol
            .bonds()
            .iter()
            .filter(|b| b.order == BondOrder::Double)
            .count();
        assert_eq!(doubles, 1);
    }

    #[test]
    fn test_double_bond_reduces_hydrogens() {
        let mol = parse_smiles("C=O").unwrap(); // formaldehyde
        assert_eq!(mol.total_hydrogens(0), 2);
        assert_eq!(mol.total_hydrogens(1), 0);
    }

    #[test]
    fn test_chain_bond_is_not_ring_bond() {
        let mol = parse_smiles("Cc1ccccc1").unwrap(); // toluene
        assert!(!mol.is_ring_bond(0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_smiles(""), Err(ChemError::Parse(_))));
        assert!(matches!(parse_smiles("CC("), Err(ChemError::Parse(_))));
        assert!(matches!(parse_smiles("C1CC"), Err(ChemError::Parse(_))));
        assert!(matches!(parse_smiles("CC="), Err(ChemError::Parse(_))));
        assert!(matches!(parse_smiles("C(C"), Err(ChemError::Parse(_))));
        assert!(matches!(parse_smiles(")C"), Err(ChemError::Parse(_))));
    }

    #[test]
    fn test_unknown_element_is_reported() {
        match parse_smiles("C[Se]C") {
            Err(ChemError::UnknownElement(sym)) => assert_eq!(sym, "Se"),
            other => panic!("expected UnknownElement, got {:?}", other),
        }
    }
}
