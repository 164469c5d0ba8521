use thiserror::Error;

/// Errors returned by the chemistry kernel.
#[derive(Debug, Error)]
pub enum ChemError {
    /// The provided SMILES string is malformed or uses unsupported notation.
    #[error("unsupported or invalid SMILES: {0}")]
    Parse(String),

    /// An element symbol outside the supported set was encountered.
    #[error("unknown element symbol: {0}")]
    UnknownElement(String),

    /// A concentration unit symbol outside the supported set was supplied.
    #[error("unsupported concentration unit '{0}' (expected one of nM, µM, mM, M)")]
    UnsupportedUnit(String),

    /// Potency values must be strictly positive for the log transform.
    #[error("IC50 value must be a positive number, got {0}")]
    NonPositivePotency(f64),
}
