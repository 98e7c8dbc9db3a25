use std::fmt;
use thiserror::Error;

use super::config::ResidueSpecifier;

/// The part of a structure that has no counterpart on the other side of a
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingKey {
    Chain(String),
    Residue(ResidueSpecifier),
    Atom { spec: ResidueSpecifier, atom: String },
}

impl fmt::Display for MissingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingKey::Chain(id) => write!(f, "domain '{}'", id),
            MissingKey::Residue(spec) => write!(f, "{}", spec),
            MissingKey::Atom { spec, atom } => write!(f, "atom '{}' of {}", atom, spec),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Nothing to compare: {context}")]
    EmptyComparison { context: String },

    #[error("No counterpart found for {0}")]
    KeyMismatch(MissingKey),

    #[error("Cannot reduce {spec} to a point: it has no atoms")]
    EmptyResidue { spec: ResidueSpecifier },
}

impl EngineError {
    pub(crate) fn empty(context: impl Into<String>) -> Self {
        EngineError::EmptyComparison {
            context: context.into(),
        }
    }

    pub(crate) fn missing_chain(chain: &str) -> Self {
        EngineError::KeyMismatch(MissingKey::Chain(chain.to_string()))
    }

    pub(crate) fn missing_residue(chain: &str, residue: &str) -> Self {
        EngineError::KeyMismatch(MissingKey::Residue(ResidueSpecifier::new(chain, residue)))
    }

    pub(crate) fn missing_atom(chain: &str, residue: &str, atom: &str) -> Self {
        EngineError::KeyMismatch(MissingKey::Atom {
            spec: ResidueSpecifier::new(chain, residue),
            atom: atom.to_string(),
        })
    }
}
