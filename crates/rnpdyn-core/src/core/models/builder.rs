use super::atom::Atom;
use super::structure::Structure;
use std::collections::HashSet;
use thiserror::Error;

/// How a repeated `(chain, residue, atom)` key is treated while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The later record replaces the coordinates of the earlier one; the atom
    /// keeps its first-seen position in the residue ordering.
    #[default]
    LastWriteWins,
    /// A repeated key is an error.
    Reject,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Duplicate atom '{atom}' in residue {residue} of chain '{chain}'")]
pub struct DuplicateAtomError {
    pub chain: String,
    pub residue: String,
    pub atom: String,
}

/// Which chain (segment) identifiers a parse keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChainFilter {
    /// Keep every chain.
    #[default]
    All,
    /// Keep only the listed chains; an empty set keeps nothing.
    Only(HashSet<String>),
}

impl ChainFilter {
    pub fn admits(&self, chain_id: &str) -> bool {
        match self {
            ChainFilter::All => true,
            ChainFilter::Only(ids) => ids.contains(chain_id),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ChainFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ChainFilter::Only(iter.into_iter().map(Into::into).collect())
    }
}

/// Accumulates records of a single conformation into a [`Structure`].
///
/// All filtering state lives here and dies with the builder: the accepted
/// alternate-location code is fixed by the first record offered to
/// [`admits_alt_loc`](Self::admits_alt_loc) and never leaks into another parse.
pub struct StructureBuilder<'a> {
    structure: Structure,
    allowed_chains: &'a ChainFilter,
    policy: DuplicatePolicy,
    alt_loc: Option<char>,
}

impl<'a> StructureBuilder<'a> {
    pub fn new(allowed_chains: &'a ChainFilter, policy: DuplicatePolicy) -> Self {
        Self {
            structure: Structure::new(),
            allowed_chains,
            policy,
            alt_loc: None,
        }
    }

    /// Returns whether a record with this alternate-location code is kept.
    ///
    /// The first code offered becomes the only accepted one, whatever it is
    /// (including a blank).
    pub fn admits_alt_loc(&mut self, code: char) -> bool {
        *self.alt_loc.get_or_insert(code) == code
    }

    pub fn admits_chain(&self, chain_id: &str) -> bool {
        self.allowed_chains.admits(chain_id)
    }

    pub fn add_atom(
        &mut self,
        chain_id: &str,
        residue_id: &str,
        residue_name: &str,
        atom: Atom,
    ) -> Result<(), DuplicateAtomError> {
        let residue = self
            .structure
            .chain_entry(chain_id)
            .residue_entry(residue_id, residue_name);

        if self.policy == DuplicatePolicy::Reject && residue.contains_atom(&atom.name) {
            return Err(DuplicateAtomError {
                chain: chain_id.to_string(),
                residue: residue_id.to_string(),
                atom: atom.name,
            });
        }
        residue.insert_atom(atom);
        Ok(())
    }

    pub fn build(self) -> Structure {
        self.structure
    }
}
