use super::chain::Chain;
use super::residue::Residue;
use std::collections::HashMap;

/// A single conformation: either the reference structure or one trajectory frame.
///
/// Chains are owned exclusively by the structure; two structures never share
/// residues or atoms, so annotating one frame cannot leak into another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    chains: HashMap<String, Chain>,
    chain_order: Vec<String>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the chain with the given id, creating it on first sight.
    pub fn chain_entry(&mut self, id: &str) -> &mut Chain {
        if !self.chains.contains_key(id) {
            self.chain_order.push(id.to_string());
        }
        self.chains
            .entry(id.to_string())
            .or_insert_with(|| Chain::new(id))
    }

    pub fn chain(&self, id: &str) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn chain_mut(&mut self, id: &str) -> Option<&mut Chain> {
        self.chains.get_mut(id)
    }

    pub fn chain_ids(&self) -> &[String] {
        &self.chain_order
    }

    /// Iterates over chains in first-seen order.
    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.chain_order.iter().filter_map(|id| self.chains.get(id))
    }

    pub fn residue(&self, chain_id: &str, residue_id: &str) -> Option<&Residue> {
        self.chains.get(chain_id)?.residue(residue_id)
    }

    pub fn residue_mut(&mut self, chain_id: &str, residue_id: &str) -> Option<&mut Residue> {
        self.chains.get_mut(chain_id)?.residue_mut(residue_id)
    }

    pub fn len(&self) -> usize {
        self.chain_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain_order.is_empty()
    }

    pub fn atom_count(&self) -> usize {
        self.chains.values().map(Chain::atom_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_entry_preserves_first_seen_order() {
        let mut structure = Structure::new();
        structure.chain_entry("B");
        structure.chain_entry("A1");
        structure.chain_entry("B");

        assert_eq!(structure.chain_ids(), &["B", "A1"]);
        let ids: Vec<_> = structure.chains().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A1"]);
    }

    #[test]
    fn residue_lookup_goes_through_chain() {
        let mut structure = Structure::new();
        structure.chain_entry("A").residue_entry("5", "ARG");

        assert_eq!(structure.residue("A", "5").map(|r| r.name.as_str()), Some("ARG"));
        assert!(structure.residue("A", "6").is_none());
        assert!(structure.residue("Z", "5").is_none());
    }
}
