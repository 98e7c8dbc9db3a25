use super::residue::Residue;
use std::collections::HashMap;

/// A named partition of a structure: a protein domain or an RNA molecule.
///
/// Residues are keyed by their sequence identifier as written in the source
/// file and are iterated in the order in which they were first encountered.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub id: String,                     // Domain identifier (e.g., "A1", "B")
    residues: HashMap<String, Residue>, // Map from residue sequence id to residue
    residue_order: Vec<String>,         // Residue ids in first-seen order
}

impl Chain {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            residues: HashMap::new(),
            residue_order: Vec::new(),
        }
    }

    /// Returns the residue with the given id, creating it on first sight.
    ///
    /// The residue name is only taken from the record that creates the residue.
    pub fn residue_entry(&mut self, residue_id: &str, name: &str) -> &mut Residue {
        if !self.residues.contains_key(residue_id) {
            self.residue_order.push(residue_id.to_string());
        }
        self.residues
            .entry(residue_id.to_string())
            .or_insert_with(|| Residue::new(name))
    }

    pub fn residue(&self, residue_id: &str) -> Option<&Residue> {
        self.residues.get(residue_id)
    }

    pub fn residue_mut(&mut self, residue_id: &str) -> Option<&mut Residue> {
        self.residues.get_mut(residue_id)
    }

    pub fn residue_ids(&self) -> &[String] {
        &self.residue_order
    }

    /// Iterates over `(residue_id, residue)` pairs in first-seen order.
    pub fn residues(&self) -> impl Iterator<Item = (&str, &Residue)> {
        self.residue_order
            .iter()
            .filter_map(|id| self.residues.get(id).map(|r| (id.as_str(), r)))
    }

    pub fn residues_mut(&mut self) -> impl Iterator<Item = &mut Residue> {
        self.residues.values_mut()
    }

    pub fn len(&self) -> usize {
        self.residue_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residue_order.is_empty()
    }

    pub fn atom_count(&self) -> usize {
        self.residues.values().map(Residue::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residue_entry_creates_each_residue_once() {
        let mut chain = Chain::new("A1");
        chain.residue_entry("10", "GLY");
        chain.residue_entry("11", "ALA");
        chain.residue_entry("10", "SER");

        assert_eq!(chain.residue_ids(), &["10", "11"]);
        assert_eq!(chain.residue("10").unwrap().name, "GLY");
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn residues_iterate_in_first_seen_order_not_numeric_order() {
        let mut chain = Chain::new("B");
        for id in ["30", "4", "100"] {
            chain.residue_entry(id, "U");
        }
        let ids: Vec<_> = chain.residues().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["30", "4", "100"]);
    }

    #[test]
    fn missing_residue_lookup_returns_none() {
        let chain = Chain::new("A");
        assert!(chain.residue("1").is_none());
        assert!(chain.is_empty());
        assert_eq!(chain.atom_count(), 0);
    }
}
