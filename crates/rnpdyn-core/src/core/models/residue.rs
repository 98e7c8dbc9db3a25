use super::atom::Atom;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub name: String,                  // Three-letter residue name (e.g., "ALA", "G")
    pub annotation: Option<f64>,       // Interface marker written during analysis
    atoms: HashMap<String, Atom>,      // Map from atom name to atom
    atom_order: Vec<String>,           // Atom names in first-seen order
}

impl Residue {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            annotation: None,
            atoms: HashMap::new(),
            atom_order: Vec::new(),
        }
    }

    /// Inserts an atom keyed by its name.
    ///
    /// A name is appended to the ordering list only the first time it is seen.
    /// Re-inserting an existing name replaces the stored atom and returns the
    /// previous one, leaving its position in the ordering list untouched.
    pub fn insert_atom(&mut self, atom: Atom) -> Option<Atom> {
        if !self.atoms.contains_key(&atom.name) {
            self.atom_order.push(atom.name.clone());
        }
        self.atoms.insert(atom.name.clone(), atom)
    }

    pub fn contains_atom(&self, name: &str) -> bool {
        self.atoms.contains_key(name)
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atoms.get(name)
    }

    pub fn atom_names(&self) -> &[String] {
        &self.atom_order
    }

    /// Iterates over atoms in first-seen order.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.atom_order.iter().filter_map(|name| self.atoms.get(name))
    }

    pub fn atoms_mut(&mut self) -> impl Iterator<Item = &mut Atom> {
        self.atoms.values_mut()
    }

    pub fn len(&self) -> usize {
        self.atom_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atom_order.is_empty()
    }

    /// Sets the interface marker on the residue and on each of its atoms.
    pub fn annotate(&mut self, value: f64) {
        self.annotation = Some(value);
        for atom in self.atoms.values_mut() {
            atom.annotation = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn atom(name: &str, x: f64) -> Atom {
        Atom::new("1", name, Point3::new(x, 0.0, 0.0))
    }

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let residue = Residue::new("GLY");
        assert_eq!(residue.name, "GLY");
        assert!(residue.is_empty());
        assert!(residue.annotation.is_none());
        assert!(residue.atom("CA").is_none());
    }

    #[test]
    fn insert_atom_records_first_seen_order() {
        let mut residue = Residue::new("SER");
        residue.insert_atom(atom("N", 0.0));
        residue.insert_atom(atom("CA", 1.0));
        residue.insert_atom(atom("CB", 2.0));

        assert_eq!(residue.atom_names(), &["N", "CA", "CB"]);
        let names: Vec<_> = residue.atoms().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["N", "CA", "CB"]);
    }

    #[test]
    fn reinserting_a_name_overwrites_coordinates_without_duplicating_order() {
        let mut residue = Residue::new("ALA");
        residue.insert_atom(atom("CA", 1.0));
        residue.insert_atom(atom("CB", 2.0));
        let previous = residue.insert_atom(atom("CA", 9.0));

        assert_eq!(previous.map(|a| a.position.x), Some(1.0));
        assert_eq!(residue.atom_names(), &["CA", "CB"]);
        assert_eq!(residue.atom("CA").unwrap().position.x, 9.0);
        assert_eq!(residue.len(), 2);
    }

    #[test]
    fn annotate_marks_residue_and_all_atoms() {
        let mut residue = Residue::new("LYS");
        residue.insert_atom(atom("N", 0.0));
        residue.insert_atom(atom("CA", 1.0));
        residue.annotate(1.0);

        assert_eq!(residue.annotation, Some(1.0));
        assert!(residue.atoms().all(|a| a.annotation == Some(1.0)));
    }
}
