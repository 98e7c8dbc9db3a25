use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::{center_of_mass, distance, squared_distance};
use crate::engine::config::{DistanceMode, ResidueSpecifier};
use crate::engine::error::EngineError;
use nalgebra::{DMatrix, Point3};
use std::io::Write;

/// Distance between two residues under the given mode.
///
/// Returns `None` when either residue cannot be reduced: it has no atoms, or
/// lacks the atom named by [`DistanceMode::NamedAtom`].
pub fn residue_distance(first: &Residue, second: &Residue, mode: &DistanceMode) -> Option<f64> {
    match mode {
        DistanceMode::NearestAtom => nearest_atom_distance(first, second),
        DistanceMode::CenterOfMass | DistanceMode::NamedAtom(_) => {
            let a = representative_point(first, mode)?;
            let b = representative_point(second, mode)?;
            Some(distance(&a, &b))
        }
    }
}

/// Smallest distance over the full cross product of the two residues' atoms.
pub fn nearest_atom_distance(first: &Residue, second: &Residue) -> Option<f64> {
    first
        .atoms()
        .flat_map(|a| {
            second
                .atoms()
                .map(move |b| squared_distance(&a.position, &b.position))
        })
        .min_by(f64::total_cmp)
        .map(f64::sqrt)
}

fn representative_point(residue: &Residue, mode: &DistanceMode) -> Option<Point3<f64>> {
    match mode {
        DistanceMode::NamedAtom(name) => residue.atom(name).map(|atom| atom.position),
        DistanceMode::CenterOfMass | DistanceMode::NearestAtom => center_of_mass(residue),
    }
}

/// [`residue_distance`] with the failure attributed to the offending residue.
pub fn residue_distance_checked(
    first: (&ResidueSpecifier, &Residue),
    second: (&ResidueSpecifier, &Residue),
    mode: &DistanceMode,
) -> Result<f64, EngineError> {
    residue_distance(first.1, second.1, mode).ok_or_else(|| {
        let (spec, residue) = if reducible(first.1, mode) { second } else { first };
        unresolved(spec, residue, mode)
    })
}

fn reducible(residue: &Residue, mode: &DistanceMode) -> bool {
    match mode {
        DistanceMode::NamedAtom(name) => residue.contains_atom(name),
        DistanceMode::CenterOfMass | DistanceMode::NearestAtom => !residue.is_empty(),
    }
}

fn unresolved(spec: &ResidueSpecifier, residue: &Residue, mode: &DistanceMode) -> EngineError {
    match mode {
        DistanceMode::NamedAtom(name) if !residue.is_empty() => {
            EngineError::missing_atom(&spec.domain, &spec.residue, name)
        }
        _ => EngineError::EmptyResidue { spec: spec.clone() },
    }
}

/// Looks up a residue, reporting which key is missing.
pub fn find_residue<'a>(
    structure: &'a Structure,
    spec: &ResidueSpecifier,
) -> Result<&'a Residue, EngineError> {
    structure
        .chain(&spec.domain)
        .ok_or_else(|| EngineError::missing_chain(&spec.domain))?
        .residue(&spec.residue)
        .ok_or_else(|| EngineError::missing_residue(&spec.domain, &spec.residue))
}

/// Distance between two residues of one structure, located by specifier.
pub fn distance_between(
    structure: &Structure,
    first: &ResidueSpecifier,
    second: &ResidueSpecifier,
    mode: &DistanceMode,
) -> Result<f64, EngineError> {
    let a = find_residue(structure, first)?;
    let b = find_residue(structure, second)?;
    residue_distance_checked((first, a), (second, b), mode)
}

/// Dense residue-to-residue distance matrix between two domains.
///
/// Rows follow the first domain's residue order, columns the second's.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    pub row_domain: String,
    pub col_domain: String,
    pub row_ids: Vec<String>,
    pub col_ids: Vec<String>,
    pub values: DMatrix<f64>,
}

impl DistanceMatrix {
    pub fn get(&self, row_id: &str, col_id: &str) -> Option<f64> {
        let row = self.row_ids.iter().position(|id| id == row_id)?;
        let col = self.col_ids.iter().position(|id| id == col_id)?;
        Some(self.values[(row, col)])
    }

    /// Writes the matrix as tab-separated text.
    ///
    /// The header row holds the column residue ids after a `row/col` domain
    /// label; each following row starts with its residue id.
    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut tsv = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(writer);

        let corner = format!("{}/{}", self.row_domain, self.col_domain);
        let header = std::iter::once(corner.as_str()).chain(self.col_ids.iter().map(String::as_str));
        tsv.write_record(header)?;

        for (r, row_id) in self.row_ids.iter().enumerate() {
            let row = self.values.row(r);
            let cells = row.iter().map(|v| format!("{:.3}", v));
            tsv.write_record(std::iter::once(row_id.clone()).chain(cells))?;
        }
        tsv.flush()?;
        Ok(())
    }
}

/// Computes the distance from every residue of `row_domain` to every residue
/// of `col_domain` within one structure.
///
/// # Errors
///
/// [`EngineError::KeyMismatch`] if either domain is absent, or any residue
/// error of [`residue_distance_checked`].
pub fn distance_matrix(
    structure: &Structure,
    row_domain: &str,
    col_domain: &str,
    mode: &DistanceMode,
) -> Result<DistanceMatrix, EngineError> {
    let rows = structure
        .chain(row_domain)
        .ok_or_else(|| EngineError::missing_chain(row_domain))?;
    let cols = structure
        .chain(col_domain)
        .ok_or_else(|| EngineError::missing_chain(col_domain))?;

    let mut data = Vec::with_capacity(rows.len() * cols.len());
    for (row_id, row_residue) in rows.residues() {
        let row_spec = ResidueSpecifier::new(row_domain, row_id);
        for (col_id, col_residue) in cols.residues() {
            let col_spec = ResidueSpecifier::new(col_domain, col_id);
            data.push(residue_distance_checked(
                (&row_spec, row_residue),
                (&col_spec, col_residue),
                mode,
            )?);
        }
    }

    Ok(DistanceMatrix {
        row_domain: row_domain.to_string(),
        col_domain: col_domain.to_string(),
        row_ids: rows.residue_ids().to_vec(),
        col_ids: cols.residue_ids().to_vec(),
        values: DMatrix::from_row_slice(rows.len(), cols.len(), &data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::engine::error::MissingKey;

    const EPS: f64 = 1e-9;

    fn residue(atoms: &[(&str, [f64; 3])]) -> Residue {
        let mut residue = Residue::new("UNK");
        for (name, [x, y, z]) in atoms {
            residue.insert_atom(Atom::new("1", name, Point3::new(*x, *y, *z)));
        }
        residue
    }

    fn two_domain_structure() -> Structure {
        let mut s = Structure::new();
        let a = s.chain_entry("A1");
        a.residue_entry("5", "LYS")
            .insert_atom(Atom::new("1", "CA", Point3::new(0.0, 0.0, 0.0)));
        a.residue_entry("6", "ARG")
            .insert_atom(Atom::new("2", "CA", Point3::new(10.0, 0.0, 0.0)));
        let b = s.chain_entry("B");
        b.residue_entry("1", "G")
            .insert_atom(Atom::new("3", "P", Point3::new(0.0, 3.0, 0.0)));
        b.residue_entry("2", "C")
            .insert_atom(Atom::new("4", "P", Point3::new(0.0, 0.0, 4.0)));
        b.residue_entry("3", "U")
            .insert_atom(Atom::new("5", "P", Point3::new(10.0, 0.0, 1.0)));
        s
    }

    #[test]
    fn center_of_mass_mode_measures_between_centroids() {
        let a = residue(&[("N", [0.0, 0.0, 0.0]), ("CA", [2.0, 0.0, 0.0])]);
        let b = residue(&[("P", [1.0, 4.0, 0.0])]);
        let d = residue_distance(&a, &b, &DistanceMode::CenterOfMass).unwrap();
        assert!((d - 4.0).abs() < EPS);
    }

    #[test]
    fn nearest_atom_mode_takes_the_minimum_over_all_pairs() {
        let a = residue(&[("N", [0.0, 0.0, 0.0]), ("CA", [5.0, 0.0, 0.0])]);
        let b = residue(&[("P", [20.0, 0.0, 0.0]), ("OP1", [8.0, 4.0, 0.0])]);
        let d = residue_distance(&a, &b, &DistanceMode::NearestAtom).unwrap();
        assert!((d - 5.0).abs() < EPS);
    }

    #[test]
    fn nearest_atom_is_never_larger_than_center_of_mass_distance() {
        let a = residue(&[("N", [0.0, 0.0, 0.0]), ("CA", [3.0, 1.0, -2.0])]);
        let b = residue(&[("P", [6.0, 2.0, 1.0]), ("C1'", [4.0, -1.0, 0.5])]);
        let nearest = residue_distance(&a, &b, &DistanceMode::NearestAtom).unwrap();
        let com = residue_distance(&a, &b, &DistanceMode::CenterOfMass).unwrap();
        assert!(nearest <= com + EPS);
    }

    #[test]
    fn named_atom_mode_requires_the_atom_on_both_sides() {
        let a = residue(&[("CA", [0.0, 0.0, 0.0])]);
        let b = residue(&[("P", [1.0, 0.0, 0.0])]);
        let mode = DistanceMode::NamedAtom("CA".into());
        assert_eq!(residue_distance(&a, &a, &mode), Some(0.0));
        assert_eq!(residue_distance(&a, &b, &mode), None);

        let err = residue_distance_checked(
            (&ResidueSpecifier::new("A", "1"), &a),
            (&ResidueSpecifier::new("B", "9"), &b),
            &mode,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::KeyMismatch(MissingKey::Atom {
                spec: ResidueSpecifier::new("B", "9"),
                atom: "CA".into(),
            })
        );
    }

    #[test]
    fn empty_residue_is_reported_as_such() {
        let empty = Residue::new("GLY");
        let full = residue(&[("CA", [0.0, 0.0, 0.0])]);
        let err = residue_distance_checked(
            (&ResidueSpecifier::new("A", "1"), &empty),
            (&ResidueSpecifier::new("B", "1"), &full),
            &DistanceMode::NearestAtom,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::EmptyResidue {
                spec: ResidueSpecifier::new("A", "1")
            }
        );
    }

    #[test]
    fn distance_between_locates_residues_by_specifier() {
        let s = two_domain_structure();
        let d = distance_between(
            &s,
            &ResidueSpecifier::new("A1", "5"),
            &ResidueSpecifier::new("B", "2"),
            &DistanceMode::CenterOfMass,
        )
        .unwrap();
        assert!((d - 4.0).abs() < EPS);

        let err = distance_between(
            &s,
            &ResidueSpecifier::new("A1", "99"),
            &ResidueSpecifier::new("B", "2"),
            &DistanceMode::CenterOfMass,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::KeyMismatch(MissingKey::Residue(ResidueSpecifier::new("A1", "99")))
        );
    }

    #[test]
    fn matrix_follows_residue_insertion_order() {
        let s = two_domain_structure();
        let m = distance_matrix(&s, "A1", "B", &DistanceMode::CenterOfMass).unwrap();

        assert_eq!(m.row_ids, vec!["5", "6"]);
        assert_eq!(m.col_ids, vec!["1", "2", "3"]);
        assert_eq!(m.values.shape(), (2, 3));
        assert!((m.values[(0, 0)] - 3.0).abs() < EPS);
        assert!((m.values[(0, 1)] - 4.0).abs() < EPS);
        assert!((m.values[(1, 2)] - 1.0).abs() < EPS);
        assert_eq!(m.get("6", "3"), Some(m.values[(1, 2)]));
        assert_eq!(m.get("7", "3"), None);
    }

    #[test]
    fn matrix_of_unknown_domain_is_a_key_mismatch() {
        let s = two_domain_structure();
        let err = distance_matrix(&s, "A2", "B", &DistanceMode::CenterOfMass).unwrap_err();
        assert_eq!(err, EngineError::KeyMismatch(MissingKey::Chain("A2".into())));
    }

    #[test]
    fn matrix_is_written_as_tab_separated_text() {
        let s = two_domain_structure();
        let m = distance_matrix(&s, "A1", "B", &DistanceMode::CenterOfMass).unwrap();
        let mut out = Vec::new();
        m.write_tsv(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "A1/B\t1\t2\t3");
        assert_eq!(lines[1], "5\t3.000\t4.000\t10.050");
        assert_eq!(lines.len(), 3);
    }
}
