use crate::core::models::chain::Chain;
use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::{center_of_mass, squared_distance};
use crate::engine::config::{ResidueSpecifier, RmsdMode};
use crate::engine::error::EngineError;
use nalgebra::Point3;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
struct SquaredDeviation {
    sum: f64,
    count: usize,
}

impl SquaredDeviation {
    fn add(&mut self, squared: f64) {
        self.sum += squared;
        self.count += 1;
    }

    fn finish(self, context: impl FnOnce() -> String) -> Result<f64, EngineError> {
        if self.count == 0 {
            return Err(EngineError::empty(context()));
        }
        Ok((self.sum / self.count as f64).sqrt())
    }
}

/// Root-mean-square deviation between two corresponding structures.
///
/// Chains are visited in the reference's order and matched by id; residues and
/// atoms are matched by key, with no alignment or superposition.
///
/// # Errors
///
/// - [`EngineError::KeyMismatch`] if `other` lacks a chain, residue or named
///   atom that the reference contributes.
/// - [`EngineError::EmptyResidue`] if a compared residue of `other` has no
///   atoms in center-of-mass mode.
/// - [`EngineError::EmptyComparison`] if no residue contributed at all.
pub fn rmsd_whole(
    reference: &Structure,
    other: &Structure,
    mode: &RmsdMode,
) -> Result<f64, EngineError> {
    let mut acc = SquaredDeviation::default();
    for chain in reference.chains() {
        let counterpart = other
            .chain(&chain.id)
            .ok_or_else(|| EngineError::missing_chain(&chain.id))?;
        accumulate_chain(chain, counterpart, mode, &mut acc)?;
    }
    acc.finish(|| format!("no residue pairs to compare in {} mode", mode))
}

/// Root-mean-square deviation restricted to a single pair of chains.
///
/// Errors are the same as for [`rmsd_whole`]; keys are reported against the
/// reference chain's id.
pub fn rmsd_domain(reference: &Chain, other: &Chain, mode: &RmsdMode) -> Result<f64, EngineError> {
    let mut acc = SquaredDeviation::default();
    accumulate_chain(reference, other, mode, &mut acc)?;
    acc.finish(|| {
        format!(
            "no residue pairs to compare in domain '{}' ({} mode)",
            reference.id, mode
        )
    })
}

fn accumulate_chain(
    reference: &Chain,
    other: &Chain,
    mode: &RmsdMode,
    acc: &mut SquaredDeviation,
) -> Result<(), EngineError> {
    for (residue_id, residue) in reference.residues() {
        // Residues of the reference that cannot be reduced to a point do not
        // count towards the denominator.
        let Some(reference_point) = reference_point(residue, mode) else {
            debug!(
                domain = %reference.id,
                residue = residue_id,
                mode = %mode,
                "Skipping reference residue with nothing to compare."
            );
            continue;
        };

        let counterpart = other
            .residue(residue_id)
            .ok_or_else(|| EngineError::missing_residue(&reference.id, residue_id))?;
        let other_point = counterpart_point(counterpart, mode, &reference.id, residue_id)?;

        acc.add(squared_distance(&reference_point, &other_point));
    }
    Ok(())
}

fn reference_point(residue: &Residue, mode: &RmsdMode) -> Option<Point3<f64>> {
    match mode {
        RmsdMode::CenterOfMass => center_of_mass(residue),
        RmsdMode::NamedAtom(name) => residue.atom(name).map(|atom| atom.position),
    }
}

fn counterpart_point(
    residue: &Residue,
    mode: &RmsdMode,
    chain_id: &str,
    residue_id: &str,
) -> Result<Point3<f64>, EngineError> {
    match mode {
        RmsdMode::CenterOfMass => {
            center_of_mass(residue).ok_or_else(|| EngineError::EmptyResidue {
                spec: ResidueSpecifier::new(chain_id, residue_id),
            })
        }
        RmsdMode::NamedAtom(name) => residue
            .atom(name)
            .map(|atom| atom.position)
            .ok_or_else(|| EngineError::missing_atom(chain_id, residue_id, name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::engine::error::MissingKey;

    const EPS: f64 = 1e-9;

    fn ca() -> RmsdMode {
        RmsdMode::NamedAtom("CA".to_string())
    }

    fn structure(atoms: &[(&str, &str, &str, [f64; 3])]) -> Structure {
        let mut structure = Structure::new();
        for (i, (chain, residue, name, [x, y, z])) in atoms.iter().enumerate() {
            structure
                .chain_entry(chain)
                .residue_entry(residue, "ALA")
                .insert_atom(Atom::new(&(i + 1).to_string(), name, Point3::new(*x, *y, *z)));
        }
        structure
    }

    #[test]
    fn single_displaced_alpha_carbon_gives_its_distance() {
        let reference = structure(&[("A", "1", "CA", [0.0, 0.0, 0.0])]);
        let frame = structure(&[("A", "1", "CA", [3.0, 4.0, 0.0])]);

        let rmsd = rmsd_domain(
            reference.chain("A").unwrap(),
            frame.chain("A").unwrap(),
            &ca(),
        )
        .unwrap();
        assert!((rmsd - 5.0).abs() < EPS);
    }

    #[test]
    fn rmsd_of_structure_with_itself_is_zero_in_every_mode() {
        let s = structure(&[
            ("A", "1", "N", [0.1, 0.2, 0.3]),
            ("A", "1", "CA", [1.0, 2.0, 3.0]),
            ("A", "2", "CA", [-4.0, 5.5, 1.25]),
            ("B", "10", "P", [7.0, 8.0, 9.0]),
        ]);
        for mode in [RmsdMode::CenterOfMass, ca(), RmsdMode::NamedAtom("P".into())] {
            assert_eq!(rmsd_whole(&s, &s, &mode).unwrap(), 0.0);
        }
    }

    #[test]
    fn whole_rmsd_averages_over_every_chain() {
        let reference = structure(&[
            ("A", "1", "CA", [0.0, 0.0, 0.0]),
            ("B", "1", "CA", [0.0, 0.0, 0.0]),
        ]);
        let frame = structure(&[
            ("A", "1", "CA", [2.0, 0.0, 0.0]),
            ("B", "1", "CA", [0.0, 0.0, 0.0]),
        ]);
        let rmsd = rmsd_whole(&reference, &frame, &ca()).unwrap();
        assert!((rmsd - 2.0_f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn center_of_mass_mode_compares_centroids() {
        let reference = structure(&[
            ("A", "1", "N", [0.0, 0.0, 0.0]),
            ("A", "1", "CA", [2.0, 0.0, 0.0]),
        ]);
        let frame = structure(&[
            ("A", "1", "N", [0.0, 1.0, 0.0]),
            ("A", "1", "CA", [2.0, 1.0, 0.0]),
        ]);
        let rmsd = rmsd_whole(&reference, &frame, &RmsdMode::CenterOfMass).unwrap();
        assert!((rmsd - 1.0).abs() < EPS);
    }

    #[test]
    fn reference_residues_without_the_named_atom_are_not_counted() {
        let reference = structure(&[
            ("A", "1", "CA", [0.0, 0.0, 0.0]),
            ("A", "2", "N", [0.0, 0.0, 0.0]),
        ]);
        let frame = structure(&[
            ("A", "1", "CA", [1.0, 0.0, 0.0]),
            ("A", "2", "N", [50.0, 0.0, 0.0]),
        ]);
        let rmsd = rmsd_whole(&reference, &frame, &ca()).unwrap();
        assert!((rmsd - 1.0).abs() < EPS);
    }

    #[test]
    fn missing_counterpart_atom_is_a_key_mismatch() {
        let reference = structure(&[("A", "1", "CA", [0.0, 0.0, 0.0])]);
        let frame = structure(&[("A", "1", "N", [0.0, 0.0, 0.0])]);

        let err = rmsd_whole(&reference, &frame, &ca()).unwrap_err();
        assert_eq!(
            err,
            EngineError::KeyMismatch(MissingKey::Atom {
                spec: ResidueSpecifier::new("A", "1"),
                atom: "CA".to_string(),
            })
        );
    }

    #[test]
    fn missing_counterpart_chain_or_residue_is_a_key_mismatch() {
        let reference = structure(&[
            ("A", "1", "CA", [0.0, 0.0, 0.0]),
            ("B", "1", "CA", [0.0, 0.0, 0.0]),
        ]);
        let only_a = structure(&[("A", "1", "CA", [0.0, 0.0, 0.0])]);
        assert_eq!(
            rmsd_whole(&reference, &only_a, &ca()).unwrap_err(),
            EngineError::KeyMismatch(MissingKey::Chain("B".to_string()))
        );

        let other_residue = structure(&[("A", "2", "CA", [0.0, 0.0, 0.0])]);
        assert_eq!(
            rmsd_domain(
                reference.chain("A").unwrap(),
                other_residue.chain("A").unwrap(),
                &ca()
            )
            .unwrap_err(),
            EngineError::KeyMismatch(MissingKey::Residue(ResidueSpecifier::new("A", "1")))
        );
    }

    #[test]
    fn zero_eligible_pairs_is_an_empty_comparison() {
        let reference = structure(&[("A", "1", "N", [0.0, 0.0, 0.0])]);
        let err = rmsd_whole(&reference, &reference, &ca()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyComparison { .. }));

        let empty = Structure::new();
        let err = rmsd_whole(&empty, &empty, &RmsdMode::CenterOfMass).unwrap_err();
        assert!(matches!(err, EngineError::EmptyComparison { .. }));
    }
}
