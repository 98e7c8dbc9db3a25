use crate::cli::AnalyzeArgs;
use crate::config::{OutputPaths, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use rnpdyn::{
    core::io::{
        pdb::{PdbError, PdbFile},
        traits::{MolecularFile, write_atomically},
    },
    engine::{progress::ProgressReporter, tasks::distance::distance_matrix},
    workflows,
};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use tracing::info;

pub fn run(args: AnalyzeArgs, quiet: bool) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args)?;
    ensure_outputs_writable(&config.outputs, config.force)?;

    info!("Loading reference structure from {:?}", &config.reference_path);
    let reference = PdbFile::read_structure_from_path(&config.reference_path, &config.read_options)
        .map_err(|e| parsing_error(&config.reference_path, e))?;
    info!("Loading trajectory from {:?}", &config.trajectory_path);
    let mut trajectory =
        PdbFile::read_trajectory_from_path(&config.trajectory_path, &config.read_options)
            .map_err(|e| parsing_error(&config.trajectory_path, e))?;
    println!(
        "Loaded reference ({} atoms) and {} frame(s).",
        reference.atom_count(),
        trajectory.len()
    );

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    std::fs::create_dir_all(&config.outputs.directory)?;
    let interface_config = &config.interface;

    // === RMSD series ===
    // Per-domain RMSD covers the protein domains; RNA residues carry no CA.
    let series = workflows::rmsd::run(
        &reference,
        &trajectory,
        &interface_config.protein_domains,
        &config.rmsd_mode,
        &reporter,
    )?;
    write_output(&config.outputs.rmsd_report, |w| series.write_report(w))?;
    println!(
        "✓ RMSD series written to: {}",
        config.outputs.rmsd_report.display()
    );

    // === Reference distance matrices ===
    for (domain, path) in &config.outputs.distance_matrices {
        let matrix = distance_matrix(
            &reference,
            domain,
            &interface_config.rna_domain,
            &interface_config.mode,
        )?;
        write_atomically(path, |w| {
            matrix.write_tsv(w).map_err(|e| CliError::FileWriting {
                path: path.clone(),
                source: e.into(),
            })
        })?;
        println!(
            "✓ Distance matrix {} / {} written to: {}",
            domain,
            interface_config.rna_domain,
            path.display()
        );
    }

    // === Interface frequencies ===
    let analysis = workflows::interface::run(&trajectory, interface_config, &reporter)?;
    write_output(&config.outputs.interface_report, |w| analysis.write_report(w))?;
    println!(
        "✓ Interface frequencies written to: {}",
        config.outputs.interface_report.display()
    );

    if let Some(path) = &config.outputs.annotated_pdb {
        analysis.annotate(&mut trajectory);
        PdbFile::write_trajectory_to_path(&trajectory, path).map_err(|e| {
            CliError::FileWriting {
                path: path.clone(),
                source: e.into(),
            }
        })?;
        println!("✓ Annotated trajectory written to: {}", path.display());
    }

    // === Contact times ===
    if let (Some(contact_config), Some(path)) = (&config.contacts, &config.outputs.contact_report) {
        let contacts = workflows::contact::run(&trajectory, contact_config, &reporter)?;
        write_output(path, |w| {
            workflows::contact::write_report(&contacts, &config.time_unit, w)
        })?;
        println!("✓ Contact times written to: {}", path.display());
    }

    Ok(())
}

fn parsing_error(path: &Path, e: PdbError) -> CliError {
    CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    }
}

/// Fails before any computation if an output would overwrite an existing file.
fn ensure_outputs_writable(outputs: &OutputPaths, force: bool) -> Result<()> {
    if force {
        return Ok(());
    }
    match outputs.all().find(|path| path.exists()) {
        Some(path) => Err(CliError::OutputExists(path.clone())),
        None => Ok(()),
    }
}

fn write_output<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
    write_atomically::<_, io::Error, _>(path, write).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use rnpdyn::core::models::atom::Atom;
    use rnpdyn::core::models::structure::Structure;
    use rnpdyn::core::models::trajectory::Trajectory;
    use rnpdyn::engine::config::RmsdMode;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn complex(rna_x: f64) -> Structure {
        let mut s = Structure::new();
        let residue = s.chain_entry("A1").residue_entry("41", "ARG");
        residue.insert_atom(Atom::new("1", "N", Point3::new(-0.5, 0.0, 0.0)));
        residue.insert_atom(Atom::new("2", "CA", Point3::new(0.5, 0.0, 0.0)));
        s.chain_entry("B")
            .residue_entry("32", "G")
            .insert_atom(Atom::new("3", "P", Point3::new(rna_x, 0.0, 0.0)));
        s
    }

    fn write_inputs() -> (TempDir, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("ref.pdb");
        let trajectory = dir.path().join("traj.pdb");
        PdbFile::write_structure_to_path(&complex(3.0), &reference).unwrap();
        let frames: Trajectory = [(1, complex(3.0)), (2, complex(20.0))].into_iter().collect();
        PdbFile::write_trajectory_to_path(&frames, &trajectory).unwrap();
        (dir, reference, trajectory)
    }

    fn args(dir: &Path, reference: PathBuf, trajectory: PathBuf) -> AnalyzeArgs {
        AnalyzeArgs {
            reference: Some(reference),
            trajectory: Some(trajectory),
            protein_domains: vec!["A1".to_string()],
            rna_domain: Some("B".to_string()),
            threshold: Some(5.0),
            pairs: vec!["A1:41=B:32".parse().unwrap()],
            duration: Some(10.0),
            output_dir: Some(dir.join("results")),
            ..Default::default()
        }
    }

    #[test]
    fn full_analysis_writes_every_report() {
        let (dir, reference, trajectory) = write_inputs();
        run(args(dir.path(), reference, trajectory), true).unwrap();

        let out = dir.path().join("results");
        let rmsd = fs::read_to_string(out.join("rmsd.txt")).unwrap();
        assert!(rmsd.starts_with("Model 1\t0\n\tA1\t0\nModel 2\t"));
        assert!(!rmsd.contains("\tB\t"));

        let interface = fs::read_to_string(out.join("interface_frequencies.txt")).unwrap();
        assert_eq!(interface, "Domain A1\n\tResidue\tFrequency\n\t41\t0.5\n");

        let contacts = fs::read_to_string(out.join("contact_times.txt")).unwrap();
        assert_eq!(
            contacts,
            "Residue 41 (domain A1) - Residue 32 (domain B) : 5 ns\n"
        );

        let matrix = fs::read_to_string(out.join("distance_matrix_A1_B.tsv")).unwrap();
        assert_eq!(matrix, "A1/B\t32\n41\t3.000\n");

        let annotated = fs::read_to_string(out.join("interface.pdb")).unwrap();
        assert!(annotated.contains("ENDMDL"));
        let first_atom = annotated.lines().find(|l| l.starts_with("ATOM")).unwrap();
        assert_eq!(&first_atom[60..66], "  1.00");
    }

    #[test]
    fn alpha_carbon_rmsd_runs_on_protein_rna_input() {
        let (dir, reference, trajectory) = write_inputs();
        let mut ca = args(dir.path(), reference, trajectory);
        ca.rmsd_mode = Some(RmsdMode::NamedAtom("CA".into()));
        run(ca, true).unwrap();

        let rmsd = fs::read_to_string(dir.path().join("results").join("rmsd.txt")).unwrap();
        assert_eq!(rmsd, "Model 1\t0\n\tA1\t0\nModel 2\t0\n\tA1\t0\n");
    }

    #[test]
    fn existing_output_is_not_overwritten_without_force() {
        let (dir, reference, trajectory) = write_inputs();
        let out = dir.path().join("results");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("rmsd.txt"), "keep me").unwrap();

        let result = run(args(dir.path(), reference.clone(), trajectory.clone()), true);
        assert!(matches!(result, Err(CliError::OutputExists(_))));
        assert_eq!(fs::read_to_string(out.join("rmsd.txt")).unwrap(), "keep me");

        let mut forced = args(dir.path(), reference, trajectory);
        forced.force = true;
        run(forced, true).unwrap();
        assert_ne!(fs::read_to_string(out.join("rmsd.txt")).unwrap(), "keep me");
    }

    #[test]
    fn missing_input_is_a_parsing_error_naming_the_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.pdb");
        let result = run(args(dir.path(), missing.clone(), missing.clone()), true);
        match result {
            Err(CliError::FileParsing { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected a parsing error, got {:?}", other.err()),
        }
    }
}
