use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use rnpdyn::core::io::pdb::{PdbFile, PdbReadOptions};
use rnpdyn::core::io::traits::MolecularFile;
use rnpdyn::core::models::trajectory::Trajectory;
use std::fmt::{self, Write};
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    let options = if args.chains.is_empty() {
        PdbReadOptions::all_chains()
    } else {
        PdbReadOptions::new(args.chains.iter().cloned())
    };

    info!("Reading {:?}", &args.input);
    let trajectory = PdbFile::read_trajectory_from_path(&args.input, &options).map_err(|e| {
        CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        }
    })?;

    let summary = summarize(&trajectory).map_err(|e| CliError::Other(e.into()))?;
    print!("{}", summary);
    Ok(())
}

/// Frame count and id range, then the domains of the first frame.
fn summarize(trajectory: &Trajectory) -> std::result::Result<String, fmt::Error> {
    let mut out = String::new();
    if trajectory.frames().all(|(_, structure)| structure.is_empty()) {
        out.push_str("No ATOM records found.\n");
        return Ok(out);
    }
    let mut ids = trajectory.frame_ids();
    let Some(first_id) = ids.next() else {
        return Ok(out);
    };
    let last_id = ids.last().unwrap_or(first_id);

    writeln!(
        out,
        "Frames: {} (MODEL {} to {})",
        trajectory.len(),
        first_id,
        last_id
    )?;
    if let Some(structure) = trajectory.frame(first_id) {
        for chain in structure.chains() {
            writeln!(
                out,
                "Domain {:<4} {:>5} residues {:>7} atoms",
                chain.id,
                chain.len(),
                chain.atom_count()
            )?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTI_FRAME: &[&str] = &[
        "MODEL        1",
        "ATOM      1  CA  ARG    41       0.000   0.000   0.000  1.00  0.00      A1  ",
        "ATOM      2  CB  ARG    41       1.000   0.000   0.000  1.00  0.00      A1  ",
        "ATOM      3  P     G    32       5.000   0.000   0.000  1.00  0.00      B   ",
        "ENDMDL",
        "MODEL        2",
        "ATOM      1  CA  ARG    41       0.100   0.000   0.000  1.00  0.00      A1  ",
        "ATOM      2  CB  ARG    41       1.100   0.000   0.000  1.00  0.00      A1  ",
        "ATOM      3  P     G    32       5.100   0.000   0.000  1.00  0.00      B   ",
        "ENDMDL",
    ];

    #[test]
    fn summary_lists_frames_and_domains() {
        let trajectory =
            PdbFile::parse_trajectory_lines(MULTI_FRAME, &PdbReadOptions::all_chains()).unwrap();
        let summary = summarize(&trajectory).unwrap();
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines[0], "Frames: 2 (MODEL 1 to 2)");
        assert_eq!(lines[1], "Domain A1       1 residues       2 atoms");
        assert_eq!(lines[2], "Domain B        1 residues       1 atoms");
    }

    #[test]
    fn chain_filter_restricts_the_summary() {
        let options = PdbReadOptions::new(["B"]);
        let trajectory = PdbFile::parse_trajectory_lines(MULTI_FRAME, &options).unwrap();
        let summary = summarize(&trajectory).unwrap();
        assert!(!summary.contains("A1"));
        assert!(summary.contains("Domain B"));
    }

    #[test]
    fn empty_input_is_reported() {
        let lines = ["REMARK no coordinates"];
        let trajectory =
            PdbFile::parse_trajectory_lines(&lines, &PdbReadOptions::all_chains()).unwrap();
        assert_eq!(summarize(&trajectory).unwrap(), "No ATOM records found.\n");
    }
}
