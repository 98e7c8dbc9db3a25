use super::frames::map_frames;
use crate::core::models::trajectory::Trajectory;
use crate::engine::config::{ContactConfig, ContactPair};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::distance::distance_between;
use std::io::{self, Write};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct ContactTime {
    pub pair: ContactPair,
    pub frames_in_contact: usize,
    /// `frames_in_contact / frame_count * total_duration`.
    pub duration: f64,
}

/// Writes one line per pair, with durations suffixed by `unit`.
pub fn write_report<W: Write>(
    contacts: &[ContactTime],
    unit: &str,
    writer: &mut W,
) -> io::Result<()> {
    for contact in contacts {
        let (a, b) = (&contact.pair.first, &contact.pair.second);
        writeln!(
            writer,
            "Residue {} (domain {}) - Residue {} (domain {}) : {} {}",
            a.residue, a.domain, b.residue, b.domain, contact.duration, unit
        )?;
    }
    Ok(())
}

/// Measures, for each configured residue pair, for how long the two residues
/// stay within the contact threshold.
///
/// The trajectory is not modified.
///
/// # Errors
///
/// [`EngineError::EmptyComparison`] for an empty trajectory, or any lookup or
/// residue error of the distance kernel.
#[instrument(skip_all, name = "contact_workflow")]
pub fn run(
    trajectory: &Trajectory,
    config: &ContactConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<ContactTime>, EngineError> {
    if trajectory.is_empty() {
        return Err(EngineError::empty("the trajectory has no frames"));
    }
    reporter.report(Progress::PhaseStart {
        name: "Contact time",
    });
    reporter.message(format!("Analyzing {} frames", trajectory.len()));
    info!(
        frames = trajectory.len(),
        pairs = config.pairs.len(),
        threshold = config.threshold,
        mode = %config.mode,
        "Computing contact durations."
    );

    let per_frame = map_frames(trajectory, reporter, |_, frame| {
        config
            .pairs
            .iter()
            .map(|pair| {
                let d = distance_between(frame, &pair.first, &pair.second, &config.mode)?;
                Ok(d <= config.threshold)
            })
            .collect::<Result<Vec<bool>, EngineError>>()
    })?;

    let frame_count = per_frame.len();
    let mut counts = vec![0usize; config.pairs.len()];
    for (_, in_contact) in &per_frame {
        for (count, &hit) in counts.iter_mut().zip(in_contact) {
            if hit {
                *count += 1;
            }
        }
    }

    let contacts = config
        .pairs
        .iter()
        .zip(counts)
        .map(|(pair, frames_in_contact)| ContactTime {
            pair: pair.clone(),
            frames_in_contact,
            duration: frames_in_contact as f64 / frame_count as f64 * config.total_duration,
        })
        .collect();

    reporter.report(Progress::PhaseFinish);
    info!("Contact analysis complete.");
    Ok(contacts)
}
