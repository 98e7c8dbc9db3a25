use super::frames::map_frames;
use crate::core::models::structure::Structure;
use crate::core::models::trajectory::{FrameId, Trajectory};
use crate::engine::config::RmsdMode;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::rmsd::{rmsd_domain, rmsd_whole};
use std::io::{self, Write};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRmsd {
    pub frame: FrameId,
    pub global: f64,
    /// One value per requested domain, in request order.
    pub domains: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RmsdSeries {
    pub mode: RmsdMode,
    pub frames: Vec<FrameRmsd>,
}

impl RmsdSeries {
    /// Writes one `Model` line per frame followed by its per-domain values.
    pub fn write_report<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for frame in &self.frames {
            writeln!(writer, "Model {}\t{}", frame.frame, frame.global)?;
            for (domain, rmsd) in &frame.domains {
                writeln!(writer, "\t{}\t{}", domain, rmsd)?;
            }
        }
        Ok(())
    }
}

/// Computes the RMSD of every frame against a reference structure.
///
/// # Errors
///
/// [`EngineError::EmptyComparison`] for an empty trajectory, or any error of
/// the RMSD kernel for a frame.
#[instrument(skip_all, name = "rmsd_workflow")]
pub fn run(
    reference: &Structure,
    trajectory: &Trajectory,
    domains: &[String],
    mode: &RmsdMode,
    reporter: &ProgressReporter,
) -> Result<RmsdSeries, EngineError> {
    if trajectory.is_empty() {
        return Err(EngineError::empty("the trajectory has no frames"));
    }
    reporter.report(Progress::PhaseStart { name: "RMSD" });
    reporter.message(format!("Analyzing {} frames", trajectory.len()));
    info!(
        frames = trajectory.len(),
        domains = domains.len(),
        mode = %mode,
        "Computing RMSD series."
    );

    let reference_domains = domains
        .iter()
        .map(|id| {
            reference
                .chain(id)
                .ok_or_else(|| EngineError::missing_chain(id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let results = map_frames(trajectory, reporter, |_, frame| {
        let global = rmsd_whole(reference, frame, mode)?;
        let domains = reference_domains
            .iter()
            .map(|chain| {
                let counterpart = frame
                    .chain(&chain.id)
                    .ok_or_else(|| EngineError::missing_chain(&chain.id))?;
                Ok((chain.id.clone(), rmsd_domain(chain, counterpart, mode)?))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        Ok((global, domains))
    })?;

    let frames = results
        .into_iter()
        .map(|(frame, (global, domains))| FrameRmsd {
            frame,
            global,
            domains,
        })
        .collect();

    reporter.report(Progress::PhaseFinish);
    info!("RMSD series complete.");

    Ok(RmsdSeries {
        mode: mode.clone(),
        frames,
    })
}
