use super::frames::map_frames;
use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use crate::core::models::trajectory::{FrameId, Trajectory};
use crate::engine::config::{InterfaceConfig, ResidueSpecifier};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::distance::residue_distance_checked;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, Write};
use tracing::{debug, info, instrument};

/// Annotation written on residues that belong to the interface in a frame.
pub const IN_INTERFACE: f64 = 1.0;
/// Annotation written on processed residues outside the interface.
pub const OUT_OF_INTERFACE: f64 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ResidueFrequency {
    pub residue: String,
    /// Number of frames in which the residue was within the threshold.
    pub frames_in_interface: usize,
    /// `frames_in_interface` divided by the number of frames, in `[0, 1]`.
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainInterface {
    pub domain: String,
    /// Every residue of the domain, in first-seen order across frames.
    pub residues: Vec<ResidueFrequency>,
}

impl DomainInterface {
    pub fn nonzero(&self) -> impl Iterator<Item = &ResidueFrequency> {
        self.residues.iter().filter(|r| r.frames_in_interface > 0)
    }
}

#[derive(Debug, Default)]
struct FrameInterface {
    /// Per protein domain, each residue id with its membership in this frame.
    domains: Vec<Vec<(String, bool)>>,
    /// RNA residues within the threshold of at least one protein residue.
    rna_hits: HashSet<String>,
}

/// Interface membership of protein residues over a trajectory.
///
/// Computing the analysis leaves the trajectory untouched; call
/// [`annotate`](Self::annotate) to write the per-frame membership markers.
#[derive(Debug)]
pub struct InterfaceAnalysis {
    pub frame_count: usize,
    pub domains: Vec<DomainInterface>,
    rna_domain: String,
    members: BTreeMap<FrameId, HashSet<ResidueSpecifier>>,
}

impl InterfaceAnalysis {
    pub fn domain(&self, id: &str) -> Option<&DomainInterface> {
        self.domains.iter().find(|d| d.domain == id)
    }

    /// Whether a residue was part of the interface in a given frame.
    pub fn is_member(&self, frame: FrameId, spec: &ResidueSpecifier) -> bool {
        self.members
            .get(&frame)
            .is_some_and(|members| members.contains(spec))
    }

    /// Writes the binary membership marker onto every processed residue (and
    /// its atoms) of every analyzed frame.
    ///
    /// Frames of `trajectory` that were not part of the analysis are left
    /// unchanged, as are domains that were not processed.
    pub fn annotate(&self, trajectory: &mut Trajectory) {
        let processed: Vec<&str> = self
            .domains
            .iter()
            .map(|d| d.domain.as_str())
            .chain(std::iter::once(self.rna_domain.as_str()))
            .collect();

        for (frame_id, structure) in trajectory.frames_mut() {
            let Some(members) = self.members.get(&frame_id) else {
                continue;
            };
            for domain in &processed {
                let Some(chain) = structure.chain_mut(domain) else {
                    continue;
                };
                let chain_id = chain.id.clone();
                for residue_id in chain.residue_ids().to_vec() {
                    let spec = ResidueSpecifier::new(&chain_id, &residue_id);
                    let marker = if members.contains(&spec) {
                        IN_INTERFACE
                    } else {
                        OUT_OF_INTERFACE
                    };
                    if let Some(residue) = chain.residue_mut(&residue_id) {
                        residue.annotate(marker);
                    }
                }
            }
        }
    }

    /// Writes the frequency table of each protein domain, omitting residues
    /// that never reached the interface.
    pub fn write_report<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for domain in &self.domains {
            writeln!(writer, "Domain {}", domain.domain)?;
            writeln!(writer, "\tResidue\tFrequency")?;
            for residue in domain.nonzero() {
                writeln!(writer, "\t{}\t{}", residue.residue, residue.frequency)?;
            }
        }
        Ok(())
    }
}

/// Computes how often each protein residue lies within `threshold` of the
/// RNA domain.
///
/// For every frame and protein residue, the distance to every RNA residue is
/// computed under the configured mode and the minimum is compared with the
/// threshold (inclusive).
///
/// # Errors
///
/// - [`EngineError::EmptyComparison`] for an empty trajectory.
/// - [`EngineError::KeyMismatch`] if a frame lacks a configured domain.
/// - Any residue error of the distance kernel.
#[instrument(skip_all, name = "interface_workflow")]
pub fn run(
    trajectory: &Trajectory,
    config: &InterfaceConfig,
    reporter: &ProgressReporter,
) -> Result<InterfaceAnalysis, EngineError> {
    if trajectory.is_empty() {
        return Err(EngineError::empty("the trajectory has no frames"));
    }
    reporter.report(Progress::PhaseStart { name: "Interface" });
    reporter.message(format!("Analyzing {} frames", trajectory.len()));
    info!(
        frames = trajectory.len(),
        domains = ?config.protein_domains,
        rna = %config.rna_domain,
        threshold = config.threshold,
        mode = %config.mode,
        "Computing interface frequencies."
    );

    let per_frame = map_frames(trajectory, reporter, |id, frame| {
        analyze_frame(id, frame, config)
    })?;

    let analysis = merge(per_frame, config);

    reporter.report(Progress::PhaseFinish);
    info!(
        residues = analysis
            .domains
            .iter()
            .map(|d| d.nonzero().count())
            .sum::<usize>(),
        "Interface analysis complete."
    );
    Ok(analysis)
}

fn domain_of<'s>(
    structure: &'s Structure,
    id: &str,
) -> Result<Vec<(&'s str, &'s Residue)>, EngineError> {
    structure
        .chain(id)
        .map(|chain| chain.residues().collect())
        .ok_or_else(|| EngineError::missing_chain(id))
}

fn analyze_frame(
    frame_id: FrameId,
    structure: &Structure,
    config: &InterfaceConfig,
) -> Result<FrameInterface, EngineError> {
    let rna = domain_of(structure, &config.rna_domain)?;
    if rna.is_empty() {
        return Err(EngineError::empty(format!(
            "RNA domain '{}' has no residues in frame {}",
            config.rna_domain, frame_id
        )));
    }
    let rna_specs: Vec<ResidueSpecifier> = rna
        .iter()
        .map(|(id, _)| ResidueSpecifier::new(&config.rna_domain, id))
        .collect();

    let mut result = FrameInterface::default();
    for domain in &config.protein_domains {
        let mut memberships = Vec::new();
        for (residue_id, residue) in domain_of(structure, domain)? {
            let spec = ResidueSpecifier::new(domain, residue_id);
            let mut nearest = f64::INFINITY;
            for ((_, rna_residue), rna_spec) in rna.iter().zip(&rna_specs) {
                let d = residue_distance_checked(
                    (&spec, residue),
                    (rna_spec, *rna_residue),
                    &config.mode,
                )?;
                if d <= config.threshold {
                    result.rna_hits.insert(rna_spec.residue.clone());
                }
                nearest = nearest.min(d);
            }
            memberships.push((residue_id.to_string(), nearest <= config.threshold));
        }
        result.domains.push(memberships);
    }

    debug!(
        frame = frame_id,
        rna_contacts = result.rna_hits.len(),
        "Frame analyzed."
    );
    Ok(result)
}

fn merge(
    per_frame: Vec<(FrameId, FrameInterface)>,
    config: &InterfaceConfig,
) -> InterfaceAnalysis {
    let frame_count = per_frame.len();
    let mut counts: Vec<(Vec<String>, HashMap<String, usize>)> =
        vec![(Vec::new(), HashMap::new()); config.protein_domains.len()];
    let mut members = BTreeMap::new();

    for (frame_id, frame) in per_frame {
        let mut frame_members = HashSet::new();
        for ((domain, memberships), (order, count)) in config
            .protein_domains
            .iter()
            .zip(frame.domains)
            .zip(counts.iter_mut())
        {
            for (residue_id, is_member) in memberships {
                let entry = count.entry(residue_id.clone()).or_insert_with(|| {
                    order.push(residue_id.clone());
                    0
                });
                if is_member {
                    *entry += 1;
                    frame_members.insert(ResidueSpecifier::new(domain, &residue_id));
                }
            }
        }
        for rna_residue in frame.rna_hits {
            frame_members.insert(ResidueSpecifier::new(&config.rna_domain, &rna_residue));
        }
        members.insert(frame_id, frame_members);
    }

    let domains = config
        .protein_domains
        .iter()
        .zip(counts)
        .map(|(domain, (order, count))| DomainInterface {
            domain: domain.clone(),
            residues: order
                .into_iter()
                .map(|residue| {
                    let frames_in_interface = count.get(&residue).copied().unwrap_or(0);
                    ResidueFrequency {
                        frequency: frames_in_interface as f64 / frame_count as f64,
                        frames_in_interface,
                        residue,
                    }
                })
                .collect(),
        })
        .collect();

    InterfaceAnalysis {
        frame_count,
        domains,
        rna_domain: config.rna_domain.clone(),
        members,
    }
}
