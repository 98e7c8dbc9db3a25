use rnpdyn::core::io::pdb::PdbReadOptions;
use rnpdyn::engine::config::{ContactConfig, InterfaceConfig, RmsdMode};
use std::path::PathBuf;

pub struct OutputPaths {
    pub directory: PathBuf,
    pub rmsd_report: PathBuf,
    pub interface_report: PathBuf,
    pub annotated_pdb: Option<PathBuf>,
    /// One TSV file per protein domain, paired with that domain's id.
    pub distance_matrices: Vec<(String, PathBuf)>,
    pub contact_report: Option<PathBuf>,
}

impl OutputPaths {
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.rmsd_report, &self.interface_report]
            .into_iter()
            .chain(self.annotated_pdb.as_ref())
            .chain(self.distance_matrices.iter().map(|(_, path)| path))
            .chain(self.contact_report.as_ref())
    }
}

pub struct AppConfig {
    pub reference_path: PathBuf,
    pub trajectory_path: PathBuf,
    pub read_options: PdbReadOptions,
    pub rmsd_mode: RmsdMode,
    pub interface: InterfaceConfig,
    pub contacts: Option<ContactConfig>,
    pub time_unit: String,
    pub outputs: OutputPaths,
    pub force: bool,
}
