pub struct DefaultsConfig {
    pub threshold: f64,
    pub rmsd_mode: &'static str,
    pub distance_mode: &'static str,
    pub time_unit: &'static str,
    pub output_dir: &'static str,
    pub annotated_pdb: bool,
    pub distance_matrices: bool,
    pub rmsd_report: &'static str,
    pub interface_report: &'static str,
    pub annotated_pdb_file: &'static str,
    pub contact_report: &'static str,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            threshold: 9.0,
            rmsd_mode: "CM",
            distance_mode: "CM",
            time_unit: "ns",
            output_dir: ".",
            annotated_pdb: true,
            distance_matrices: true,
            rmsd_report: "rmsd.txt",
            interface_report: "interface_frequencies.txt",
            annotated_pdb_file: "interface.pdb",
            contact_report: "contact_times.txt",
        }
    }
}
