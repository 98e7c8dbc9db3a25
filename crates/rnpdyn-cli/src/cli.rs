use clap::{Args, Parser, Subcommand};
use rnpdyn::engine::config::{ContactPair, DistanceMode, RmsdMode};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "rnpdyn - Structural analysis of protein-RNA molecular dynamics trajectories: RMSD, distance matrices, interface frequencies and contact times.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output and progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to analyze frames in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full analysis of a trajectory against a reference structure.
    Analyze(AnalyzeArgs),
    /// Summarize the chains, residues and frames of a PDB file.
    Inspect(InspectArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    // --- Inputs ---
    /// Path to the analysis configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// PDB file holding the reference conformation.
    #[arg(short, long, value_name = "PATH")]
    pub reference: Option<PathBuf>,

    /// PDB file holding the trajectory frames, delimited by MODEL records.
    #[arg(short, long, value_name = "PATH")]
    pub trajectory: Option<PathBuf>,

    /// Fail on repeated atoms within a residue instead of keeping the last one.
    #[arg(long)]
    pub strict: bool,

    // --- Domains ---
    /// Protein domain (segment) identifiers, comma-separated (e.g. A1,A2,A3,A4).
    #[arg(short, long, value_delimiter = ',', value_name = "IDS")]
    pub protein_domains: Vec<String>,

    /// RNA domain (segment) identifier.
    #[arg(long, value_name = "ID")]
    pub rna_domain: Option<String>,

    // --- Analysis Overrides ---
    /// Distance (in Angstrom) at or below which two residues are in contact.
    #[arg(long, value_name = "FLOAT")]
    pub threshold: Option<f64>,

    /// Residue reduction for RMSD: 'CM' (center of mass) or an atom name such as 'CA'.
    #[arg(long, value_name = "MODE")]
    pub rmsd_mode: Option<RmsdMode>,

    /// Residue distance: 'CM' (centers of mass), 'atom' (nearest atoms) or an atom name.
    #[arg(long, value_name = "MODE")]
    pub distance_mode: Option<DistanceMode>,

    // --- Contact Time ---
    /// Residue pair whose contact time is measured. Can be used multiple times.
    /// Example: --pair A4:41=B:32
    #[arg(long = "pair", value_name = "DOM:RES=DOM:RES")]
    pub pairs: Vec<ContactPair>,

    /// Physical duration of the whole trajectory, used to scale contact times.
    #[arg(long, value_name = "FLOAT")]
    pub duration: Option<f64>,

    /// Unit of --duration, echoed in the contact report.
    #[arg(long, value_name = "UNIT")]
    pub time_unit: Option<String>,

    // --- Outputs ---
    /// Directory receiving every report.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Do not export the trajectory annotated with interface membership.
    #[arg(long)]
    pub no_annotated_pdb: bool,

    /// Do not export the reference distance matrices.
    #[arg(long)]
    pub no_matrices: bool,

    /// Overwrite existing output files.
    #[arg(short, long)]
    pub force: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S analysis.threshold=7.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// PDB file to summarize.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Only consider these segment identifiers, comma-separated.
    /// Defaults to every segment in the file.
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub chains: Vec<String>,
}
