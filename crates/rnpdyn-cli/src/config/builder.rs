use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileContactPair};
use super::models::{AppConfig, OutputPaths};
use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use rnpdyn::core::io::pdb::PdbReadOptions;
use rnpdyn::core::models::builder::DuplicatePolicy;
use rnpdyn::engine::config::{
    ContactConfig, ContactConfigBuilder, ContactPair, DistanceMode, InterfaceConfigBuilder,
    ResidueSpecifier, RmsdMode,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn build_config(args: &AnalyzeArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let input_file = file_config.input.take().unwrap_or_default();
    let reference_path = args
        .reference
        .clone()
        .or(input_file.reference)
        .ok_or_else(|| missing("reference structure", "--reference", "input.reference"))?;
    let trajectory_path = args
        .trajectory
        .clone()
        .or(input_file.trajectory)
        .ok_or_else(|| missing("trajectory", "--trajectory", "input.trajectory"))?;
    let duplicate_policy = if args.strict || input_file.strict_duplicates.unwrap_or(false) {
        DuplicatePolicy::Reject
    } else {
        DuplicatePolicy::LastWriteWins
    };

    let domains_file = file_config.domains.take().unwrap_or_default();
    let protein_domains = if args.protein_domains.is_empty() {
        domains_file.protein.unwrap_or_default()
    } else {
        args.protein_domains.clone()
    };
    let rna_domain = args
        .rna_domain
        .clone()
        .or(domains_file.rna)
        .ok_or_else(|| missing("RNA domain", "--rna-domain", "domains.rna"))?;

    let analysis_file = file_config.analysis.take().unwrap_or_default();
    let threshold = args
        .threshold
        .or(analysis_file.threshold)
        .unwrap_or(defaults.threshold);
    let rmsd_mode: RmsdMode = merge_parsed(
        args.rmsd_mode.clone(),
        analysis_file.rmsd_mode.as_deref(),
        defaults.rmsd_mode,
        "analysis.rmsd-mode",
    )?;
    let distance_mode: DistanceMode = merge_parsed(
        args.distance_mode.clone(),
        analysis_file.distance_mode.as_deref(),
        defaults.distance_mode,
        "analysis.distance-mode",
    )?;

    let interface = InterfaceConfigBuilder::new()
        .protein_domains(protein_domains.iter().cloned())
        .rna_domain(&rna_domain)
        .threshold(threshold)
        .mode(distance_mode.clone())
        .build()?;

    let contacts_file = file_config.contacts.take().unwrap_or_default();
    let time_unit = args
        .time_unit
        .clone()
        .or(contacts_file.time_unit)
        .unwrap_or_else(|| defaults.time_unit.to_string());
    let pairs = if args.pairs.is_empty() {
        parse_file_pairs(&contacts_file.pairs)?
    } else {
        args.pairs.clone()
    };
    let contacts = merge_contacts(
        pairs,
        args.duration.or(contacts_file.duration),
        threshold,
        distance_mode,
    )?;

    let output_file = file_config.output.take().unwrap_or_default();
    let directory = args
        .output_dir
        .clone()
        .or(output_file.directory)
        .unwrap_or_else(|| PathBuf::from(defaults.output_dir));
    let annotated = !args.no_annotated_pdb
        && output_file
            .annotated_pdb
            .unwrap_or(defaults.annotated_pdb);
    let matrices = !args.no_matrices
        && output_file
            .distance_matrices
            .unwrap_or(defaults.distance_matrices);
    let outputs = output_paths(
        &directory,
        &defaults,
        &protein_domains,
        &rna_domain,
        annotated,
        matrices,
        contacts.is_some(),
    );

    let read_options = PdbReadOptions::new(
        protein_domains
            .iter()
            .cloned()
            .chain(std::iter::once(rna_domain.clone())),
    )
    .with_duplicate_policy(duplicate_policy);

    Ok(AppConfig {
        reference_path,
        trajectory_path,
        read_options,
        rmsd_mode,
        interface,
        contacts,
        time_unit,
        outputs,
        force: args.force,
    })
}

fn missing(what: &str, flag: &str, key: &str) -> CliError {
    CliError::Config(format!(
        "No {} given. Pass {} or set `{}` in the config file.",
        what, flag, key
    ))
}

fn merge_parsed<T>(
    cli_val: Option<T>,
    file_val: Option<&str>,
    default: &str,
    key: &str,
) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = cli_val {
        return Ok(value);
    }
    file_val
        .unwrap_or(default)
        .parse()
        .map_err(|e: T::Err| CliError::Config(format!("Invalid value for {}: {}", key, e)))
}

fn parse_file_pairs(pairs: &[FileContactPair]) -> Result<Vec<ContactPair>> {
    pairs
        .iter()
        .map(|p| {
            let parse = |s: &str| {
                s.parse::<ResidueSpecifier>()
                    .map_err(|e| CliError::Config(e.to_string()))
            };
            Ok(ContactPair::new(parse(&p.first)?, parse(&p.second)?))
        })
        .collect()
}

fn merge_contacts(
    pairs: Vec<ContactPair>,
    duration: Option<f64>,
    threshold: f64,
    mode: DistanceMode,
) -> Result<Option<ContactConfig>> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let duration = duration.ok_or_else(|| {
        missing(
            "trajectory duration for the contact pairs",
            "--duration",
            "contacts.duration",
        )
    })?;
    let config = ContactConfigBuilder::new()
        .pairs(pairs)
        .threshold(threshold)
        .total_duration(duration)
        .mode(mode)
        .build()?;
    Ok(Some(config))
}

fn output_paths(
    directory: &Path,
    defaults: &DefaultsConfig,
    protein_domains: &[String],
    rna_domain: &str,
    annotated: bool,
    matrices: bool,
    contacts: bool,
) -> OutputPaths {
    let distance_matrices = if matrices {
        protein_domains
            .iter()
            .map(|domain| {
                let name = format!("distance_matrix_{}_{}.tsv", domain, rna_domain);
                (domain.clone(), directory.join(name))
            })
            .collect()
    } else {
        Vec::new()
    };

    OutputPaths {
        directory: directory.to_path_buf(),
        rmsd_report: directory.join(defaults.rmsd_report),
        interface_report: directory.join(defaults.interface_report),
        annotated_pdb: annotated.then(|| directory.join(defaults.annotated_pdb_file)),
        distance_matrices,
        contact_report: contacts.then(|| directory.join(defaults.contact_report)),
    }
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let invalid_float =
            || CliError::Config(format!("Invalid float value for {}: {}", key, value_str));

        match key {
            "input.reference" => {
                config.input.get_or_insert_with(Default::default).reference =
                    Some(PathBuf::from(value_str));
            }
            "input.trajectory" => {
                config.input.get_or_insert_with(Default::default).trajectory =
                    Some(PathBuf::from(value_str));
            }
            "domains.protein" => {
                config.domains.get_or_insert_with(Default::default).protein =
                    Some(value_str.split(',').map(|s| s.trim().to_string()).collect());
            }
            "domains.rna" => {
                config.domains.get_or_insert_with(Default::default).rna =
                    Some(value_str.to_string());
            }
            "analysis.threshold" => {
                config.analysis.get_or_insert_with(Default::default).threshold =
                    Some(value_str.parse().map_err(|_| invalid_float())?);
            }
            "analysis.rmsd-mode" => {
                config.analysis.get_or_insert_with(Default::default).rmsd_mode =
                    Some(value_str.to_string());
            }
            "analysis.distance-mode" => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .distance_mode = Some(value_str.to_string());
            }
            "contacts.duration" => {
                config.contacts.get_or_insert_with(Default::default).duration =
                    Some(value_str.parse().map_err(|_| invalid_float())?);
            }
            "contacts.time-unit" => {
                config.contacts.get_or_insert_with(Default::default).time_unit =
                    Some(value_str.to_string());
            }
            "output.directory" => {
                config.output.get_or_insert_with(Default::default).directory =
                    Some(PathBuf::from(value_str));
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
