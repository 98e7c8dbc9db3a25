use rnpdyn::engine::config::ConfigError;
use rnpdyn::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Analysis(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write file '{path}': {source}", path = path.display())]
    FileWriting {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Output file '{}' already exists (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_exists_suggests_force() {
        let err = CliError::OutputExists(PathBuf::from("out/rmsd.txt"));
        assert_eq!(
            err.to_string(),
            "Output file 'out/rmsd.txt' already exists (use --force to overwrite)"
        );
    }

    #[test]
    fn config_errors_become_configuration_messages() {
        let err: CliError = ConfigError::MissingParameter("rna_domain").into();
        assert!(matches!(&err, CliError::Config(msg) if msg.contains("rna_domain")));
    }
}
