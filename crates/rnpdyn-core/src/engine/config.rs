use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Invalid {kind} '{value}': {reason}")]
pub struct ParseSpecError {
    pub kind: &'static str,
    pub value: String,
    pub reason: &'static str,
}

const MAX_ATOM_NAME_LEN: usize = 4;

fn is_atom_name(s: &str) -> bool {
    !s.is_empty() && s.len() <= MAX_ATOM_NAME_LEN && !s.contains(char::is_whitespace)
}

/// Identifies one residue by its domain (segment) id and sequence id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueSpecifier {
    pub domain: String,
    pub residue: String,
}

impl ResidueSpecifier {
    pub fn new(domain: &str, residue: &str) -> Self {
        Self {
            domain: domain.to_string(),
            residue: residue.to_string(),
        }
    }
}

impl fmt::Display for ResidueSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "residue {} of domain '{}'", self.residue, self.domain)
    }
}

impl FromStr for ResidueSpecifier {
    type Err = ParseSpecError;

    /// Parses `DOMAIN:RESIDUE`, e.g. `A4:41`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseSpecError {
            kind: "residue specifier",
            value: s.to_string(),
            reason,
        };
        let (domain, residue) = s.split_once(':').ok_or_else(|| err("expected DOMAIN:RESIDUE"))?;
        let (domain, residue) = (domain.trim(), residue.trim());
        if domain.is_empty() || residue.is_empty() {
            return Err(err("domain and residue must both be non-empty"));
        }
        Ok(Self::new(domain, residue))
    }
}

/// Two residues whose contact is tracked through a trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactPair {
    pub first: ResidueSpecifier,
    pub second: ResidueSpecifier,
}

impl ContactPair {
    pub fn new(first: ResidueSpecifier, second: ResidueSpecifier) -> Self {
        Self { first, second }
    }
}

impl FromStr for ContactPair {
    type Err = ParseSpecError;

    /// Parses `DOMAIN:RESIDUE=DOMAIN:RESIDUE`, e.g. `A4:41=B:32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (first, second) = s.split_once('=').ok_or_else(|| ParseSpecError {
            kind: "contact pair",
            value: s.to_string(),
            reason: "expected DOMAIN:RESIDUE=DOMAIN:RESIDUE",
        })?;
        Ok(Self::new(first.parse()?, second.parse()?))
    }
}

/// How each residue is reduced to a point when computing an RMSD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RmsdMode {
    /// Unweighted center of mass of all atoms of the residue.
    #[default]
    CenterOfMass,
    /// A single atom picked by name (e.g. "CA" for alpha carbons).
    NamedAtom(String),
}

impl FromStr for RmsdMode {
    type Err = ParseSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CM" | "cm" | "com" => Ok(RmsdMode::CenterOfMass),
            "atom" => Err(ParseSpecError {
                kind: "RMSD mode",
                value: s.to_string(),
                reason: "nearest-atom distances have no RMSD counterpart",
            }),
            name if is_atom_name(name) => Ok(RmsdMode::NamedAtom(name.to_string())),
            _ => Err(ParseSpecError {
                kind: "RMSD mode",
                value: s.to_string(),
                reason: "expected 'CM' or an atom name of at most four characters",
            }),
        }
    }
}

impl fmt::Display for RmsdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RmsdMode::CenterOfMass => write!(f, "CM"),
            RmsdMode::NamedAtom(name) => write!(f, "{}", name),
        }
    }
}

/// How the distance between two residues is measured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DistanceMode {
    /// Distance between the unweighted centers of mass.
    #[default]
    CenterOfMass,
    /// Smallest distance over every pair of atoms of the two residues.
    NearestAtom,
    /// Distance between the atoms with this name in each residue.
    NamedAtom(String),
}

impl FromStr for DistanceMode {
    type Err = ParseSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CM" | "cm" | "com" => Ok(DistanceMode::CenterOfMass),
            "atom" | "nearest" => Ok(DistanceMode::NearestAtom),
            name if is_atom_name(name) => Ok(DistanceMode::NamedAtom(name.to_string())),
            _ => Err(ParseSpecError {
                kind: "distance mode",
                value: s.to_string(),
                reason: "expected 'CM', 'atom' or an atom name of at most four characters",
            }),
        }
    }
}

impl fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMode::CenterOfMass => write!(f, "CM"),
            DistanceMode::NearestAtom => write!(f, "atom"),
            DistanceMode::NamedAtom(name) => write!(f, "{}", name),
        }
    }
}

fn check_threshold(threshold: f64) -> Result<f64, ConfigError> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(threshold)
    } else {
        Err(ConfigError::InvalidParameter {
            name: "threshold",
            reason: format!("expected a finite, non-negative distance, got {}", threshold),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceConfig {
    pub protein_domains: Vec<String>,
    pub rna_domain: String,
    pub threshold: f64,
    pub mode: DistanceMode,
}

#[derive(Default)]
pub struct InterfaceConfigBuilder {
    protein_domains: Option<Vec<String>>,
    rna_domain: Option<String>,
    threshold: Option<f64>,
    mode: Option<DistanceMode>,
}

impl InterfaceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protein_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protein_domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }
    pub fn rna_domain(mut self, domain: &str) -> Self {
        self.rna_domain = Some(domain.to_string());
        self
    }
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
    pub fn mode(mut self, mode: DistanceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> Result<InterfaceConfig, ConfigError> {
        let protein_domains = self
            .protein_domains
            .ok_or(ConfigError::MissingParameter("protein_domains"))?;
        if protein_domains.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "protein_domains",
                reason: "at least one protein domain is required".to_string(),
            });
        }
        let rna_domain = self
            .rna_domain
            .ok_or(ConfigError::MissingParameter("rna_domain"))?;
        if protein_domains.contains(&rna_domain) {
            return Err(ConfigError::InvalidParameter {
                name: "rna_domain",
                reason: format!("'{}' is also listed as a protein domain", rna_domain),
            });
        }
        let threshold = check_threshold(
            self.threshold
                .ok_or(ConfigError::MissingParameter("threshold"))?,
        )?;
        Ok(InterfaceConfig {
            protein_domains,
            rna_domain,
            threshold,
            mode: self.mode.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactConfig {
    pub pairs: Vec<ContactPair>,
    pub threshold: f64,
    /// Physical length of the whole trajectory, in the caller's time unit.
    pub total_duration: f64,
    pub mode: DistanceMode,
}

#[derive(Default)]
pub struct ContactConfigBuilder {
    pairs: Vec<ContactPair>,
    threshold: Option<f64>,
    total_duration: Option<f64>,
    mode: Option<DistanceMode>,
}

impl ContactConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(mut self, pair: ContactPair) -> Self {
        self.pairs.push(pair);
        self
    }
    pub fn pairs(mut self, pairs: impl IntoIterator<Item = ContactPair>) -> Self {
        self.pairs.extend(pairs);
        self
    }
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
    pub fn total_duration(mut self, duration: f64) -> Self {
        self.total_duration = Some(duration);
        self
    }
    pub fn mode(mut self, mode: DistanceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> Result<ContactConfig, ConfigError> {
        let threshold = check_threshold(
            self.threshold
                .ok_or(ConfigError::MissingParameter("threshold"))?,
        )?;
        let total_duration = self
            .total_duration
            .ok_or(ConfigError::MissingParameter("total_duration"))?;
        if !total_duration.is_finite() || total_duration < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "total_duration",
                reason: format!("expected a finite, non-negative duration, got {}", total_duration),
            });
        }
        Ok(ContactConfig {
            pairs: self.pairs,
            threshold,
            total_duration,
            mode: self.mode.unwrap_or_default(),
        })
    }
}
