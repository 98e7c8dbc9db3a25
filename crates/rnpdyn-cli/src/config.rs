//! Analysis settings assembled from built-in defaults, an optional TOML file
//! and command-line overrides, in increasing order of precedence.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::{AppConfig, OutputPaths};
