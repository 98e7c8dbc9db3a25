//! # Engine Module
//!
//! Numerical analyses over parsed structures: the per-residue reductions, the
//! RMSD kernel and residue-to-residue distances that the [`workflows`] layer
//! repeats over every frame of a trajectory.
//!
//! - **Configuration** ([`config`]) - Reduction modes, residue specifiers and
//!   the validated parameter sets of each analysis
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Comparison and lookup failures
//! - **Tasks** ([`tasks`]) - RMSD and distance kernels on single structures
//!
//! [`workflows`]: crate::workflows

pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
