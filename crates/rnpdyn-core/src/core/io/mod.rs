//! Provides input/output functionality for coordinate files.
//!
//! This module contains the fixed-column PDB reader and writer used for both
//! reference structures and multi-frame trajectories, behind a trait-based
//! interface that also offers path helpers and atomic file replacement.

pub mod pdb;
pub mod traits;
