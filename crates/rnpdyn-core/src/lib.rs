//! # rnpdyn Core Library
//!
//! Structural analysis of protein–RNA molecular-dynamics trajectories stored as
//! fixed-column PDB text.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** The chain → residue → atom data model, the
//!   PDB reader and writer, and the point geometry everything else is built on.
//!
//! - **[`engine`]: The Kernels.** Typed analysis settings, the RMSD and
//!   residue-distance computations on single structures, and progress events.
//!
//! - **[`workflows`]: The Public API.** Complete analyses over a trajectory:
//!   RMSD series, interface frequencies and contact durations, each with a
//!   plain-text report.

pub mod core;
pub mod engine;
pub mod workflows;
