//! # Core Models Module
//!
//! In-memory representation of parsed conformations.
//!
//! ## Overview
//!
//! A [`trajectory::Trajectory`] owns one [`structure::Structure`] per frame. Each
//! structure owns its [`chain::Chain`]s (protein domains and the RNA molecule),
//! each chain owns its [`residue::Residue`]s and each residue owns its
//! [`atom::Atom`]s. Nothing is shared between frames.
//!
//! Chains, residues and atoms are keyed by the strings found in the source file
//! and additionally remember the order in which each key was first seen. That
//! order drives iteration, report layout and re-serialization, and is stable
//! across repeated parses of the same input.
//!
//! ## Key Components
//!
//! - [`atom`] - Atom serial, name, coordinates and export marker
//! - [`residue`] - Named atom container with insertion order
//! - [`chain`] - Domain with residues in insertion order
//! - [`structure`] - One conformation (reference or frame)
//! - [`trajectory`] - Frames ordered by MODEL number
//! - [`builder`] - Single-parse builder holding the filtering state
//!
//! ## Usage
//!
//! ```ignore
//! use rnpdyn::core::models::{builder::{DuplicatePolicy, StructureBuilder}, atom::Atom};
//!
//! let chains = ["A".to_string()].into_iter().collect();
//! let mut builder = StructureBuilder::new(&chains, DuplicatePolicy::default());
//! builder.add_atom("A", "1", "ALA", Atom::new("1", "CA", Point3::origin()))?;
//! let structure = builder.build();
//! ```

pub mod atom;
pub mod builder;
pub mod chain;
pub mod residue;
pub mod structure;
pub mod trajectory;
