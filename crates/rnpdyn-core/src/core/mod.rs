//! # Core Module
//!
//! The foundation of the library: the in-memory structure model, coordinate
//! file I/O and the geometry kernel that every analysis is built on.
//!
//! ## Architecture
//!
//! - **Structure Model** ([`models`]) - Trajectory, structures, chains, residues and atoms
//! - **File I/O** ([`io`]) - Fixed-column PDB reading (single and multi-frame) and writing
//! - **Geometry** ([`utils::geometry`]) - Distances and unweighted centers of mass
//!
//! Everything here is stateless apart from the structures themselves; parsing
//! state is scoped to a single builder so repeated parses never influence
//! each other.

pub mod io;
pub mod models;
pub mod utils;
