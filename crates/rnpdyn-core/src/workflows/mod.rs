//! # Workflows Module
//!
//! Trajectory-level analyses built on the [`engine`](crate::engine) kernels.
//! Each workflow takes parsed structures, repeats a kernel over every frame in
//! ascending frame order and returns a result that can render its own report.
//!
//! - **RMSD Series** ([`rmsd`]) - Deviation of each frame from a reference,
//!   globally and per domain
//! - **Interface Frequency** ([`interface`]) - How often each protein residue
//!   lies within a threshold of the RNA, with optional per-frame annotation
//! - **Contact Time** ([`contact`]) - How long explicit residue pairs stay in
//!   contact
//!
//! With the `parallel` feature, frames are analyzed concurrently and merged in
//! frame order once every frame is done.

pub mod contact;
mod frames;
pub mod interface;
pub mod rmsd;
