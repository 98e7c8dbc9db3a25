//! Single-structure analysis kernels.
//!
//! Each task works on one [`Structure`](crate::core::models::structure::Structure)
//! (or a pair of corresponding ones) and is repeated over frames by the
//! [`workflows`](crate::workflows) layer.

pub mod distance;
pub mod rmsd;
