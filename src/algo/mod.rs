//! Mesh deformation algorithms.
//!
//! - **ARAP**: as-rigid-as-possible shape manipulation with pinned vertices

pub mod arap;
