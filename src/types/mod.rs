//! Shared types: the unified error enum and crate-wide `Result` alias.

pub mod error;

pub use error::{MeshError, Result};
