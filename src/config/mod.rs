// src/config/mod.rs

//! Job configuration.
//!
//! - [`model`] holds the validated, immutable [`JobConfig`].
//! - [`validate`] turns parsed CLI arguments into a `JobConfig`.
//! - [`env`] reads and writes the `CRONNER_PARENT_*` propagation variables.

pub mod env;
pub mod model;
pub mod validate;

pub use env::ParentEnv;
pub use model::{JobConfig, lock_path_for};
