//! wmforge Edit Model
//!
//! Defines the data contract the command compiler consumes:
//! - **Options:** audio handling, aspect-ratio crop, and output resolution
//! - **Settings:** the full edit configuration as one immutable value
//!
//! Settings are plain values. Callers own them, mutate them between
//! compilations, and pass them by reference into the compiler.

pub mod options;
pub mod settings;

pub use options::*;
pub use settings::*;
