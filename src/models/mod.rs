//! Data models

pub mod comparison;

pub use comparison::*;
