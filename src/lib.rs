//! Yardbook: a plain-text catalogue for a model railway collection
//!
//! Purchases, the models and accessories that came in them, and the
//! decoders fitted since, are kept as YAML files in a directory that can
//! live under git version control.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
