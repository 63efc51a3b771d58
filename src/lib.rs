//! CQT: Ceramic Quality Toolkit
//!
//! Tracks ceramic tile laboratory samples as plain-text YAML records and
//! evaluates them against ISO 13006 / ISO 10545 tolerance bands.

pub mod cli;
pub mod compliance;
pub mod core;
pub mod entities;
pub mod yaml;
