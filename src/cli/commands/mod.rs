//! CLI command implementations

pub mod batch;
pub mod classify;
pub mod completions;
pub mod energy;
pub mod flexural;
pub mod init;
pub mod material;
pub mod report;
pub mod sample;
pub mod standards;
pub mod tolerances;
pub mod waste;
