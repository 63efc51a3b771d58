//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod identity;
pub mod loader;
pub mod project;

pub use config::Config;
pub use entity::Entity;
pub use identity::{IdParseError, RecordId, RecordPrefix};
pub use project::{Project, ProjectError};
