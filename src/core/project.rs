//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{RecordId, RecordPrefix};
use crate::entities::standard::default_catalog;

/// Project configuration directory name
pub const PROJECT_DIR: &str = ".cqt";

/// Record file suffix
pub const RECORD_SUFFIX: &str = ".cqt.yaml";

/// Represents a CQT project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .cqt/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create_structure(root)
    }

    /// Force initialization even if .cqt/ exists; records are kept, config
    /// and the standards catalog are rewritten
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };

        std::fs::create_dir_all(project.cqt_dir()).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let record_dirs = RecordPrefix::all().iter().map(|p| p.directory());
        for dir in record_dirs.chain(["standards"]) {
            std::fs::create_dir_all(project.root.join(dir))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        let catalog = serde_yml::to_string(&default_catalog())
            .map_err(|e| ProjectError::Serialize(e.to_string()))?;
        std::fs::write(project.catalog_path(), catalog)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# CQT Project Configuration

# Default author for new records (can be overridden by global config)
# author: ""

# Default output format (auto, yaml, json, tsv, id)
# default_format: auto

# Nominal tile dimensions (mm) used when a batch does not declare them
nominal_length: 200.0
nominal_width: 200.0
nominal_thickness: 7.0

# Set to false to skip nominal-dependent checks instead of using the values above
nominal_fallback: true
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .cqt configuration directory
    pub fn cqt_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.cqt_dir().join("config.yaml")
    }

    /// Standards catalog file
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join("standards").join("catalog.yaml")
    }

    /// Directory holding records of a given type
    pub fn record_dir(&self, prefix: RecordPrefix) -> PathBuf {
        self.root.join(prefix.directory())
    }

    /// Get the path for a record file
    pub fn record_path(&self, id: &RecordId) -> PathBuf {
        self.record_dir(id.prefix())
            .join(format!("{}{}", id, RECORD_SUFFIX))
    }

    /// Iterate all record files of a given type
    pub fn iter_record_files(&self, prefix: RecordPrefix) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.record_dir(prefix))
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(RECORD_SUFFIX))
            .map(|e| e.path().to_path_buf())
    }

    /// IDs of existing records of a given type, taken from file names
    pub fn existing_ids(&self, prefix: RecordPrefix) -> Vec<RecordId> {
        self.iter_record_files(prefix)
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                name.strip_suffix(RECORD_SUFFIX)?.parse().ok()
            })
            .collect()
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a CQT project (searched from {searched_from:?}). Run 'cqt init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("CQT project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("failed to write standards catalog: {0}")]
    Serialize(String),
}
