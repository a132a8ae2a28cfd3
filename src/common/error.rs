use std::path::PathBuf;
use thiserror::Error;

use crate::domain::value_objects::release_labels::ReleaseLabelError;
use crate::infrastructure::filesystem::ManifestStoreError;
use crate::infrastructure::process::CommandExecutorError;

/// Exit status used when the tool is run outside a repo-managed tree (`EX_USAGE`).
pub const EXIT_USAGE: i32 = 64;

#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("Project root not found: no .repo directory above {}", start.display())]
    ProjectRootNotFound { start: PathBuf },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Manifest error: {message}")]
    ManifestError {
        message: String,
        file_path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Command execution failed: {message}")]
    CommandError {
        message: String,
        command: String,
        exit_code: Option<i32>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {field} - {message}")]
    ValidationError {
        field: String,
        message: String,
        value: Option<String>,
    },

    #[error("Serialization error: {message}")]
    SerializationError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TaggerError {
    pub fn project_root_not_found(start: impl Into<PathBuf>) -> Self {
        Self::ProjectRootNotFound {
            start: start.into(),
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    pub fn manifest_error_with_source(
        message: impl Into<String>,
        file_path: Option<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ManifestError {
            message: message.into(),
            file_path,
            source: Some(Box::new(source)),
        }
    }

    pub fn command_error_with_source(
        message: impl Into<String>,
        command: impl Into<String>,
        exit_code: Option<i32>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::CommandError {
            message: message.into(),
            command: command.into(),
            exit_code,
            source: Some(Box::new(source)),
        }
    }

    pub fn validation_error(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    pub fn serialization_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Process exit status the CLI should use for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProjectRootNotFound { .. } => EXIT_USAGE,
            _ => 1,
        }
    }
}

impl From<serde_yaml::Error> for TaggerError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_error_with_source("YAML serialization failed", error)
    }
}

impl From<serde_json::Error> for TaggerError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_error_with_source("JSON serialization failed", error)
    }
}

impl From<ManifestStoreError> for TaggerError {
    fn from(error: ManifestStoreError) -> Self {
        let file_path = match &error {
            ManifestStoreError::ManifestFileNotFound(path)
            | ManifestStoreError::WouldOverwriteCurrent(path)
            | ManifestStoreError::ReadFailed { path, .. }
            | ManifestStoreError::WriteFailed { path, .. }
            | ManifestStoreError::InvalidDocument { path, .. } => Some(PathBuf::from(path)),
            ManifestStoreError::DirectoryScanFailed(_) => None,
        };
        Self::manifest_error_with_source("Manifest file operation failed", file_path, error)
    }
}

impl From<ReleaseLabelError> for TaggerError {
    fn from(error: ReleaseLabelError) -> Self {
        let field = match error {
            ReleaseLabelError::EmptyPrevious => "previous-release",
            ReleaseLabelError::EmptyRelease => "release",
        };
        Self::validation_error(field, error.to_string(), None)
    }
}

impl From<CommandExecutorError> for TaggerError {
    fn from(error: CommandExecutorError) -> Self {
        let (command, exit_code) = match &error {
            CommandExecutorError::CommandFailed {
                command, exit_code, ..
            } => (command.clone(), Some(*exit_code)),
            CommandExecutorError::SpawnFailed { command, .. } => (command.clone(), None),
            CommandExecutorError::InvalidCommand(command) => (command.clone(), None),
        };
        Self::command_error_with_source("Sync command failed", command, exit_code, error)
    }
}
