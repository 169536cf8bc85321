//! Error types for cpplibhub helpers

use std::path::PathBuf;

use thiserror::Error;

/// Error returned by the filesystem, archive, shell and download helpers
#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Origin does not exist: {}", .0.display())]
    OriginNotFound(PathBuf),

    #[error("Old destination can't be removed: {}: {source}", .path.display())]
    DestinationNotRemovable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid environment variable: {0}")]
    InvalidEnvVar(String),

    #[error("Empty command line")]
    EmptyCommand,

    #[error("Command `{command}` failed with exit code {}", exit_code(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Result type alias for helper operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FileNotFound(PathBuf::from("/tmp/foo.txt"));
        assert_eq!(err.to_string(), "File not found: /tmp/foo.txt");

        let err = Error::PathNotFound(PathBuf::from("/tmp/dir"));
        assert_eq!(err.to_string(), "Path not found: /tmp/dir");

        let err = Error::OriginNotFound(PathBuf::from("/tmp/src"));
        assert!(err.to_string().contains("Origin does not exist"));

        let err = Error::DestinationNotRemovable {
            path: PathBuf::from("/tmp/dest"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("can't be removed"));
        assert!(err.to_string().contains("denied"));

        let err = Error::CommandFailed {
            command: "git pull".to_string(),
            code: Some(128),
        };
        assert_eq!(err.to_string(), "Command `git pull` failed with exit code 128");

        let err = Error::CommandFailed {
            command: "sleep".to_string(),
            code: None,
        };
        assert!(err.to_string().ends_with("exit code none"));

        let err = Error::InvalidEnvVar("name is empty".to_string());
        assert_eq!(err.to_string(), "Invalid environment variable: name is empty");

        let err = Error::DownloadFailed("timeout".to_string());
        assert!(err.to_string().contains("Download failed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
