///
/// Package error types.
///
/// All errors that can occur while working with a game package: manifest
/// reads and writes, directory validation, listings, translations and
/// script rewriting.
///
/// Script engine failures (`SourceTransform`) are produced by engines but
/// never escape `Package::walk_script` / `Package::rewrite_script`, which
/// fall back to the original source instead.
///

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {reason}")]
    ManifestParse {
        path: PathBuf,
        reason: String,
        contents: String,
    },

    #[error("Failed to parse translation file {path}: {reason}")]
    TranslationParse {
        path: PathBuf,
        reason: String,
        contents: String,
    },

    #[error("{path} is not a package: no manifest.json found")]
    NotAPackage { path: PathBuf },

    #[error("Package already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Invalid layout config at {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("Source transform failed: {0}")]
    SourceTransform(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PackageError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> PackageError {
        let path = path.into();
        move |source| PackageError::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = PackageError::NotAPackage {
            path: PathBuf::from("/tmp/game"),
        };
        assert!(err.to_string().contains("not a package"));
        assert!(err.to_string().contains("/tmp/game"));

        let err = PackageError::ManifestParse {
            path: PathBuf::from("/tmp/game/manifest.json"),
            reason: "expected value at line 1 column 1".to_string(),
            contents: "{oops".to_string(),
        };
        assert!(err.to_string().contains("Failed to parse manifest"));
        assert!(err.to_string().contains("expected value"));

        let err = PackageError::AlreadyInitialized {
            path: PathBuf::from("/tmp/game/manifest.json"),
        };
        assert!(err.to_string().contains("already initialized"));

        let err = PackageError::Config {
            path: PathBuf::from("gamekit.toml"),
            reason: "invalid type".to_string(),
        };
        assert!(err.to_string().contains("Invalid layout config"));
        assert!(err.to_string().contains("invalid type"));

        let err = PackageError::SourceTransform("unexpected token".to_string());
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let make = PackageError::io("/tmp/missing.json");
        let err = make(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        match err {
            PackageError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("/tmp/missing.json"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_carries_contents() {
        let err = PackageError::ManifestParse {
            path: PathBuf::from("manifest.json"),
            reason: "bad".to_string(),
            contents: "not json".to_string(),
        };
        match err {
            PackageError::ManifestParse { contents, .. } => assert_eq!(contents, "not json"),
            _ => panic!("Expected ManifestParse error"),
        }
    }
}
