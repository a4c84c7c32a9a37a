//! On-disk cookie cache.
//!
//! The file holds a single line with the raw cookie string. Nothing here
//! interprets the value.

use crate::error::{TrackerError, TrackerResult};
use crate::model::SessionToken;
use std::path::PathBuf;

const APP_DIR: &str = "swiggy-cli";
const COOKIE_FILE: &str = "cookie";

/// Default cookie location under the per-user config directory.
pub fn default_cookie_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(COOKIE_FILE))
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists so a later save can succeed.
    pub fn prepare(&self) -> TrackerResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| TrackerError::Persistence {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Load the cached cookie, trimming surrounding whitespace and newlines.
    pub fn load(&self) -> TrackerResult<SessionToken> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(TrackerError::CredentialMissing {
                        path: self.path.clone(),
                    });
                }
                Ok(SessionToken::new(trimmed))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TrackerError::CredentialMissing {
                    path: self.path.clone(),
                })
            }
            Err(source) => Err(TrackerError::CredentialUnreadable {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn save(&self, token: &SessionToken) -> TrackerResult<()> {
        std::fs::write(&self.path, token.as_str()).map_err(|source| TrackerError::Persistence {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(event = "credentials.saved", path = %self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_reports_credential_missing() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("cookie"));
        assert!(matches!(
            store.load(),
            Err(TrackerError::CredentialMissing { .. })
        ));
    }

    #[test]
    fn test_load_trims_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookie");
        std::fs::write(&path, "  _session=abc; tid=xyz\n").unwrap();

        let token = CredentialStore::new(&path).load().unwrap();
        assert_eq!(token.as_str(), "_session=abc; tid=xyz");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("nested").join("cookie"));
        store.prepare().unwrap();
        store.save(&SessionToken::new("a=b\n")).unwrap();
        assert_eq!(store.load().unwrap().as_str(), "a=b");
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("absent").join("cookie"));
        let err = store.save(&SessionToken::new("a=b")).unwrap_err();
        assert_eq!(err.error_code(), "PERSISTENCE_FAILURE");
    }

    #[test]
    fn test_whitespace_only_file_counts_as_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookie");
        std::fs::write(&path, "\n \n").unwrap();
        assert!(matches!(
            CredentialStore::new(path).load(),
            Err(TrackerError::CredentialMissing { .. })
        ));
    }

    #[test]
    fn test_unreadable_cookie_is_not_reported_as_save_failure() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be fails with something other than NotFound.
        let path = dir.path().join("cookie");
        std::fs::create_dir(&path).unwrap();

        let err = CredentialStore::new(&path).load().unwrap_err();
        assert_eq!(err.error_code(), "CREDENTIAL_UNREADABLE");
        assert!(err.to_string().starts_with("Can't read cookie from"));
    }

    #[test]
    fn test_non_utf8_cookie_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookie");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(
            CredentialStore::new(path).load(),
            Err(TrackerError::CredentialUnreadable { .. })
        ));
    }
}
