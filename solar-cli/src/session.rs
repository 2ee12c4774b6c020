//! Small JSON files under the state directory: the signed-in session and the
//! anonymous visitor id quotes are filed under when nobody is signed in.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use solar_core::{Owner, UserSession};
use tracing::{debug, warn};
use uuid::Uuid;

const SESSION_FILE: &str = "session.json";
const ANONYMOUS_FILE: &str = "anonymous-id";

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("cannot create state directory '{}'", self.dir.display()))
    }

    /// The stored session, if any. A corrupt file is treated as signed out.
    pub fn load_session(&self) -> Result<Option<UserSession>> {
        let path = self.dir.join(SESSION_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("cannot read '{}'", path.display()))?;
        match serde_json::from_str(&text) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    pub fn save_session(
        &self,
        session: &UserSession,
    ) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(SESSION_FILE);
        let text = serde_json::to_string_pretty(session)?;
        write_private(&path, text.as_bytes())
            .with_context(|| format!("cannot write '{}'", path.display()))?;
        debug!(uid = %session.uid, "session stored");
        Ok(())
    }

    pub fn clear_session(&self) -> Result<()> {
        let path = self.dir.join(SESSION_FILE);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("cannot remove '{}'", path.display()))?;
        }
        Ok(())
    }

    /// Stable id of this machine's anonymous visitor, created on first use.
    pub fn anonymous_id(&self) -> Result<String> {
        let path = self.dir.join(ANONYMOUS_FILE);
        if let Ok(existing) = fs::read_to_string(&path) {
            let existing = existing.trim();
            if !existing.is_empty() {
                return Ok(existing.to_string());
            }
        }

        self.ensure_dir()?;
        let id = Uuid::new_v4().to_string();
        fs::write(&path, &id).with_context(|| format!("cannot write '{}'", path.display()))?;
        debug!(%id, "anonymous id created");
        Ok(id)
    }

    /// Owner new quotes are stored under.
    pub fn owner(
        &self,
        session: Option<&UserSession>,
    ) -> Result<Owner> {
        match session {
            Some(session) => Ok(Owner::User(session.uid.clone())),
            None => Ok(Owner::Anonymous(self.anonymous_id()?)),
        }
    }
}

/// Writes `contents` to a file only the current user can read.
#[cfg(unix)]
fn write_private(
    path: &Path,
    contents: &[u8],
) -> io::Result<()> {
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(
    path: &Path,
    contents: &[u8],
) -> io::Result<()> {
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn session() -> UserSession {
        UserSession {
            uid: "uid-1".to_string(),
            email: "ana@example.com".to_string(),
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn session_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state"));

        assert_eq!(store.load_session().unwrap(), None);
        store.save_session(&session()).unwrap();
        assert_eq!(store.load_session().unwrap(), Some(session()));

        store.clear_session().unwrap();
        assert_eq!(store.load_session().unwrap(), None);
        store.clear_session().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private_to_the_user() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        let path = dir.path().join(SESSION_FILE);
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        store.save_session(&session()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load_session().unwrap(), Some(session()));
    }

    #[test]
    fn corrupt_session_reads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();

        assert_eq!(StateStore::new(dir.path()).load_session().unwrap(), None);
    }

    #[test]
    fn anonymous_id_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());

        let first = store.anonymous_id().unwrap();
        assert_eq!(store.anonymous_id().unwrap(), first);
        assert_eq!(first.len(), 36);
    }

    #[test]
    fn owner_follows_sign_in() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());

        assert_eq!(store.owner(Some(&session())).unwrap(), Owner::User("uid-1".to_string()));
        assert!(matches!(store.owner(None).unwrap(), Owner::Anonymous(_)));
    }
}
