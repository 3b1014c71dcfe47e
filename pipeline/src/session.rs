use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

/// Last known viewer identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Version of the session format
    pub version: u32,

    /// Account address supplied by the login flow
    pub address: Option<String>,

    /// When the address last changed
    pub updated_at: Option<SystemTime>,
}

impl Session {
    const CURRENT_VERSION: u32 = 1;
}

/// File-backed session: read once when opened, written only when the
/// address changes.
#[derive(Debug)]
pub struct SessionStore {
    state_dir: PathBuf,
    session: Session,
}

impl SessionStore {
    const SESSION_FILENAME: &'static str = "session.json";

    /// Open the store, loading any persisted session
    pub fn open(state_dir: &Path) -> Result<Self> {
        let session = Self::load(state_dir)?;
        Ok(Self {
            state_dir: state_dir.to_path_buf(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn address(&self) -> Option<&str> {
        self.session.address.as_deref()
    }

    /// Record the address handed over by the login flow.
    ///
    /// Returns whether anything changed on disk.
    pub fn login(&mut self, address: &str) -> Result<bool> {
        let address = address.trim();
        if address.is_empty() {
            return Err(PipelineError::Session("address must not be empty".to_string()));
        }
        if self.address() == Some(address) {
            return Ok(false);
        }
        info!("Session address set to {address}");
        self.update(Some(address.to_string()))?;
        Ok(true)
    }

    /// Forget the address. Returns whether anything changed on disk.
    pub fn logout(&mut self) -> Result<bool> {
        if self.session.address.is_none() {
            return Ok(false);
        }
        info!("Session address cleared");
        self.update(None)?;
        Ok(true)
    }

    fn update(&mut self, address: Option<String>) -> Result<()> {
        let session = Session {
            version: Session::CURRENT_VERSION,
            address,
            updated_at: Some(SystemTime::now()),
        };
        self.save(&session)?;
        self.session = session;
        Ok(())
    }

    fn load(state_dir: &Path) -> Result<Session> {
        let path = state_dir.join(Self::SESSION_FILENAME);

        if !path.exists() {
            return Ok(Session::default());
        }

        let content = fs::read_to_string(&path)?;
        let session: Session = serde_json::from_str(&content)?;

        if session.version != Session::CURRENT_VERSION {
            warn!(
                "Session version mismatch: {} vs {}. Starting a fresh session.",
                session.version,
                Session::CURRENT_VERSION
            );
            return Ok(Session::default());
        }

        Ok(session)
    }

    fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.state_dir)?;

        let path = self.state_dir.join(Self::SESSION_FILENAME);
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&path, content)?;

        Ok(())
    }
}
