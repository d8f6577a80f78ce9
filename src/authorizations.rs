use crate::account::Account;
use chrono::Utc;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

pub const DEFAULT_AUTHORIZATIONS_FILE: &str = "~/.fuel/monster-arena/authorized.json";

/// One wallet the user has unlocked for this game before.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    pub wallet: String,
    pub address: Account,
    pub authorized_at: String,
}

impl AuthorizationRecord {
    pub fn now(wallet: impl Into<String>, address: Account) -> Self {
        Self {
            wallet: wallet.into(),
            address,
            authorized_at: Utc::now().to_rfc3339(),
        }
    }
}

/// JSON file of wallets that may be discovered without prompting.
#[derive(Clone, Debug)]
pub struct AuthorizationStore {
    path: PathBuf,
}

impl AuthorizationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as no authorizations.
    pub fn load(&self) -> Result<Vec<AuthorizationRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(&self.path).wrap_err_with(|| {
            format!("Failed to read authorizations at {}", self.path.display())
        })?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice::<Vec<AuthorizationRecord>>(&data)
            .wrap_err("Failed to parse authorizations JSON")
    }

    /// Records `record`, replacing any earlier entry for the same wallet.
    pub fn authorize(&self, record: AuthorizationRecord) -> Result<()> {
        let mut records = self.load()?;
        records.retain(|existing| existing.wallet != record.wallet);
        records.push(record);
        self.write(&records)
    }

    fn write(&self, records: &[AuthorizationRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).wrap_err_with(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_vec_pretty(records)
            .wrap_err("Failed to serialize authorizations")?;
        fs::write(&self.path, json).wrap_err("Failed to write authorizations")?;
        Ok(())
    }
}
