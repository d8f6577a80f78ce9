use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use fuels::types::ContractId;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    fs,
    path::{
        Path,
        PathBuf,
    },
    str::FromStr,
};

pub const DEPLOYMENTS_ROOT: &str = ".deployments";
const DEPLOYMENTS_FILE: &str = "deployments.json";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeploymentEnv {
    Dev,
    Test,
    Local,
}

impl DeploymentEnv {
    pub fn dir_name(self) -> &'static str {
        match self {
            DeploymentEnv::Dev => "dev",
            DeploymentEnv::Test => "test",
            DeploymentEnv::Local => "local",
        }
    }
}

impl fmt::Display for DeploymentEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentEnv::Dev => "Devnet",
            DeploymentEnv::Test => "Testnet",
            DeploymentEnv::Local => "Local",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployed_at: String,
    pub contract_id: String,
    pub network_url: String,
}

impl DeploymentRecord {
    pub fn contract_id(&self) -> Result<ContractId> {
        parse_contract_id(&self.contract_id)
    }
}

/// Accepts ids with or without `0x`, and the legacy `fuel` bech32-style prefix
/// older tooling wrote.
pub fn parse_contract_id(raw: &str) -> Result<ContractId> {
    let trimmed = raw.trim().trim_start_matches("fuel");
    ContractId::from_str(trimmed)
        .map_err(|e| eyre!("invalid contract id {trimmed:?}: {e:?}"))
}

/// Deployment history for one network, as written by the deploy tooling.
#[derive(Debug)]
pub struct DeploymentStore {
    env: DeploymentEnv,
    path: PathBuf,
}

impl DeploymentStore {
    pub fn open(root: impl AsRef<Path>, env: DeploymentEnv) -> Self {
        let path = root.as_ref().join(env.dir_name()).join(DEPLOYMENTS_FILE);
        Self { env, path }
    }

    pub fn load(&self) -> Result<Vec<DeploymentRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(&self.path).wrap_err("Failed to read deployment records")?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice::<Vec<DeploymentRecord>>(&data)
            .wrap_err("Failed to parse deployment records JSON")
    }

    pub fn latest(&self) -> Result<Option<DeploymentRecord>> {
        Ok(self.load()?.pop())
    }

    /// Contract id of the most recent deployment on this network.
    pub fn latest_contract_id(&self) -> Result<ContractId> {
        let record = self.latest()?.ok_or_else(|| {
            eyre!(
                "No {} deployment recorded in {}; pass --contract-id instead",
                self.env,
                self.path.display()
            )
        })?;
        record.contract_id()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
