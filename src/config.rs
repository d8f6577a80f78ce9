use crate::{
    authorizations::DEFAULT_AUTHORIZATIONS_FILE,
    deployment::{
        DeploymentEnv,
        parse_contract_id,
    },
    wallets::{
        expand_path,
        resolve_wallet_dir,
    },
};
use clap::{
    ArgGroup,
    Parser,
};
use color_eyre::eyre::Result;
use fuels::types::ContractId;
use std::path::PathBuf;

pub const DEFAULT_TESTNET_RPC_URL: &str = "https://testnet.fuel.network";
pub const DEFAULT_DEVNET_RPC_URL: &str = "https://devnet.fuel.network";
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:4000/";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Parser, Debug)]
#[command(
    name = "monster-arena",
    about = "Terminal client for the Monster Arena character game",
    version,
    group(
        ArgGroup::new("network")
            .args(["devnet", "testnet", "local"])
            .required(true)
    )
)]
pub struct Args {
    /// Connect to Fuel devnet
    #[arg(long)]
    pub devnet: bool,

    /// Connect to Fuel testnet
    #[arg(long)]
    pub testnet: bool,

    /// Connect to a local Fuel node
    #[arg(long)]
    pub local: bool,

    /// Override RPC URL for the selected network
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// forc-wallet profile to connect with (defaults to the first one found)
    #[arg(long)]
    pub wallet: Option<String>,

    /// Override forc-wallet directory (defaults to ~/.fuel/wallets)
    #[arg(long)]
    pub wallet_dir: Option<String>,

    /// File remembering which wallets were authorized for this game
    #[arg(long, default_value = DEFAULT_AUTHORIZATIONS_FILE)]
    pub authorizations: String,

    /// Game contract id (defaults to the latest recorded deployment)
    #[arg(long)]
    pub contract_id: Option<String>,

    /// Directory for the rolling log file
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkTarget {
    Devnet { url: String },
    Testnet { url: String },
    LocalNode { url: String },
}

impl NetworkTarget {
    pub fn url(&self) -> &str {
        match self {
            NetworkTarget::Devnet { url }
            | NetworkTarget::Testnet { url }
            | NetworkTarget::LocalNode { url } => url,
        }
    }

    pub fn env(&self) -> DeploymentEnv {
        match self {
            NetworkTarget::Devnet { .. } => DeploymentEnv::Dev,
            NetworkTarget::Testnet { .. } => DeploymentEnv::Test,
            NetworkTarget::LocalNode { .. } => DeploymentEnv::Local,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletConfig {
    ForcKeystore {
        preferred: Option<String>,
        dir: PathBuf,
        authorizations: PathBuf,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractSource {
    Explicit(ContractId),
    LatestDeployment,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub network: NetworkTarget,
    pub wallet: WalletConfig,
    pub contract: ContractSource,
    pub log_dir: PathBuf,
}

impl Args {
    pub fn into_config(self) -> Result<AppConfig> {
        let network = if self.devnet {
            NetworkTarget::Devnet {
                url: self
                    .rpc_url
                    .unwrap_or_else(|| DEFAULT_DEVNET_RPC_URL.to_string()),
            }
        } else if self.testnet {
            NetworkTarget::Testnet {
                url: self
                    .rpc_url
                    .unwrap_or_else(|| DEFAULT_TESTNET_RPC_URL.to_string()),
            }
        } else {
            NetworkTarget::LocalNode {
                url: self
                    .rpc_url
                    .unwrap_or_else(|| DEFAULT_LOCAL_RPC_URL.to_string()),
            }
        };

        let wallet = WalletConfig::ForcKeystore {
            preferred: self.wallet,
            dir: resolve_wallet_dir(self.wallet_dir.as_deref())?,
            authorizations: expand_path(&self.authorizations),
        };

        let contract = match self.contract_id.as_deref() {
            Some(raw) => ContractSource::Explicit(parse_contract_id(raw)?),
            None => ContractSource::LatestDeployment,
        };

        Ok(AppConfig {
            network,
            wallet,
            contract,
            log_dir: self.log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    const ID: &str = "0x9d2d1b5e79c4bd1f5b5d0cfa3fbce2a0c1a2b58f2d3c8f1c3e4a6e6e0f8a4b21";

    fn parse(args: &[&str]) -> Result<AppConfig> {
        let args = Args::try_parse_from(std::iter::once("monster-arena").chain(args.iter().copied()))?;
        args.into_config()
    }

    #[test]
    fn try_parse_from__requires_a_network() {
        assert!(Args::try_parse_from(["monster-arena"]).is_err());
        assert!(Args::try_parse_from(["monster-arena", "--devnet", "--local"]).is_err());
    }

    #[test]
    fn into_config__uses_default_url_per_network() {
        let cases = [
            ("--devnet", NetworkTarget::Devnet {
                url: DEFAULT_DEVNET_RPC_URL.to_string(),
            }),
            ("--testnet", NetworkTarget::Testnet {
                url: DEFAULT_TESTNET_RPC_URL.to_string(),
            }),
            ("--local", NetworkTarget::LocalNode {
                url: DEFAULT_LOCAL_RPC_URL.to_string(),
            }),
        ];
        for (flag, expected) in cases {
            let config = parse(&[flag, "--wallet-dir", "/tmp/wallets"]).unwrap();
            assert_eq!(config.network, expected);
            assert_eq!(config.contract, ContractSource::LatestDeployment);
        }
    }

    #[test]
    fn into_config__applies_overrides() {
        // given
        let args = [
            "--testnet",
            "--rpc-url",
            "http://127.0.0.1:4001/",
            "--wallet",
            "ash",
            "--wallet-dir",
            "/tmp/wallets",
            "--authorizations",
            "/tmp/authorized.json",
            "--contract-id",
            ID,
            "--log-dir",
            "/tmp/logs",
        ];

        // when
        let config = parse(&args).unwrap();

        // then
        assert_eq!(config.network.url(), "http://127.0.0.1:4001/");
        assert_eq!(config.network.env(), DeploymentEnv::Test);
        assert_eq!(config.wallet, WalletConfig::ForcKeystore {
            preferred: Some("ash".to_string()),
            dir: PathBuf::from("/tmp/wallets"),
            authorizations: PathBuf::from("/tmp/authorized.json"),
        });
        assert_eq!(
            config.contract,
            ContractSource::Explicit(parse_contract_id(ID).unwrap())
        );
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
    }

    #[test]
    fn into_config__rejects_malformed_contract_id() {
        let result = parse(&["--local", "--wallet-dir", "/tmp/w", "--contract-id", "0xnope"]);

        assert!(result.is_err());
    }
}
