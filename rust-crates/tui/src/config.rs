use crate::wallets;
use clap::{
    ArgGroup,
    Parser,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use fuels::types::ContractId;
use serde::Deserialize;
use std::{
    fmt,
    fs,
    path::{
        Path,
        PathBuf,
    },
    str::FromStr,
    time::Duration,
};

pub const DEFAULT_TESTNET_RPC_URL: &str = "https://testnet.fuel.network";
pub const DEFAULT_DEVNET_RPC_URL: &str = "https://devnet.fuel.network";
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:4000/";
pub const DEFAULT_CONTRACT_ID: &str =
    "0x6c6ddf498da86988878d0e8d790d0b123e03a7f1a2bd4c9e3f05b6d7e8c91a04";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_LOG_DIR: &str = "~/.fuel/rps-client/logs";

#[derive(Parser, Debug, Default)]
#[command(
    name = "rps-client",
    version,
    about = "Play rock-paper-scissors against an on-chain Fuel contract",
    long_about = None,
    group(
        ArgGroup::new("network")
            .args(["devnet", "testnet", "local"])
            .required(false)
    )
)]
pub struct Cli {
    /// Connect to Fuel devnet
    #[arg(long)]
    pub devnet: bool,

    /// Connect to Fuel testnet (default)
    #[arg(long)]
    pub testnet: bool,

    /// Connect to a local Fuel node
    #[arg(long)]
    pub local: bool,

    /// Override the RPC URL for the selected network
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Game contract id (0x-prefixed hex, `fuel` prefix accepted)
    #[arg(long)]
    pub contract_id: Option<String>,

    /// Refuse to connect when the node reports a different chain id
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// forc-wallet profile to play with (defaults to the first one found)
    #[arg(long)]
    pub wallet: Option<String>,

    /// Override forc-wallet directory (defaults to ~/.fuel/wallets)
    #[arg(long)]
    pub wallet_dir: Option<String>,

    /// JSON file with defaults for any of the options above
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for the client's log files
    #[arg(long)]
    pub log_dir: Option<String>,

    /// How often to check the wallet for account or network changes
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum NetworkName {
    Devnet,
    #[default]
    Testnet,
    Local,
}

/// Optional JSON config file; every field may be omitted.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub network: Option<NetworkName>,
    pub rpc_url: Option<String>,
    pub contract_id: Option<String>,
    pub chain_id: Option<u64>,
    pub wallet: Option<String>,
    pub wallet_dir: Option<String>,
    pub log_dir: Option<String>,
    pub poll_interval_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .wrap_err_with(|| format!("Invalid config file {}", path.display()))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NetworkTarget {
    Testnet { url: String },
    Devnet { url: String },
    LocalNode { url: String },
}

impl NetworkTarget {
    pub fn url(&self) -> &str {
        match self {
            NetworkTarget::Testnet { url }
            | NetworkTarget::Devnet { url }
            | NetworkTarget::LocalNode { url } => url,
        }
    }
}

impl fmt::Display for NetworkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkTarget::Testnet { .. } => "Testnet",
            NetworkTarget::Devnet { .. } => "Devnet",
            NetworkTarget::LocalNode { .. } => "Local",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalletConfig {
    pub name: Option<String>,
    pub dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub network: NetworkTarget,
    pub contract_id: ContractId,
    pub expected_chain_id: Option<u64>,
    pub wallet: WalletConfig,
    pub log_dir: PathBuf,
    pub poll_interval: Duration,
}

impl AppConfig {
    /// Command line wins over the config file, which wins over defaults.
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let network_name = if cli.devnet {
            NetworkName::Devnet
        } else if cli.local {
            NetworkName::Local
        } else if cli.testnet {
            NetworkName::Testnet
        } else {
            file.network.unwrap_or_default()
        };
        let url = cli.rpc_url.or(file.rpc_url);
        let network = match network_name {
            NetworkName::Devnet => NetworkTarget::Devnet {
                url: url.unwrap_or_else(|| DEFAULT_DEVNET_RPC_URL.to_string()),
            },
            NetworkName::Testnet => NetworkTarget::Testnet {
                url: url.unwrap_or_else(|| DEFAULT_TESTNET_RPC_URL.to_string()),
            },
            NetworkName::Local => NetworkTarget::LocalNode {
                url: url.unwrap_or_else(|| DEFAULT_LOCAL_RPC_URL.to_string()),
            },
        };

        let raw_contract_id = cli
            .contract_id
            .or(file.contract_id)
            .unwrap_or_else(|| DEFAULT_CONTRACT_ID.to_string());
        let contract_id = parse_contract_id(&raw_contract_id)?;

        let wallet_dir = cli.wallet_dir.or(file.wallet_dir);
        let wallet = WalletConfig {
            name: cli.wallet.or(file.wallet),
            dir: wallets::resolve_wallet_dir(wallet_dir.as_deref())?,
        };

        let log_dir = cli
            .log_dir
            .or(file.log_dir)
            .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());
        let log_dir = PathBuf::from(shellexpand::tilde(&log_dir).into_owned());

        let poll_interval_ms = cli
            .poll_interval_ms
            .or(file.poll_interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_interval_ms == 0 {
            return Err(eyre!("--poll-interval-ms must be greater than zero"));
        }

        Ok(Self {
            network,
            contract_id,
            expected_chain_id: cli.chain_id.or(file.chain_id),
            wallet,
            log_dir,
            poll_interval: Duration::from_millis(poll_interval_ms),
        })
    }

    pub fn from_cli(cli: Cli) -> Result<Self> {
        let file = match cli.config.as_deref() {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }
}

/// Accepts `0x`-prefixed or bare hex, and the `fuel` prefix some tools print.
pub fn parse_contract_id(raw: &str) -> Result<ContractId> {
    let trimmed = raw.trim();
    let cleaned = trimmed.trim_start_matches("fuel");
    ContractId::from_str(cleaned)
        .map_err(|e| eyre!("Failed to parse contract id '{raw}': {e:?}"))
}
