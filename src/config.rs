use std::path::{Path, PathBuf};

use alloy::primitives::{Address, B256, keccak256};
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::Level;
use url::Url;

/// Identifier under which the concentrated-liquidity protocol is
/// registered in the protocol config; its keccak256 hash is what the
/// contracts consume.
pub const THENA_PROTOCOL: &str = "THENA-CONCENTRATED-LIQUIDITY";

#[derive(Parser, Debug)]
pub struct Env {
    /// Path to the TOML configuration file
    #[clap(long)]
    pub config: PathBuf,
    /// Hex-encoded private key for the signing wallet
    #[clap(long, env = "FOLIO_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
}

/// Settings deserialized from the config TOML. Key material never goes
/// here; it arrives through the environment.
#[derive(Deserialize)]
struct Config {
    rpc_url: Url,
    store_url: Url,
    chain_id: u64,
    log_level: Option<LogLevel>,
    contracts: ContractsConfig,
    defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContractsConfig {
    factory: Address,
    treasury: Address,
    permit2: Address,
    enso_handler: Address,
    thena_factory: Address,
    swap_handler: Address,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DefaultsConfig {
    management_fee: Option<Decimal>,
    performance_fee: Option<Decimal>,
    entry_fee: Option<Decimal>,
    exit_fee: Option<Decimal>,
    initial_amount: Option<Decimal>,
    min_holding: Option<Decimal>,
    position: Option<PositionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct PositionConfig {
    token0: Address,
    token1: Address,
    name: Option<String>,
    symbol: Option<String>,
    tick_lower: i32,
    tick_upper: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse FOLIO_PRIVATE_KEY")]
    PrivateKey(#[source] alloy::signers::local::LocalSignerError),
    #[error("[defaults.position] section missing from config")]
    MissingPositionDefaults,
}

/// Combined runtime context, assembled from the config TOML and the
/// environment.
#[derive(Debug, Clone)]
pub struct Ctx {
    pub rpc_url: Url,
    pub store_url: Url,
    pub log_level: LogLevel,
    pub signer: PrivateKeySigner,
    pub protocol: ProtocolCtx,
    pub defaults: PortfolioDefaults,
}

/// Deployment addresses and chain parameters every workflow needs.
#[derive(Debug, Clone)]
pub struct ProtocolCtx {
    pub chain_id: u64,
    pub factory: Address,
    pub treasury: Address,
    pub permit2: Address,
    pub enso_handler: Address,
    pub thena_factory: Address,
    pub swap_handler: Address,
    pub protocol_hash: B256,
}

/// Creation parameters used when the CLI does not override them.
#[derive(Debug, Clone)]
pub struct PortfolioDefaults {
    pub management_fee: Decimal,
    pub performance_fee: Decimal,
    pub entry_fee: Decimal,
    pub exit_fee: Decimal,
    pub initial_amount: Decimal,
    pub min_holding: Decimal,
    pub position: PositionDefaults,
}

#[derive(Debug, Clone)]
pub struct PositionDefaults {
    pub token0: Address,
    pub token1: Address,
    pub name: String,
    pub symbol: String,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl Env {
    pub fn try_into_ctx(self) -> Result<Ctx, ConfigError> {
        Ctx::load_file(&self.config, &self.private_key)
    }
}

impl Ctx {
    pub fn load_file(config: &Path, private_key: &str) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(config)?;
        Self::from_toml(&config_str, private_key)
    }

    pub fn from_toml(config_toml: &str, private_key: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(config_toml)?;
        let signer: PrivateKeySigner =
            private_key.parse().map_err(ConfigError::PrivateKey)?;

        let defaults = config.defaults.unwrap_or_default();
        let position = defaults
            .position
            .ok_or(ConfigError::MissingPositionDefaults)?;

        Ok(Self {
            rpc_url: config.rpc_url,
            store_url: config.store_url,
            log_level: config.log_level.unwrap_or(LogLevel::Info),
            signer,
            protocol: ProtocolCtx {
                chain_id: config.chain_id,
                factory: config.contracts.factory,
                treasury: config.contracts.treasury,
                permit2: config.contracts.permit2,
                enso_handler: config.contracts.enso_handler,
                thena_factory: config.contracts.thena_factory,
                swap_handler: config.contracts.swap_handler,
                protocol_hash: keccak256(THENA_PROTOCOL.as_bytes()),
            },
            defaults: PortfolioDefaults {
                management_fee: defaults.management_fee.unwrap_or(dec!(2)),
                performance_fee: defaults.performance_fee.unwrap_or(dec!(20)),
                entry_fee: defaults.entry_fee.unwrap_or(dec!(1)),
                exit_fee: defaults.exit_fee.unwrap_or(dec!(1)),
                initial_amount: defaults.initial_amount.unwrap_or(dec!(0.1)),
                min_holding: defaults.min_holding.unwrap_or(dec!(0.01)),
                position: PositionDefaults {
                    token0: position.token0,
                    token1: position.token1,
                    name: position.name.unwrap_or_else(|| "BNB/ETH Position".into()),
                    symbol: position.symbol.unwrap_or_else(|| "BNB/ETH".into()),
                    tick_lower: position.tick_lower,
                    tick_upper: position.tick_upper,
                },
            },
        })
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
