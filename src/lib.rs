//! Client library for an on-chain asset-management protocol: portfolio
//! creation through a factory contract, Permit2-batched deposits,
//! concentrated-liquidity position management on Thena, rebalancing via a
//! solver handler, and a REST metadata-store mirror.

pub mod bindings;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod permit;
pub mod session;
pub mod store;
pub mod units;
pub mod workflows;

pub use chain::{ChainClient, ChainError, RpcChain, TxOutcome};
pub use config::{Ctx, Env, LogLevel, ProtocolCtx};
pub use error::{ValidationError, WorkflowError};
pub use permit::{DepositMode, PermitBuilder, SignedPermit};
pub use session::{LocalSession, SessionError, SessionEvent, WalletSession};
pub use store::{PortfolioRecord, PortfolioUpdate, RestStore, StoreClient, StoreError};
pub use workflows::Orchestrator;
pub use workflows::create::CreatePortfolioParams;
pub use workflows::position::PositionSpec;
pub use workflows::withdraw::{WithdrawCheckpoint, WithdrawOutcome};

use tracing::Level;

pub fn setup_tracing(log_level: &LogLevel) {
    let level: Level = (*log_level).into();
    let default_filter = format!("folio_client={level},folio={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
