//! Thin transaction layer. `ChainClient` is the seam between workflow
//! logic and an actual RPC endpoint: workflows hand it ABI-encoded
//! calldata and get back either decoded-ready bytes or a receipt summary.

use alloy::primitives::{Address, Bytes, Log, TxHash};
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;

mod rpc;
#[cfg(test)]
pub(crate) mod mock;

pub use rpc::RpcChain;

/// Extra headroom on top of the node's gas estimate.
pub(crate) const GAS_BUFFER_NUM: u64 = 120;
pub(crate) const GAS_BUFFER_DEN: u64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("transport failure: {0}")]
    Transport(#[from] RpcError<TransportErrorKind>),
    #[error("eth_call reverted: {reason}")]
    CallReverted { reason: String },
    #[error("gas estimation failed: {reason}")]
    GasEstimationFailed { reason: String },
    #[error("transaction {tx_hash} reverted on-chain")]
    TransactionReverted { tx_hash: TxHash },
    #[error("waiting for transaction inclusion failed: {0}")]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),
    #[error("failed to decode contract response: {0}")]
    AbiDecode(#[from] alloy::sol_types::Error),
    #[error("no wrapper index reverted within {cap} probes of {contract}")]
    ProbeCapExceeded { contract: Address, cap: usize },
}

/// What a workflow needs from a mined transaction: identity, cost, and the
/// logs to pull protocol events out of.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Executes a read-only call and returns the raw return data.
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, ChainError>;

    /// Estimates gas (surfacing estimation reverts as
    /// [`ChainError::GasEstimationFailed`]), pads the estimate, submits,
    /// and waits for one confirmation. `note` labels the transaction in logs.
    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TxOutcome, ChainError>;
}

#[async_trait]
impl<T: ChainClient + ?Sized> ChainClient for std::sync::Arc<T> {
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, ChainError> {
        (**self).call(contract, calldata).await
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TxOutcome, ChainError> {
        (**self).send(contract, calldata, note).await
    }
}
