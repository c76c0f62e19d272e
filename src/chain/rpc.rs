use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tracing::{debug, info};

use super::{ChainClient, ChainError, GAS_BUFFER_DEN, GAS_BUFFER_NUM, TxOutcome};

/// `ChainClient` backed by an alloy provider. The provider is expected to
/// carry a wallet filler for the same address as `from`.
#[derive(Debug, Clone)]
pub struct RpcChain<P> {
    provider: P,
    from: Address,
}

impl<P: Provider> RpcChain<P> {
    pub fn new(provider: P, from: Address) -> Self {
        Self { provider, from }
    }
}

#[async_trait]
impl<P: Provider> ChainClient for RpcChain<P> {
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.from)
            .with_to(contract)
            .with_input(calldata);
        match self.provider.call(tx).await {
            Ok(bytes) => Ok(bytes),
            Err(err) => match err.as_error_resp() {
                Some(resp) => Err(ChainError::CallReverted {
                    reason: resp.message.to_string(),
                }),
                None => Err(ChainError::Transport(err)),
            },
        }
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TxOutcome, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.from)
            .with_to(contract)
            .with_input(calldata);

        // An estimation revert means the transaction would fail; surface it
        // before anything is signed or broadcast.
        let estimate = match self.provider.estimate_gas(tx.clone()).await {
            Ok(gas) => gas,
            Err(err) => {
                return Err(match err.as_error_resp() {
                    Some(resp) => ChainError::GasEstimationFailed {
                        reason: resp.message.to_string(),
                    },
                    None => ChainError::Transport(err),
                });
            }
        };
        let gas_limit = estimate.saturating_mul(GAS_BUFFER_NUM) / GAS_BUFFER_DEN;
        debug!(note, %contract, estimate, gas_limit, "submitting transaction");

        let pending = self
            .provider
            .send_transaction(tx.with_gas_limit(gas_limit))
            .await?;
        let receipt = pending.with_required_confirmations(1).get_receipt().await?;

        let tx_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(ChainError::TransactionReverted { tx_hash });
        }
        info!(note, %tx_hash, gas_used = receipt.gas_used, "transaction confirmed");
        Ok(TxOutcome {
            tx_hash,
            gas_used: receipt.gas_used,
            logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
        })
    }
}
