use alloy::primitives::aliases::U160;
use alloy::primitives::{TxHash, U256};
use tracing::info;

use super::{Orchestrator, run_cancellable};
use crate::error::WorkflowError;
use crate::gateway::{Erc20, Portfolio};
use crate::store::StoreClient;

impl Orchestrator {
    /// Grants the Permit2 contract an ERC-20 allowance for every token the
    /// portfolio holds. Permit2 pulls deposits against this allowance, so
    /// this must run once per wallet before the first deposit. Each token
    /// gets a reset-to-zero approval followed by a max approval, which
    /// keeps tokens that reject non-zero-to-non-zero changes working.
    pub async fn approve_tokens(&self, portfolio_id: u64) -> Result<Vec<TxHash>, WorkflowError> {
        run_cancellable(self.session.as_ref(), self.approve_tokens_flow(portfolio_id)).await
    }

    async fn approve_tokens_flow(&self, portfolio_id: u64) -> Result<Vec<TxHash>, WorkflowError> {
        let record = self.store.get_by_id(portfolio_id).await?;
        let portfolio = Portfolio::new(record.portfolio_address, self.chain.as_ref());
        let tokens = portfolio.get_tokens().await?;
        if tokens.is_empty() {
            return Err(WorkflowError::EmptyTokenList);
        }

        // Permit2 tracks allowances as uint160, so the max grant is the
        // largest amount its transfers can ever consume.
        let max_allowance = U256::from(U160::MAX);
        let mut tx_hashes = Vec::with_capacity(tokens.len());
        for token in tokens {
            let erc20 = Erc20::new(token, self.chain.as_ref());
            erc20.approve(self.protocol.permit2, U256::ZERO).await?;
            let outcome = erc20.approve(self.protocol.permit2, max_allowance).await?;
            info!(%token, tx_hash = %outcome.tx_hash, "token approved to Permit2");
            tx_hashes.push(outcome.tx_hash);
        }
        Ok(tx_hashes)
    }
}
