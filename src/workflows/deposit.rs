use alloy::primitives::{TxHash, U256};
use tracing::info;

use super::{Orchestrator, run_cancellable};
use crate::error::WorkflowError;
use crate::gateway::Portfolio;
use crate::permit::{DepositMode, PermitBuilder};
use crate::store::StoreClient;

impl Orchestrator {
    /// Deposits into every token the portfolio holds, authorized by a
    /// single Permit2 batch signature. `FullBalance` mode sweeps the
    /// wallet; `Amount` mode deposits a fixed quantity per token and
    /// fails up front if any balance is short.
    pub async fn deposit(
        &self,
        portfolio_id: u64,
        mode: DepositMode,
    ) -> Result<TxHash, WorkflowError> {
        run_cancellable(self.session.as_ref(), self.deposit_flow(portfolio_id, mode)).await
    }

    async fn deposit_flow(
        &self,
        portfolio_id: u64,
        mode: DepositMode,
    ) -> Result<TxHash, WorkflowError> {
        let record = self.store.get_by_id(portfolio_id).await?;
        let portfolio = Portfolio::new(record.portfolio_address, self.chain.as_ref());
        let tokens = portfolio.get_tokens().await?;

        let permit = PermitBuilder::new(
            self.chain.as_ref(),
            self.session.as_ref(),
            self.protocol.permit2,
            self.protocol.chain_id,
        )
        .build(&tokens, record.portfolio_address, mode)
        .await?;

        let outcome = portfolio
            .multi_token_deposit(
                permit.amounts.clone(),
                U256::ZERO,
                permit.batch,
                permit.signature,
            )
            .await?;
        info!(
            portfolio_id,
            tx_hash = %outcome.tx_hash,
            tokens = tokens.len(),
            "deposit confirmed"
        );
        Ok(outcome.tx_hash)
    }
}
