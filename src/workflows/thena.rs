use alloy::primitives::Address;
use tracing::{info, warn};

use super::{Orchestrator, run_cancellable};
use crate::error::WorkflowError;
use crate::gateway::{AssetManagementConfig, PositionManager};
use crate::store::{PortfolioUpdate, StoreClient};

impl Orchestrator {
    /// Enables the concentrated-liquidity position manager for a
    /// portfolio. Enabling twice reverts on-chain (the config contract
    /// guards against re-enabling); that revert surfaces as a chain error
    /// rather than being swallowed.
    pub async fn initialize_thena(&self, portfolio_id: u64) -> Result<Address, WorkflowError> {
        run_cancellable(self.session.as_ref(), self.initialize_thena_flow(portfolio_id)).await
    }

    async fn initialize_thena_flow(&self, portfolio_id: u64) -> Result<Address, WorkflowError> {
        let record = self.store.get_by_id(portfolio_id).await?;
        let config = AssetManagementConfig::new(record.asset_management_config, self.chain.as_ref());

        config
            .enable_position_manager(self.protocol.protocol_hash)
            .await?;

        let manager = config.last_deployed_position_manager().await?;
        if manager.is_zero() {
            return Err(WorkflowError::ZeroAddress {
                what: "position manager",
            });
        }

        // Sanity-check the fresh manager by enumerating its registry; a
        // new deployment should have no wrappers yet.
        let wrappers = PositionManager::new(manager, self.chain.as_ref())
            .wrapper_count()
            .await?;
        info!(%manager, wrappers, portfolio_id, "position manager enabled");

        let update = PortfolioUpdate {
            initialized_thena: Some(true),
            ..Default::default()
        };
        if let Err(source) = self.store.update(portfolio_id, &update).await {
            warn!(portfolio_id, %source, "manager enabled on-chain but store update failed");
            return Err(WorkflowError::PersistenceInconsistency {
                portfolio_address: record.portfolio_address,
                source,
            });
        }
        Ok(manager)
    }
}
