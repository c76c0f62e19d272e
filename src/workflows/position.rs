use alloy::primitives::Address;
use alloy::primitives::aliases::I24;
use tracing::{info, warn};

use super::{Orchestrator, run_cancellable};
use crate::error::{ValidationError, WorkflowError};
use crate::gateway::{AssetManagementConfig, Portfolio, PositionManager, WrapperSlot};
use crate::store::{PortfolioUpdate, StoreClient};

/// Parameters for a new concentrated-liquidity position. Tick bounds are
/// plain integers here and validated against the int24 range before
/// anything touches the chain.
#[derive(Debug, Clone)]
pub struct PositionSpec {
    pub token0: Address,
    pub token1: Address,
    pub name: String,
    pub symbol: String,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionSpec {
    fn ticks(&self) -> Result<(I24, I24), ValidationError> {
        let lower =
            I24::try_from(self.tick_lower).map_err(|_| ValidationError::TickOutOfRange(self.tick_lower))?;
        let upper =
            I24::try_from(self.tick_upper).map_err(|_| ValidationError::TickOutOfRange(self.tick_upper))?;
        Ok((lower, upper))
    }
}

impl Orchestrator {
    /// Deploys a position wrapper through the portfolio's position manager
    /// and registers the base token with the portfolio. The new wrapper is
    /// located by index: the registry length before creation is where the
    /// wrapper lands after it.
    pub async fn create_position(
        &self,
        portfolio_id: u64,
        spec: PositionSpec,
    ) -> Result<Address, WorkflowError> {
        run_cancellable(
            self.session.as_ref(),
            self.create_position_flow(portfolio_id, spec),
        )
        .await
    }

    async fn create_position_flow(
        &self,
        portfolio_id: u64,
        spec: PositionSpec,
    ) -> Result<Address, WorkflowError> {
        let (tick_lower, tick_upper) = spec.ticks().map_err(WorkflowError::Validation)?;
        let record = self.store.get_by_id(portfolio_id).await?;

        let manager_address =
            AssetManagementConfig::new(record.asset_management_config, self.chain.as_ref())
                .last_deployed_position_manager()
                .await?;
        if manager_address.is_zero() {
            return Err(WorkflowError::ZeroAddress {
                what: "position manager",
            });
        }
        let manager = PositionManager::new(manager_address, self.chain.as_ref());

        let count_before = manager.wrapper_count().await?;
        manager
            .create_wrapper_position(
                spec.token0,
                spec.token1,
                spec.name.clone(),
                spec.symbol.clone(),
                tick_lower,
                tick_upper,
            )
            .await?;

        let wrapper = match manager.wrapper_at(count_before).await? {
            WrapperSlot::Address(address) if !address.is_zero() => address,
            _ => {
                return Err(WorkflowError::ZeroAddress {
                    what: "new position wrapper",
                });
            }
        };
        info!(%wrapper, index = count_before, portfolio_id, "position wrapper deployed");

        let mut position_list = record.position_list.clone();
        position_list.push(wrapper);
        let update = PortfolioUpdate {
            position_index: Some(position_list.len() - 1),
            position_list: Some(position_list),
            initialized_thena: None,
        };
        if let Err(source) = self.store.update(portfolio_id, &update).await {
            warn!(portfolio_id, %source, "wrapper deployed on-chain but store update failed");
            return Err(WorkflowError::PersistenceInconsistency {
                portfolio_address: record.portfolio_address,
                source,
            });
        }

        Portfolio::new(record.portfolio_address, self.chain.as_ref())
            .init_token(vec![spec.token0])
            .await?;
        Ok(wrapper)
    }
}

#[cfg(test)]
mod tests {
    use alloy::sol_types::{SolCall, SolValue};

    use super::*;
    use crate::bindings::{IAssetManagementConfig, IPortfolio, IPositionManager};
    use crate::chain::mock::{CallResponse, MockChain, SendResponse};
    use crate::session::mock::MockSession;
    use crate::store::mock::MockStore;
    use crate::store::tests::sample_record;
    use crate::workflows::create::tests::protocol_ctx;

    const MANAGER: Address = Address::repeat_byte(0x60);
    const WRAPPER: Address = Address::repeat_byte(0x61);

    fn spec() -> PositionSpec {
        PositionSpec {
            token0: Address::repeat_byte(0xb0),
            token1: Address::repeat_byte(0xb1),
            name: "BNB/ETH Position".into(),
            symbol: "BNB/ETH".into(),
            tick_lower: -144180,
            tick_upper: -122100,
        }
    }

    fn script_manager_lookup(chain: &MockChain, config: Address, manager: Address) {
        chain.on_call(
            config,
            IAssetManagementConfig::lastDeployedPositionManagerCall::SELECTOR,
            CallResponse::Return(manager.abi_encode().into()),
        );
    }

    #[tokio::test]
    async fn appends_wrapper_and_advances_index() {
        let chain = MockChain::new();
        let mut record = sample_record();
        record.initialized_thena = true;
        record.position_list = vec![Address::repeat_byte(0x01)];
        let store = MockStore::with_record(record.clone());

        script_manager_lookup(&chain, record.asset_management_config, MANAGER);
        // Registry holds one wrapper before creation.
        chain.on_call(
            MANAGER,
            IPositionManager::deployedPositionWrappersCall::SELECTOR,
            CallResponse::Return(Address::repeat_byte(0x01).abi_encode().into()),
        );
        chain.on_call(
            MANAGER,
            IPositionManager::deployedPositionWrappersCall::SELECTOR,
            CallResponse::Revert("out of bounds"),
        );
        chain.on_send(
            MANAGER,
            IPositionManager::createNewWrapperPositionCall::SELECTOR,
            SendResponse::Mined { logs: vec![] },
        );
        // The slot at the old count now resolves to the new wrapper.
        chain.on_call(
            MANAGER,
            IPositionManager::deployedPositionWrappersCall::SELECTOR,
            CallResponse::Return(WRAPPER.abi_encode().into()),
        );
        chain.on_send(
            record.portfolio_address,
            IPortfolio::initTokenCall::SELECTOR,
            SendResponse::Mined { logs: vec![] },
        );

        let orchestrator =
            Orchestrator::new(chain, MockSession::new(), store.clone(), protocol_ctx());
        let wrapper = orchestrator.create_position(7, spec()).await.unwrap();

        assert_eq!(wrapper, WRAPPER);
        let stored = store.record(7).unwrap();
        assert_eq!(
            stored.position_list,
            vec![Address::repeat_byte(0x01), WRAPPER]
        );
        assert_eq!(stored.position_index, Some(1));
    }

    #[tokio::test]
    async fn uninitialized_manager_fails_before_creation() {
        let chain = MockChain::new();
        let record = sample_record();
        let store = MockStore::with_record(record.clone());
        script_manager_lookup(&chain, record.asset_management_config, Address::ZERO);

        let orchestrator =
            Orchestrator::new(chain.clone(), MockSession::new(), store, protocol_ctx());
        let err = orchestrator.create_position(7, spec()).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::ZeroAddress { what: "position manager" }
        ));
        assert!(chain.sends().is_empty());
    }

    #[tokio::test]
    async fn empty_slot_after_creation_is_a_typed_error() {
        let chain = MockChain::new();
        let record = sample_record();
        let store = MockStore::with_record(record.clone());
        script_manager_lookup(&chain, record.asset_management_config, MANAGER);
        chain.on_call(
            MANAGER,
            IPositionManager::deployedPositionWrappersCall::SELECTOR,
            CallResponse::Revert("out of bounds"),
        );
        chain.on_send(
            MANAGER,
            IPositionManager::createNewWrapperPositionCall::SELECTOR,
            SendResponse::Mined { logs: vec![] },
        );
        chain.on_call(
            MANAGER,
            IPositionManager::deployedPositionWrappersCall::SELECTOR,
            CallResponse::Return(Address::ZERO.abi_encode().into()),
        );

        let orchestrator = Orchestrator::new(chain, MockSession::new(), store, protocol_ctx());
        let err = orchestrator.create_position(7, spec()).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::ZeroAddress { what: "new position wrapper" }
        ));
    }

    #[tokio::test]
    async fn out_of_range_tick_is_rejected_up_front() {
        let chain = MockChain::new();
        let orchestrator = Orchestrator::new(
            chain.clone(),
            MockSession::new(),
            MockStore::with_record(sample_record()),
            protocol_ctx(),
        );
        let mut bad = spec();
        bad.tick_lower = 10_000_000;

        let err = orchestrator.create_position(7, bad).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::TickOutOfRange(10_000_000))
        ));
        assert!(chain.calls().is_empty());
    }
}
