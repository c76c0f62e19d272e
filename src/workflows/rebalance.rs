use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::{SolCall, SolValue};
use tracing::info;

use super::{Orchestrator, run_cancellable};
use crate::bindings::{IERC20, IPositionManager, PositionDepositParams, RebalanceIntent};
use crate::error::WorkflowError;
use crate::gateway::{AssetManagementConfig, Erc20, Portfolio, PositionManager, Rebalancing, WrapperSlot};
use crate::session::WalletSession;
use crate::store::StoreClient;

/// Builds the composite calldata blob the solver handler decodes
/// positionally: enso swap calls, pending-deposit calls, liquidity calls,
/// approval targets, dust tokens, sell tokens, wrappers, swap amounts.
fn encode_rebalance_blob(
    sell_token: Address,
    manager: Address,
    wrapper: Address,
    increase_liquidity_calls: Vec<Bytes>,
) -> Bytes {
    let blob = (
        vec![Vec::<Bytes>::new()],
        Vec::<Bytes>::new(),
        vec![increase_liquidity_calls],
        vec![vec![sell_token, manager]],
        Vec::<Address>::new(),
        vec![sell_token],
        vec![vec![wrapper]],
        vec![vec![U256::ZERO]],
    )
        .abi_encode_params();
    blob.into()
}

impl Orchestrator {
    /// Moves the whole vault balance of the portfolio's base token into
    /// the active liquidity position: approve the position manager,
    /// initialize and fund the wrapper, and swap the portfolio's token
    /// list over to the wrapper, all in one `updateTokens` call.
    pub async fn rebalance(&self, portfolio_id: u64) -> Result<TxHash, WorkflowError> {
        run_cancellable(self.session.as_ref(), self.rebalance_flow(portfolio_id)).await
    }

    async fn rebalance_flow(&self, portfolio_id: u64) -> Result<TxHash, WorkflowError> {
        let record = self.store.get_by_id(portfolio_id).await?;
        let position_index = record
            .position_index
            .ok_or(WorkflowError::NoActivePosition { portfolio_id })?;

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
        let wrapper = match manager.wrapper_at(position_index).await? {
            WrapperSlot::Address(address) if !address.is_zero() => address,
            _ => return Err(WorkflowError::NoActivePosition { portfolio_id }),
        };

        let portfolio = Portfolio::new(record.portfolio_address, self.chain.as_ref());
        let vault = portfolio.vault().await?;
        let tokens = portfolio.get_tokens().await?;
        let sell_token = *tokens.first().ok_or(WorkflowError::EmptyTokenList)?;
        let sell_balance = Erc20::new(sell_token, self.chain.as_ref())
            .balance_of(vault)
            .await?;

        let approve = Bytes::from(
            IERC20::approveCall {
                spender: manager_address,
                amount: sell_balance,
            }
            .abi_encode(),
        );
        let initialize = Bytes::from(
            IPositionManager::initializePositionAndDepositCall {
                _dustReceiver: self.session.address(),
                _positionWrapper: wrapper,
                params: PositionDepositParams {
                    _amount0Desired: U256::ZERO,
                    _amount1Desired: sell_balance,
                    _amount0Min: U256::ZERO,
                    _amount1Min: U256::ZERO,
                    _deployer: Address::ZERO,
                },
            }
            .abi_encode(),
        );
        let call_data = encode_rebalance_blob(
            sell_token,
            manager_address,
            wrapper,
            vec![approve, initialize],
        );

        let outcome = Rebalancing::new(record.rebalancing, self.chain.as_ref())
            .update_tokens(RebalanceIntent {
                _newTokens: vec![wrapper],
                _sellTokens: vec![sell_token],
                _sellAmounts: vec![sell_balance],
                _handler: self.protocol.enso_handler,
                _callData: call_data,
            })
            .await?;
        info!(
            portfolio_id,
            tx_hash = %outcome.tx_hash,
            %wrapper,
            %sell_balance,
            "rebalance confirmed"
        );
        Ok(outcome.tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{IAssetManagementConfig, IPortfolio, IRebalancing};
    use crate::chain::mock::{CallResponse, MockChain, SendResponse};
    use crate::session::mock::MockSession;
    use crate::store::mock::MockStore;
    use crate::store::tests::sample_record;
    use crate::workflows::create::tests::protocol_ctx;

    const MANAGER: Address = Address::repeat_byte(0x60);
    const WRAPPER: Address = Address::repeat_byte(0x61);
    const VAULT: Address = Address::repeat_byte(0x09);
    const SELL: Address = Address::repeat_byte(0xb0);

    type Blob = (
        Vec<Vec<Bytes>>,
        Vec<Bytes>,
        Vec<Vec<Bytes>>,
        Vec<Vec<Address>>,
        Vec<Address>,
        Vec<Address>,
        Vec<Vec<Address>>,
        Vec<Vec<U256>>,
    );

    #[test]
    fn blob_layout_is_positional() {
        let calls = vec![Bytes::from(vec![0xaa]), Bytes::from(vec![0xbb])];
        let blob = encode_rebalance_blob(SELL, MANAGER, WRAPPER, calls.clone());
        let decoded = <Blob as SolValue>::abi_decode_params(&blob).unwrap();

        assert_eq!(decoded.0, vec![Vec::<Bytes>::new()]);
        assert!(decoded.1.is_empty());
        assert_eq!(decoded.2, vec![calls]);
        assert_eq!(decoded.3, vec![vec![SELL, MANAGER]]);
        assert!(decoded.4.is_empty());
        assert_eq!(decoded.5, vec![SELL]);
        assert_eq!(decoded.6, vec![vec![WRAPPER]]);
        assert_eq!(decoded.7, vec![vec![U256::ZERO]]);
    }

    fn script_rebalance(chain: &MockChain, record: &crate::store::PortfolioRecord) {
        chain.on_call(
            record.asset_management_config,
            IAssetManagementConfig::lastDeployedPositionManagerCall::SELECTOR,
            CallResponse::Return(MANAGER.abi_encode().into()),
        );
        chain.on_call(
            MANAGER,
            IPositionManager::deployedPositionWrappersCall::SELECTOR,
            CallResponse::Return(WRAPPER.abi_encode().into()),
        );
        chain.on_call(
            record.portfolio_address,
            IPortfolio::vaultCall::SELECTOR,
            CallResponse::Return(VAULT.abi_encode().into()),
        );
        chain.on_call(
            record.portfolio_address,
            IPortfolio::getTokensCall::SELECTOR,
            CallResponse::Return(vec![SELL].abi_encode().into()),
        );
        chain.on_call(
            SELL,
            IERC20::balanceOfCall::SELECTOR,
            CallResponse::Return(U256::from(7_000u64).abi_encode().into()),
        );
        chain.on_send(
            record.rebalancing,
            IRebalancing::updateTokensCall::SELECTOR,
            SendResponse::Mined { logs: vec![] },
        );
    }

    #[tokio::test]
    async fn sells_vault_balance_into_active_wrapper() {
        let chain = MockChain::new();
        let session = MockSession::new();
        let mut record = sample_record();
        record.position_index = Some(0);
        record.position_list = vec![WRAPPER];
        let store = MockStore::with_record(record.clone());
        script_rebalance(&chain, &record);

        let orchestrator =
            Orchestrator::new(chain.clone(), session.clone(), store, protocol_ctx());
        orchestrator.rebalance(7).await.unwrap();

        let (_, calldata, _) = chain.sends().pop().unwrap();
        let call = IRebalancing::updateTokensCall::abi_decode(&calldata).unwrap();
        let intent = call.rebalanceData;
        assert_eq!(intent._newTokens, vec![WRAPPER]);
        assert_eq!(intent._sellTokens, vec![SELL]);
        assert_eq!(intent._sellAmounts, vec![U256::from(7_000u64)]);
        assert_eq!(intent._handler, protocol_ctx().enso_handler);

        // The first liquidity call approves the manager for the vault
        // balance; the second funds the wrapper with it.
        let blob = <Blob as SolValue>::abi_decode_params(&intent._callData).unwrap();
        let approve = IERC20::approveCall::abi_decode(&blob.2[0][0]).unwrap();
        assert_eq!(approve.spender, MANAGER);
        assert_eq!(approve.amount, U256::from(7_000u64));
        let init =
            IPositionManager::initializePositionAndDepositCall::abi_decode(&blob.2[0][1]).unwrap();
        assert_eq!(init._positionWrapper, WRAPPER);
        assert_eq!(init._dustReceiver, session.address());
        assert_eq!(init.params._amount1Desired, U256::from(7_000u64));
    }

    #[tokio::test]
    async fn missing_position_index_is_rejected() {
        let record = sample_record();
        let orchestrator = Orchestrator::new(
            MockChain::new(),
            MockSession::new(),
            MockStore::with_record(record),
            protocol_ctx(),
        );
        let err = orchestrator.rebalance(7).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::NoActivePosition { portfolio_id: 7 }
        ));
    }
}
