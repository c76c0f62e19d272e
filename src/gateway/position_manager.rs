use alloy::primitives::aliases::{I24, U24};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use tracing::debug;

use crate::bindings::IPositionManager;
use crate::chain::{ChainClient, ChainError, TxOutcome};

/// Upper bound on the wrapper enumeration probe. The registry exposes no
/// length getter, so enumeration walks indices until one reverts; the cap
/// turns a never-reverting endpoint into a typed error instead of a spin.
pub const MAX_WRAPPER_PROBE: usize = 1000;

/// Result of probing one index of the wrapper registry.
#[derive(Debug, PartialEq)]
pub enum WrapperSlot {
    Address(Address),
    OutOfRange,
}

pub struct PositionManager<'a> {
    address: Address,
    chain: &'a dyn ChainClient,
}

impl<'a> PositionManager<'a> {
    pub fn new(address: Address, chain: &'a dyn ChainClient) -> Self {
        Self { address, chain }
    }

    pub async fn create_wrapper_position(
        &self,
        token0: Address,
        token1: Address,
        name: String,
        symbol: String,
        tick_lower: I24,
        tick_upper: I24,
    ) -> Result<TxOutcome, ChainError> {
        let calldata = Bytes::from(
            IPositionManager::createNewWrapperPositionCall {
                _token0: token0,
                _token1: token1,
                _name: name,
                _symbol: symbol,
                _tickLower: tick_lower,
                _tickUpper: tick_upper,
            }
            .abi_encode(),
        );
        self.chain
            .send(self.address, calldata, "createNewWrapperPosition")
            .await
    }

    /// Reads one slot of the wrapper registry. An out-of-bounds index
    /// reverts on-chain; that revert is the registry's only length signal,
    /// so it maps to [`WrapperSlot::OutOfRange`] rather than an error.
    pub async fn wrapper_at(&self, index: usize) -> Result<WrapperSlot, ChainError> {
        let calldata = Bytes::from(
            IPositionManager::deployedPositionWrappersCall {
                index: U256::from(index),
            }
            .abi_encode(),
        );
        match self.chain.call(self.address, calldata).await {
            Ok(response) => Ok(WrapperSlot::Address(
                IPositionManager::deployedPositionWrappersCall::abi_decode_returns(&response)?,
            )),
            Err(ChainError::CallReverted { .. }) => Ok(WrapperSlot::OutOfRange),
            Err(err) => Err(err),
        }
    }

    /// Counts deployed wrappers by probing indices until the first revert.
    pub async fn wrapper_count(&self) -> Result<usize, ChainError> {
        for index in 0..MAX_WRAPPER_PROBE {
            if self.wrapper_at(index).await? == WrapperSlot::OutOfRange {
                debug!(manager = %self.address, count = index, "wrapper registry enumerated");
                return Ok(index);
            }
        }
        Err(ChainError::ProbeCapExceeded {
            contract: self.address,
            cap: MAX_WRAPPER_PROBE,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn decrease_liquidity(
        &self,
        position_wrapper: Address,
        withdrawal_amount: U256,
        amount0_min: U256,
        amount1_min: U256,
        swap_deployer: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        fee: U24,
    ) -> Result<TxOutcome, ChainError> {
        let calldata = Bytes::from(
            IPositionManager::decreaseLiquidityCall {
                _positionWrapper: position_wrapper,
                _withdrawalAmount: withdrawal_amount,
                _amount0Min: amount0_min,
                _amount1Min: amount1_min,
                _swapDeployer: swap_deployer,
                tokenIn: token_in,
                tokenOut: token_out,
                amountIn: amount_in,
                _fee: fee,
            }
            .abi_encode(),
        );
        self.chain
            .send(self.address, calldata, "decreaseLiquidity")
            .await
    }
}

#[cfg(test)]
mod tests {
    use alloy::sol_types::{SolCall, SolValue};

    use super::*;
    use crate::chain::mock::{CallResponse, MockChain};

    const PROBE_SELECTOR: [u8; 4] = IPositionManager::deployedPositionWrappersCall::SELECTOR;

    #[tokio::test]
    async fn count_stops_at_first_revert() {
        let chain = MockChain::new();
        let manager = Address::repeat_byte(0x11);
        for i in 1..=3u8 {
            chain.on_call(
                manager,
                PROBE_SELECTOR,
                CallResponse::Return(Address::repeat_byte(i).abi_encode().into()),
            );
        }
        chain.on_call(manager, PROBE_SELECTOR, CallResponse::Revert("out of bounds"));

        let facade = PositionManager::new(manager, &*chain);
        assert_eq!(facade.wrapper_count().await.unwrap(), 3);
        // Exactly four probes: three hits plus the terminating revert.
        assert_eq!(chain.calls().len(), 4);
    }

    #[tokio::test]
    async fn empty_registry_counts_zero() {
        let chain = MockChain::new();
        let manager = Address::repeat_byte(0x11);
        chain.on_call(manager, PROBE_SELECTOR, CallResponse::Revert("out of bounds"));

        let facade = PositionManager::new(manager, &*chain);
        assert_eq!(facade.wrapper_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn probe_cap_becomes_typed_error() {
        let chain = MockChain::new();
        let manager = Address::repeat_byte(0x11);
        for _ in 0..MAX_WRAPPER_PROBE {
            chain.on_call(
                manager,
                PROBE_SELECTOR,
                CallResponse::Return(Address::repeat_byte(0x01).abi_encode().into()),
            );
        }

        let facade = PositionManager::new(manager, &*chain);
        assert!(matches!(
            facade.wrapper_count().await,
            Err(ChainError::ProbeCapExceeded { cap: MAX_WRAPPER_PROBE, .. })
        ));
    }

    #[tokio::test]
    async fn slot_revert_maps_to_out_of_range() {
        let chain = MockChain::new();
        let manager = Address::repeat_byte(0x11);
        chain.on_call(manager, PROBE_SELECTOR, CallResponse::Revert("oob"));

        let facade = PositionManager::new(manager, &*chain);
        assert_eq!(facade.wrapper_at(0).await.unwrap(), WrapperSlot::OutOfRange);
    }
}
