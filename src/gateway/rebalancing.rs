use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;

use crate::bindings::{IRebalancing, RebalanceIntent};
use crate::chain::{ChainClient, ChainError, TxOutcome};

pub struct Rebalancing<'a> {
    address: Address,
    chain: &'a dyn ChainClient,
}

impl<'a> Rebalancing<'a> {
    pub fn new(address: Address, chain: &'a dyn ChainClient) -> Self {
        Self { address, chain }
    }

    pub async fn update_tokens(&self, intent: RebalanceIntent) -> Result<TxOutcome, ChainError> {
        let calldata =
            Bytes::from(IRebalancing::updateTokensCall { rebalanceData: intent }.abi_encode());
        self.chain.send(self.address, calldata, "updateTokens").await
    }
}
