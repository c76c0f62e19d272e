use alloy::primitives::{Address, B256, Bytes};
use alloy::sol_types::SolCall;

use crate::bindings::IAssetManagementConfig;
use crate::chain::{ChainClient, ChainError, TxOutcome};

pub struct AssetManagementConfig<'a> {
    address: Address,
    chain: &'a dyn ChainClient,
}

impl<'a> AssetManagementConfig<'a> {
    pub fn new(address: Address, chain: &'a dyn ChainClient) -> Self {
        Self { address, chain }
    }

    /// Deploys the concentrated-liquidity position manager for the protocol
    /// identified by `protocol_id`.
    pub async fn enable_position_manager(
        &self,
        protocol_id: B256,
    ) -> Result<TxOutcome, ChainError> {
        let calldata = Bytes::from(
            IAssetManagementConfig::enableUniSwapV3ManagerCall {
                protocolId: protocol_id,
            }
            .abi_encode(),
        );
        self.chain
            .send(self.address, calldata, "enableUniSwapV3Manager")
            .await
    }

    pub async fn last_deployed_position_manager(&self) -> Result<Address, ChainError> {
        let calldata =
            Bytes::from(IAssetManagementConfig::lastDeployedPositionManagerCall {}.abi_encode());
        let response = self.chain.call(self.address, calldata).await?;
        Ok(
            IAssetManagementConfig::lastDeployedPositionManagerCall::abi_decode_returns(
                &response,
            )?,
        )
    }
}
