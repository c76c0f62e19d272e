use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;

use crate::bindings::{IPortfolioFactory, PortfolioCreationInitData};
use crate::chain::{ChainClient, ChainError, TxOutcome};

pub struct Factory<'a> {
    address: Address,
    chain: &'a dyn ChainClient,
}

impl<'a> Factory<'a> {
    pub fn new(address: Address, chain: &'a dyn ChainClient) -> Self {
        Self { address, chain }
    }

    pub async fn create_portfolio(
        &self,
        init_data: PortfolioCreationInitData,
    ) -> Result<TxOutcome, ChainError> {
        let calldata = Bytes::from(
            IPortfolioFactory::createPortfolioNonCustodialCall { initData: init_data }
                .abi_encode(),
        );
        self.chain
            .send(self.address, calldata, "createPortfolioNonCustodial")
            .await
    }
}
