use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::bindings::{IPortfolio, PermitBatch, WithdrawRepayParams};
use crate::chain::{ChainClient, ChainError, TxOutcome};

pub struct Portfolio<'a> {
    address: Address,
    chain: &'a dyn ChainClient,
}

impl<'a> Portfolio<'a> {
    pub fn new(address: Address, chain: &'a dyn ChainClient) -> Self {
        Self { address, chain }
    }

    pub async fn get_tokens(&self) -> Result<Vec<Address>, ChainError> {
        let calldata = Bytes::from(IPortfolio::getTokensCall {}.abi_encode());
        let response = self.chain.call(self.address, calldata).await?;
        Ok(IPortfolio::getTokensCall::abi_decode_returns(&response)?)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, ChainError> {
        let calldata = Bytes::from(IPortfolio::balanceOfCall { account }.abi_encode());
        let response = self.chain.call(self.address, calldata).await?;
        Ok(IPortfolio::balanceOfCall::abi_decode_returns(&response)?)
    }

    pub async fn vault(&self) -> Result<Address, ChainError> {
        let calldata = Bytes::from(IPortfolio::vaultCall {}.abi_encode());
        let response = self.chain.call(self.address, calldata).await?;
        Ok(IPortfolio::vaultCall::abi_decode_returns(&response)?)
    }

    pub async fn init_token(&self, tokens: Vec<Address>) -> Result<TxOutcome, ChainError> {
        let calldata = Bytes::from(IPortfolio::initTokenCall { tokens }.abi_encode());
        self.chain.send(self.address, calldata, "initToken").await
    }

    pub async fn multi_token_deposit(
        &self,
        deposit_amounts: Vec<U256>,
        min_mint_amount: U256,
        permit: PermitBatch,
        signature: Bytes,
    ) -> Result<TxOutcome, ChainError> {
        let calldata = Bytes::from(
            IPortfolio::multiTokenDepositCall {
                depositAmounts: deposit_amounts,
                _minMintAmount: min_mint_amount,
                _permit: permit,
                _signature: signature,
            }
            .abi_encode(),
        );
        self.chain
            .send(self.address, calldata, "multiTokenDeposit")
            .await
    }

    pub async fn multi_token_withdrawal(
        &self,
        portfolio_token_amount: U256,
        repay_data: WithdrawRepayParams,
    ) -> Result<TxOutcome, ChainError> {
        let calldata = Bytes::from(
            IPortfolio::multiTokenWithdrawalCall {
                _portfolioTokenAmount: portfolio_token_amount,
                repayData: repay_data,
            }
            .abi_encode(),
        );
        self.chain
            .send(self.address, calldata, "multiTokenWithdrawal")
            .await
    }
}
