use alloy::primitives::aliases::{U48, U160};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::bindings::{IAllowanceTransfer, IERC20, IPositionWrapper};
use crate::chain::{ChainClient, ChainError, TxOutcome};

pub struct Erc20<'a> {
    address: Address,
    chain: &'a dyn ChainClient,
}

impl<'a> Erc20<'a> {
    pub fn new(address: Address, chain: &'a dyn ChainClient) -> Self {
        Self { address, chain }
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, ChainError> {
        let calldata = Bytes::from(IERC20::balanceOfCall { account }.abi_encode());
        let response = self.chain.call(self.address, calldata).await?;
        Ok(IERC20::balanceOfCall::abi_decode_returns(&response)?)
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<TxOutcome, ChainError> {
        let calldata = Bytes::from(IERC20::approveCall { spender, amount }.abi_encode());
        self.chain.send(self.address, calldata, "approve").await
    }
}

/// Read side of the Permit2 allowance mapping. Only the per-token nonce is
/// consumed here; amounts and expirations are set by the signed permit.
pub struct Permit2<'a> {
    address: Address,
    chain: &'a dyn ChainClient,
}

pub struct PermitAllowance {
    pub amount: U160,
    pub expiration: U48,
    pub nonce: U48,
}

impl<'a> Permit2<'a> {
    pub fn new(address: Address, chain: &'a dyn ChainClient) -> Self {
        Self { address, chain }
    }

    pub async fn allowance(
        &self,
        user: Address,
        token: Address,
        spender: Address,
    ) -> Result<PermitAllowance, ChainError> {
        let calldata = Bytes::from(
            IAllowanceTransfer::allowanceCall {
                user,
                token,
                spender,
            }
            .abi_encode(),
        );
        let response = self.chain.call(self.address, calldata).await?;
        let decoded = IAllowanceTransfer::allowanceCall::abi_decode_returns(&response)?;
        Ok(PermitAllowance {
            amount: decoded.amount,
            expiration: decoded.expiration,
            nonce: decoded.nonce,
        })
    }
}

pub struct PositionWrapper<'a> {
    address: Address,
    chain: &'a dyn ChainClient,
}

impl<'a> PositionWrapper<'a> {
    pub fn new(address: Address, chain: &'a dyn ChainClient) -> Self {
        Self { address, chain }
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, ChainError> {
        let calldata = Bytes::from(IPositionWrapper::balanceOfCall { account }.abi_encode());
        let response = self.chain.call(self.address, calldata).await?;
        Ok(IPositionWrapper::balanceOfCall::abi_decode_returns(&response)?)
    }

    pub async fn token0(&self) -> Result<Address, ChainError> {
        let calldata = Bytes::from(IPositionWrapper::token0Call {}.abi_encode());
        let response = self.chain.call(self.address, calldata).await?;
        Ok(IPositionWrapper::token0Call::abi_decode_returns(&response)?)
    }

    pub async fn token1(&self) -> Result<Address, ChainError> {
        let calldata = Bytes::from(IPositionWrapper::token1Call {}.abi_encode());
        let response = self.chain.call(self.address, calldata).await?;
        Ok(IPositionWrapper::token1Call::abi_decode_returns(&response)?)
    }
}
