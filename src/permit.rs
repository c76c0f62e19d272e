//! Permit2 batched-approval assembly. One deposit signs a single
//! `PermitBatch` covering every portfolio token, regardless of how many
//! tokens the portfolio holds.

use alloy::primitives::aliases::{U48, U160};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{Eip712Domain, eip712_domain};

use crate::bindings::{PermitBatch, PermitDetails};
use crate::chain::ChainClient;
use crate::error::WorkflowError;
use crate::gateway::{Erc20, Permit2};
use crate::session::WalletSession;

/// Signature lifetime, matching the 30-hour deadline the protocol
/// frontend uses.
pub const PERMIT_TTL_SECS: u64 = 30 * 60 * 60;

/// How much of each token a deposit takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepositMode {
    /// Deposit the wallet's entire balance of every portfolio token.
    FullBalance,
    /// Deposit exactly this many base units of every portfolio token.
    Amount(U256),
}

/// A permit batch plus the per-token amounts it covers and the signature
/// authorizing it.
#[derive(Debug, Clone)]
pub struct SignedPermit {
    pub batch: PermitBatch,
    pub amounts: Vec<U256>,
    pub signature: Bytes,
}

pub struct PermitBuilder<'a> {
    chain: &'a dyn ChainClient,
    session: &'a dyn WalletSession,
    permit2: Address,
    chain_id: u64,
}

impl<'a> PermitBuilder<'a> {
    pub fn new(
        chain: &'a dyn ChainClient,
        session: &'a dyn WalletSession,
        permit2: Address,
        chain_id: u64,
    ) -> Self {
        Self {
            chain,
            session,
            permit2,
            chain_id,
        }
    }

    fn domain(&self) -> Eip712Domain {
        eip712_domain! {
            name: "Permit2",
            chain_id: self.chain_id,
            verifying_contract: self.permit2,
        }
    }

    /// Resolves balances and nonces for every token, validates the
    /// requested amounts, and obtains one signature over the whole batch.
    /// Balance checks run before the wallet is prompted, so an
    /// underfunded deposit never reaches the signature step.
    pub async fn build(
        &self,
        tokens: &[Address],
        spender: Address,
        mode: DepositMode,
    ) -> Result<SignedPermit, WorkflowError> {
        if tokens.is_empty() {
            return Err(WorkflowError::EmptyTokenList);
        }
        let owner = self.session.address();
        let permit2 = Permit2::new(self.permit2, self.chain);
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        let expiration = U48::from(now + PERMIT_TTL_SECS);
        let sig_deadline = U256::from(now + PERMIT_TTL_SECS);

        let mut details = Vec::with_capacity(tokens.len());
        let mut amounts = Vec::with_capacity(tokens.len());
        for &token in tokens {
            let available = Erc20::new(token, self.chain).balance_of(owner).await?;
            let amount = match mode {
                DepositMode::FullBalance => available,
                DepositMode::Amount(requested) => {
                    if available < requested {
                        return Err(WorkflowError::InsufficientBalance {
                            token,
                            required: requested,
                            available,
                        });
                    }
                    requested
                }
            };
            if amount > U256::from(U160::MAX) {
                return Err(WorkflowError::InsufficientBalance {
                    token,
                    required: amount,
                    available: U256::from(U160::MAX),
                });
            }
            // Nonces are tracked per (owner, token, spender) triple.
            let allowance = permit2.allowance(owner, token, spender).await?;
            details.push(PermitDetails {
                token,
                amount: U160::from(amount),
                expiration,
                nonce: allowance.nonce,
            });
            amounts.push(amount);
        }

        let batch = PermitBatch {
            details,
            spender,
            sigDeadline: sig_deadline,
        };
        let signature = self
            .session
            .sign_permit_batch(&self.domain(), &batch)
            .await?;
        Ok(SignedPermit {
            batch,
            amounts,
            signature: signature.as_bytes().to_vec().into(),
        })
    }
}
