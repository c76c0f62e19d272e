//! Wallet session abstraction. Workflows never hold key material; they ask
//! the session for the active address, for EIP-712 signatures, and subscribe
//! to session lifecycle events so long-running flows can bail out when the
//! wallet switches chains.

use alloy::primitives::{Address, Signature};
use alloy::sol_types::Eip712Domain;
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::bindings::PermitBatch;

mod local;
#[cfg(test)]
pub(crate) mod mock;

pub use local::LocalSession;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("signature request rejected by the wallet")]
    UserRejected,
    #[error("signer failure: {0}")]
    Signer(#[from] alloy::signers::Error),
}

/// Lifecycle notifications mirroring the events an injected browser wallet
/// emits. `ChainChanged` invalidates any workflow in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

#[async_trait]
pub trait WalletSession: Send + Sync {
    /// The address transactions are sent from and permits are signed by.
    fn address(&self) -> Address;

    /// Requests one EIP-712 signature over a Permit2 batch. Callers batch
    /// every token into a single `PermitBatch` so the user signs once per
    /// deposit regardless of token count.
    async fn sign_permit_batch(
        &self,
        domain: &Eip712Domain,
        batch: &PermitBatch,
    ) -> Result<Signature, SessionError>;

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}
