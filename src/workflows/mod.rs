//! User-facing flows. Each flow is a linear sequence of chain reads,
//! signature prompts, submitted transactions and store writes; every step
//! consumes the confirmed output of the previous one, so nothing inside a
//! flow runs concurrently. A `ChainChanged` session event aborts whatever
//! flow is in flight.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::chain::ChainClient;
use crate::config::ProtocolCtx;
use crate::error::WorkflowError;
use crate::session::{SessionEvent, WalletSession};
use crate::store::StoreClient;

pub mod approve;
pub mod create;
pub mod deposit;
pub mod position;
pub mod rebalance;
pub mod thena;
pub mod withdraw;

pub struct Orchestrator {
    pub(crate) chain: Arc<dyn ChainClient>,
    pub(crate) session: Arc<dyn WalletSession>,
    pub(crate) store: Arc<dyn StoreClient>,
    pub(crate) protocol: ProtocolCtx,
}

impl Orchestrator {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        session: Arc<dyn WalletSession>,
        store: Arc<dyn StoreClient>,
        protocol: ProtocolCtx,
    ) -> Self {
        Self {
            chain,
            session,
            store,
            protocol,
        }
    }

    /// Address of the wallet behind the active session.
    pub fn owner(&self) -> alloy::primitives::Address {
        self.session.address()
    }
}

/// Races a workflow against the session event stream. A chain switch
/// invalidates every address and nonce assumption the flow started with,
/// so the flow is dropped at its current await point.
pub(crate) async fn run_cancellable<T>(
    session: &dyn WalletSession,
    flow: impl Future<Output = Result<T, WorkflowError>>,
) -> Result<T, WorkflowError> {
    let mut events = session.subscribe();
    let chain_switched = async {
        loop {
            match events.recv().await {
                Ok(SessionEvent::ChainChanged(chain_id)) => return chain_id,
                Ok(SessionEvent::AccountsChanged(_)) => continue,
                // A closed or lagging channel never cancels the flow.
                Err(RecvError::Closed) => std::future::pending().await,
                Err(RecvError::Lagged(_)) => continue,
            }
        }
    };
    tokio::select! {
        result = flow => result,
        chain_id = chain_switched => Err(WorkflowError::SessionInvalidated { chain_id }),
    }
}
