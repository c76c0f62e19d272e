use alloy::primitives::{Address, Signature};
use alloy::signers::Signer;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::{Eip712Domain, SolStruct};
use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{SessionError, SessionEvent, WalletSession};
use crate::bindings::PermitBatch;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Session backed by an in-process private key. A local key never switches
/// accounts or chains on its own, so the event channel stays silent unless
/// something external calls [`LocalSession::emit`].
pub struct LocalSession {
    signer: PrivateKeySigner,
    events: broadcast::Sender<SessionEvent>,
}

impl LocalSession {
    pub fn new(signer: PrivateKeySigner) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { signer, events }
    }

    pub fn emit(&self, event: SessionEvent) {
        // Errors only mean nobody is subscribed.
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl WalletSession for LocalSession {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_permit_batch(
        &self,
        domain: &Eip712Domain,
        batch: &PermitBatch,
    ) -> Result<Signature, SessionError> {
        let digest = batch.eip712_signing_hash(domain);
        Ok(self.signer.sign_hash(&digest).await?)
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
