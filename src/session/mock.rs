use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Signature};
use alloy::signers::Signer;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::{Eip712Domain, SolStruct};
use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{SessionError, SessionEvent, WalletSession};
use crate::bindings::PermitBatch;

/// Test session that signs with a throwaway key and records every
/// signature request so tests can assert how often the user was prompted.
pub(crate) struct MockSession {
    signer: PrivateKeySigner,
    events: broadcast::Sender<SessionEvent>,
    sign_requests: AtomicUsize,
    reject_next: AtomicBool,
    signed_batches: Mutex<Vec<PermitBatch>>,
}

impl MockSession {
    pub(crate) fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            signer: PrivateKeySigner::random(),
            events,
            sign_requests: AtomicUsize::new(0),
            reject_next: AtomicBool::new(false),
            signed_batches: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn sign_requests(&self) -> usize {
        self.sign_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn reject_next(&self) {
        self.reject_next.store(true, Ordering::SeqCst);
    }

    pub(crate) fn signed_batches(&self) -> Vec<PermitBatch> {
        self.signed_batches.lock().unwrap().clone()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl WalletSession for MockSession {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_permit_batch(
        &self,
        domain: &Eip712Domain,
        batch: &PermitBatch,
    ) -> Result<Signature, SessionError> {
        self.sign_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_next.swap(false, Ordering::SeqCst) {
            return Err(SessionError::UserRejected);
        }
        self.signed_batches.lock().unwrap().push(batch.clone());
        let digest = batch.eip712_signing_hash(domain);
        Ok(self.signer.sign_hash(&digest).await?)
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
