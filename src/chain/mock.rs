use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes, Log, TxHash};
use async_trait::async_trait;

use super::{ChainClient, ChainError, TxOutcome};

type Selector = [u8; 4];

/// Scripted response for an `eth_call`.
pub(crate) enum CallResponse {
    Return(Bytes),
    Revert(&'static str),
}

/// Scripted response for a submitted transaction.
pub(crate) enum SendResponse {
    Mined { logs: Vec<Log> },
    EstimationRevert(&'static str),
    Reverted,
}

#[derive(Default)]
struct Script {
    calls: HashMap<(Address, Selector), VecDeque<CallResponse>>,
    sends: HashMap<(Address, Selector), VecDeque<SendResponse>>,
    call_log: Vec<(Address, Bytes)>,
    send_log: Vec<(Address, Bytes, String)>,
}

/// Scripted `ChainClient`. Responses are queued per (contract, selector)
/// pair and consumed in order, which is how the wrapper probe tests model
/// repeated calls to the same getter with increasing indices.
#[derive(Default)]
pub(crate) struct MockChain {
    script: Mutex<Script>,
    next_tx: Mutex<u64>,
}

impl MockChain {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn on_call(&self, contract: Address, selector: Selector, response: CallResponse) {
        self.script
            .lock()
            .unwrap()
            .calls
            .entry((contract, selector))
            .or_default()
            .push_back(response);
    }

    pub(crate) fn on_send(&self, contract: Address, selector: Selector, response: SendResponse) {
        self.script
            .lock()
            .unwrap()
            .sends
            .entry((contract, selector))
            .or_default()
            .push_back(response);
    }

    /// Every read issued, in order.
    pub(crate) fn calls(&self) -> Vec<(Address, Bytes)> {
        self.script.lock().unwrap().call_log.clone()
    }

    /// Every transaction submitted, in order, with its log note.
    pub(crate) fn sends(&self) -> Vec<(Address, Bytes, String)> {
        self.script.lock().unwrap().send_log.clone()
    }

    fn selector(calldata: &Bytes) -> Selector {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&calldata[..4]);
        selector
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, ChainError> {
        let selector = Self::selector(&calldata);
        let mut script = self.script.lock().unwrap();
        script.call_log.push((contract, calldata));
        let response = script
            .calls
            .get_mut(&(contract, selector))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                panic!("unscripted call to {contract} selector 0x{}", alloy::hex::encode(selector))
            });
        match response {
            CallResponse::Return(bytes) => Ok(bytes),
            CallResponse::Revert(reason) => Err(ChainError::CallReverted {
                reason: reason.into(),
            }),
        }
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TxOutcome, ChainError> {
        let selector = Self::selector(&calldata);
        let mut script = self.script.lock().unwrap();
        script.send_log.push((contract, calldata, note.to_string()));
        let response = script
            .sends
            .get_mut(&(contract, selector))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                panic!("unscripted send to {contract} selector 0x{}", alloy::hex::encode(selector))
            });
        let mut next_tx = self.next_tx.lock().unwrap();
        *next_tx += 1;
        let tx_hash = TxHash::with_last_byte(*next_tx as u8);
        match response {
            SendResponse::Mined { logs } => Ok(TxOutcome {
                tx_hash,
                gas_used: 21_000,
                logs,
            }),
            SendResponse::EstimationRevert(reason) => Err(ChainError::GasEstimationFailed {
                reason: reason.into(),
            }),
            SendResponse::Reverted => Err(ChainError::TransactionReverted { tx_hash }),
        }
    }
}
