use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use async_trait::async_trait;

use super::{PortfolioRecord, PortfolioUpdate, StoreClient, StoreError};

/// In-memory store with the same merge semantics as the REST service.
#[derive(Default)]
pub(crate) struct MockStore {
    records: Mutex<BTreeMap<u64, PortfolioRecord>>,
    fail_create: Mutex<bool>,
    fail_update: Mutex<bool>,
}

impl MockStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_record(record: PortfolioRecord) -> Arc<Self> {
        let store = Self::new();
        store
            .records
            .lock()
            .unwrap()
            .insert(record.portfolio_id, record);
        store
    }

    pub(crate) fn fail_next_create(&self) {
        *self.fail_create.lock().unwrap() = true;
    }

    pub(crate) fn fail_next_update(&self) {
        *self.fail_update.lock().unwrap() = true;
    }

    pub(crate) fn record(&self, portfolio_id: u64) -> Option<PortfolioRecord> {
        self.records.lock().unwrap().get(&portfolio_id).cloned()
    }
}

#[async_trait]
impl StoreClient for MockStore {
    async fn create(&self, record: &PortfolioRecord) -> Result<PortfolioRecord, StoreError> {
        if std::mem::take(&mut *self.fail_create.lock().unwrap()) {
            return Err(StoreError::Api {
                status: 500,
                message: "injected failure".into(),
            });
        }
        let mut records = self.records.lock().unwrap();
        let collision = records.values().any(|existing| {
            existing.portfolio_id == record.portfolio_id
                || existing.portfolio_address == record.portfolio_address
        });
        if collision {
            return Err(StoreError::Conflict);
        }
        records.insert(record.portfolio_id, record.clone());
        Ok(record.clone())
    }

    async fn get_by_user(&self, user: Address) -> Result<Vec<PortfolioRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|record| record.user_address == user)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, portfolio_id: u64) -> Result<PortfolioRecord, StoreError> {
        self.records
            .lock()
            .unwrap()
            .get(&portfolio_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(
        &self,
        portfolio_id: u64,
        update: &PortfolioUpdate,
    ) -> Result<PortfolioRecord, StoreError> {
        if std::mem::take(&mut *self.fail_update.lock().unwrap()) {
            return Err(StoreError::Api {
                status: 500,
                message: "injected failure".into(),
            });
        }
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&portfolio_id).ok_or(StoreError::NotFound)?;
        if let Some(position_list) = &update.position_list {
            record.position_list = position_list.clone();
        }
        if let Some(position_index) = update.position_index {
            record.position_index = Some(position_index);
        }
        if let Some(initialized) = update.initialized_thena {
            record.initialized_thena = initialized;
        }
        Ok(record.clone())
    }

    async fn delete(&self, portfolio_id: u64) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .remove(&portfolio_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
