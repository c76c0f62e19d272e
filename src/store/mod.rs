//! Off-chain metadata store mirror. The chain is the source of truth;
//! this REST service caches portfolio module addresses and position
//! bookkeeping so flows do not have to replay factory events.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

mod rest;
#[cfg(test)]
pub(crate) mod mock;

pub use rest::RestStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("portfolio not found in metadata store")]
    NotFound,
    #[error("portfolio already exists in metadata store")]
    Conflict,
    #[error("metadata store returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("metadata store request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One portfolio as mirrored off-chain. Fees are percentages (basis
/// points / 100) and amounts are decimal strings, matching what the
/// creation workflow submitted before base-unit conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRecord {
    pub user_address: Address,
    pub portfolio_id: u64,
    pub portfolio_address: Address,
    pub name: String,
    pub symbol: String,
    pub owner: Address,
    pub access_controller: Address,
    pub is_public_portfolio: bool,
    pub token_exclusion_manager: Address,
    pub rebalancing: Address,
    pub borrow_manager: Address,
    pub asset_management_config: Address,
    pub fee_module: Address,
    pub vault_address: Address,
    pub gnosis_module: Address,
    pub management_fee: Decimal,
    pub performance_fee: Decimal,
    pub entry_fee: Decimal,
    pub exit_fee: Decimal,
    pub initial_amount: String,
    pub min_holding: String,
    pub is_public: bool,
    pub is_transferable: bool,
    pub is_transferable_to_public: bool,
    pub whitelist_tokens: bool,
    pub whitelisted_protocol_ids: Vec<B256>,
    #[serde(default)]
    pub position_list: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_index: Option<usize>,
    #[serde(default)]
    pub initialized_thena: bool,
}

/// Partial update; only populated fields are merged server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_list: Option<Vec<Address>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialized_thena: Option<bool>,
}

#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn create(&self, record: &PortfolioRecord) -> Result<PortfolioRecord, StoreError>;

    async fn get_by_user(&self, user: Address) -> Result<Vec<PortfolioRecord>, StoreError>;

    async fn get_by_id(&self, portfolio_id: u64) -> Result<PortfolioRecord, StoreError>;

    /// Merges the populated fields of `update` into the stored record.
    async fn update(
        &self,
        portfolio_id: u64,
        update: &PortfolioUpdate,
    ) -> Result<PortfolioRecord, StoreError>;

    async fn delete(&self, portfolio_id: u64) -> Result<(), StoreError>;
}
