use alloy::primitives::U256;
use alloy::sol_types::SolEvent;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::{Orchestrator, run_cancellable};
use crate::bindings::{IPortfolioFactory, PortfolioCreationInitData};
use crate::error::{ValidationError, WorkflowError};
use crate::gateway::Factory;
use crate::session::WalletSession;
use crate::store::{PortfolioRecord, StoreClient};
use crate::units::{percentage_to_bps, to_base_units};

/// User-supplied creation parameters. Fees are percentages, amounts are
/// decimal token quantities; conversion to contract units happens after
/// validation.
#[derive(Debug, Clone)]
pub struct CreatePortfolioParams {
    pub name: String,
    pub symbol: String,
    pub management_fee: Decimal,
    pub performance_fee: Decimal,
    pub entry_fee: Decimal,
    pub exit_fee: Decimal,
    pub initial_amount: Decimal,
    pub min_holding: Decimal,
    pub is_public: bool,
    pub is_transferable: bool,
    pub is_transferable_to_public: bool,
    pub whitelist_tokens: bool,
}

impl CreatePortfolioParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::Empty { field: "symbol" });
        }
        for (field, value) in [
            ("management fee", self.management_fee),
            ("performance fee", self.performance_fee),
            ("entry fee", self.entry_fee),
            ("exit fee", self.exit_fee),
        ] {
            if value.is_sign_negative() || value > Decimal::from(100) {
                return Err(ValidationError::FeeOutOfRange { field, value });
            }
            let scaled = (value * Decimal::from(100)).normalize();
            if scaled.scale() != 0 {
                return Err(ValidationError::SubBasisPointFee { field, value });
            }
        }
        for (field, value) in [
            ("initial amount", self.initial_amount),
            ("minimum holding", self.min_holding),
        ] {
            if value <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveAmount { field, value });
            }
        }
        Ok(())
    }
}

impl Orchestrator {
    /// Creates a portfolio through the factory and mirrors the resulting
    /// module bundle into the metadata store. All validation happens
    /// before gas estimation, so malformed input never reaches the chain.
    pub async fn create_portfolio(
        &self,
        params: CreatePortfolioParams,
    ) -> Result<PortfolioRecord, WorkflowError> {
        run_cancellable(self.session.as_ref(), self.create_portfolio_flow(params)).await
    }

    async fn create_portfolio_flow(
        &self,
        params: CreatePortfolioParams,
    ) -> Result<PortfolioRecord, WorkflowError> {
        params.validate().map_err(WorkflowError::Validation)?;

        let init_data = PortfolioCreationInitData {
            _assetManagerTreasury: self.protocol.treasury,
            _whitelistedTokens: Vec::new(),
            _managementFee: U256::from(percentage_to_bps(params.management_fee).map_err(ValidationError::Units)?),
            _performanceFee: U256::from(percentage_to_bps(params.performance_fee).map_err(ValidationError::Units)?),
            _entryFee: U256::from(percentage_to_bps(params.entry_fee).map_err(ValidationError::Units)?),
            _exitFee: U256::from(percentage_to_bps(params.exit_fee).map_err(ValidationError::Units)?),
            _initialPortfolioAmount: to_base_units(params.initial_amount, 18)
                .map_err(ValidationError::Units)?,
            _minPortfolioTokenHoldingAmount: to_base_units(params.min_holding, 18)
                .map_err(ValidationError::Units)?,
            _public: params.is_public,
            _transferable: params.is_transferable,
            _transferableToPublic: params.is_transferable_to_public,
            _whitelistTokens: params.whitelist_tokens,
            _witelistedProtocolIds: vec![self.protocol.protocol_hash],
            _name: params.name.clone(),
            _symbol: params.symbol.clone(),
        };

        let factory = Factory::new(self.protocol.factory, self.chain.as_ref());
        let outcome = factory.create_portfolio(init_data).await?;

        let event = outcome
            .logs
            .iter()
            .find_map(|log| IPortfolioFactory::PortfolioInfo::decode_log(log).ok())
            .ok_or(WorkflowError::EventNotFound {
                event: "PortfolioInfo",
                tx_hash: outcome.tx_hash,
            })?;
        let modules = &event.data.portfolioData;
        let portfolio_address = modules.portfolio;
        info!(
            %portfolio_address,
            portfolio_id = %event.data.portfolioId,
            "portfolio created"
        );

        let record = PortfolioRecord {
            user_address: self.session.address(),
            portfolio_id: event.data.portfolioId.saturating_to(),
            portfolio_address,
            name: event.data._name.clone(),
            symbol: event.data._symbol.clone(),
            owner: event.data._owner,
            access_controller: event.data._accessController,
            is_public_portfolio: event.data.isPublicPortfolio,
            token_exclusion_manager: modules.tokenExclusionManager,
            rebalancing: modules.rebalancing,
            borrow_manager: modules.borrowManager,
            asset_management_config: modules.assetManagementConfig,
            fee_module: modules.feeModule,
            vault_address: modules.vaultAddress,
            gnosis_module: modules.gnosisModule,
            management_fee: params.management_fee.normalize(),
            performance_fee: params.performance_fee.normalize(),
            entry_fee: params.entry_fee.normalize(),
            exit_fee: params.exit_fee.normalize(),
            initial_amount: params.initial_amount.normalize().to_string(),
            min_holding: params.min_holding.normalize().to_string(),
            is_public: params.is_public,
            is_transferable: params.is_transferable,
            is_transferable_to_public: params.is_transferable_to_public,
            whitelist_tokens: params.whitelist_tokens,
            whitelisted_protocol_ids: vec![self.protocol.protocol_hash],
            position_list: Vec::new(),
            position_index: None,
            initialized_thena: false,
        };

        match self.store.create(&record).await {
            Ok(stored) => Ok(stored),
            Err(source) => {
                warn!(%portfolio_address, %source, "portfolio live on-chain but store write failed");
                Err(WorkflowError::PersistenceInconsistency {
                    portfolio_address,
                    source,
                })
            }
        }
    }
}
