use alloy::primitives::aliases::U24;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::{Orchestrator, run_cancellable};
use crate::bindings::WithdrawRepayParams;
use crate::error::{ValidationError, WorkflowError};
use crate::gateway::{
    AssetManagementConfig, Portfolio, PositionManager, PositionWrapper, WrapperSlot,
};
use crate::session::WalletSession;
use crate::store::{PortfolioRecord, StoreClient};
use crate::units::{FEE_SCALE_BPS, percentage_to_bps};

/// Uniswap-style pool fee passed to `decreaseLiquidity`.
const DECREASE_POOL_FEE: u16 = 100;

/// State needed to finish a withdrawal whose burn transaction confirmed
/// but whose liquidity decrease did not.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawCheckpoint {
    pub portfolio_id: u64,
    pub position_manager: Address,
    pub wrapper: Address,
    pub withdrawal_tx: TxHash,
}

/// Hashes of the two transactions a completed withdrawal comprises.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawOutcome {
    pub withdrawal_tx: TxHash,
    pub decrease_tx: TxHash,
}

impl Orchestrator {
    /// Burns a percentage of the caller's portfolio tokens, then unwinds
    /// the corresponding share of the active liquidity position. The two
    /// transactions are not atomic: if the second fails, the error carries
    /// a [`WithdrawCheckpoint`] and [`Orchestrator::resume_withdraw`]
    /// finishes the job without burning again.
    pub async fn withdraw(
        &self,
        portfolio_id: u64,
        percentage: Decimal,
    ) -> Result<WithdrawOutcome, WorkflowError> {
        run_cancellable(
            self.session.as_ref(),
            self.withdraw_flow(portfolio_id, percentage),
        )
        .await
    }

    /// Runs only the liquidity-decrease leg for a portfolio whose burn
    /// already confirmed.
    pub async fn resume_withdraw(&self, portfolio_id: u64) -> Result<TxHash, WorkflowError> {
        run_cancellable(self.session.as_ref(), async {
            let record = self.store.get_by_id(portfolio_id).await?;
            let (manager, wrapper) = self.resolve_active_position(&record).await?;
            self.decrease_leg(manager, wrapper).await
        })
        .await
    }

    async fn withdraw_flow(
        &self,
        portfolio_id: u64,
        percentage: Decimal,
    ) -> Result<WithdrawOutcome, WorkflowError> {
        if percentage <= Decimal::ZERO || percentage > Decimal::from(100) {
            return Err(ValidationError::WithdrawalPercentage(percentage).into());
        }
        let bps = percentage_to_bps(percentage)
            .map_err(|_| ValidationError::WithdrawalPercentage(percentage))?;

        let record = self.store.get_by_id(portfolio_id).await?;
        let owner = self.session.address();
        let portfolio = Portfolio::new(record.portfolio_address, self.chain.as_ref());

        let balance = portfolio.balance_of(owner).await?;
        if balance.is_zero() {
            return Err(WorkflowError::InsufficientBalance {
                token: record.portfolio_address,
                required: U256::from(1u8),
                available: U256::ZERO,
            });
        }
        let withdrawal_amount = balance * U256::from(bps) / U256::from(FEE_SCALE_BPS);

        // Resolve the active position before burning so a registry problem
        // cannot strand the user between the two transactions.
        let (manager, wrapper) = self.resolve_active_position(&record).await?;

        let outcome = portfolio
            .multi_token_withdrawal(withdrawal_amount, self.repay_params())
            .await?;
        info!(
            portfolio_id,
            tx_hash = %outcome.tx_hash,
            %withdrawal_amount,
            "portfolio tokens burned"
        );

        let checkpoint = WithdrawCheckpoint {
            portfolio_id,
            position_manager: manager,
            wrapper,
            withdrawal_tx: outcome.tx_hash,
        };
        match self.decrease_leg(manager, wrapper).await {
            Ok(decrease_tx) => Ok(WithdrawOutcome {
                withdrawal_tx: outcome.tx_hash,
                decrease_tx,
            }),
            Err(source) => {
                warn!(
                    portfolio_id,
                    withdrawal_tx = %checkpoint.withdrawal_tx,
                    "burn confirmed but liquidity decrease failed"
                );
                Err(WorkflowError::PartialWithdrawal {
                    checkpoint,
                    source: Box::new(source),
                })
            }
        }
    }

    async fn resolve_active_position(
        &self,
        record: &PortfolioRecord,
    ) -> Result<(Address, Address), WorkflowError> {
        let position_index = record.position_index.ok_or(WorkflowError::NoActivePosition {
            portfolio_id: record.portfolio_id,
        })?;
        let manager =
            AssetManagementConfig::new(record.asset_management_config, self.chain.as_ref())
                .last_deployed_position_manager()
                .await?;
        if manager.is_zero() {
            return Err(WorkflowError::ZeroAddress {
                what: "position manager",
            });
        }
        match PositionManager::new(manager, self.chain.as_ref())
            .wrapper_at(position_index)
            .await?
        {
            WrapperSlot::Address(wrapper) if !wrapper.is_zero() => Ok((manager, wrapper)),
            _ => Err(WorkflowError::NoActivePosition {
                portfolio_id: record.portfolio_id,
            }),
        }
    }

    async fn decrease_leg(
        &self,
        manager: Address,
        wrapper_address: Address,
    ) -> Result<TxHash, WorkflowError> {
        let owner = self.session.address();
        let wrapper = PositionWrapper::new(wrapper_address, self.chain.as_ref());
        let position_balance = wrapper.balance_of(owner).await?;
        if position_balance.is_zero() {
            return Err(WorkflowError::InsufficientBalance {
                token: wrapper_address,
                required: U256::from(1u8),
                available: U256::ZERO,
            });
        }
        let token0 = wrapper.token0().await?;
        let token1 = wrapper.token1().await?;

        let outcome = PositionManager::new(manager, self.chain.as_ref())
            .decrease_liquidity(
                wrapper_address,
                position_balance,
                U256::ZERO,
                U256::ZERO,
                Address::ZERO,
                token0,
                token1,
                U256::ZERO,
                U24::from(DECREASE_POOL_FEE),
            )
            .await?;
        info!(tx_hash = %outcome.tx_hash, %position_balance, "liquidity decreased");
        Ok(outcome.tx_hash)
    }

    /// Repayment parameters for the no-flash-loan withdrawal path.
    fn repay_params(&self) -> WithdrawRepayParams {
        WithdrawRepayParams {
            _factory: self.protocol.thena_factory,
            _token0: Address::ZERO,
            _token1: Address::ZERO,
            _flashLoanToken: Address::ZERO,
            _solverHandler: self.protocol.enso_handler,
            _swapHandler: self.protocol.swap_handler,
            _bufferUnit: U256::ZERO,
            _flashLoanAmount: vec![vec![U256::ZERO]],
            _poolFees: vec![vec![U256::ZERO, U256::ZERO, U256::ZERO]],
            firstSwapData: vec![vec![Bytes::new()]],
            secondSwapData: vec![vec![Bytes::new()]],
            isDexRepayment: false,
        }
    }
}
