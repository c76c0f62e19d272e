use alloy::primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;

use crate::chain::ChainError;
use crate::session::SessionError;
use crate::store::StoreError;
use crate::units::UnitsError;
use crate::workflows::withdraw::WithdrawCheckpoint;

/// Input problems caught before any signature or transaction.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between 0 and 100 percent, got {value}")]
    FeeOutOfRange { field: &'static str, value: Decimal },
    #[error("{field} of {value} is finer than one basis point")]
    SubBasisPointFee { field: &'static str, value: Decimal },
    #[error("{field} must be positive, got {value}")]
    NonPositiveAmount { field: &'static str, value: Decimal },
    #[error("withdrawal percentage must be in (0, 100], got {0}")]
    WithdrawalPercentage(Decimal),
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("tick {0} does not fit in int24")]
    TickOutOfRange(i32),
    #[error(transparent)]
    Units(#[from] UnitsError),
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("insufficient balance of {token}: required {required}, available {available}")]
    InsufficientBalance {
        token: Address,
        required: U256,
        available: U256,
    },
    #[error("{event} event not found in logs of tx {tx_hash}")]
    EventNotFound {
        event: &'static str,
        tx_hash: TxHash,
    },
    #[error("{what} resolved to the zero address")]
    ZeroAddress { what: &'static str },
    #[error("portfolio has no tokens registered")]
    EmptyTokenList,
    #[error("portfolio {portfolio_id} has no active liquidity position")]
    NoActivePosition { portfolio_id: u64 },
    #[error(
        "portfolio {portfolio_address} is live on-chain but the metadata store write failed; \
         the record must be reconciled manually"
    )]
    PersistenceInconsistency {
        portfolio_address: Address,
        #[source]
        source: StoreError,
    },
    #[error(
        "portfolio tokens were burned in tx {} but the liquidity decrease did not complete; \
         resume the withdrawal to finish",
        checkpoint.withdrawal_tx
    )]
    PartialWithdrawal {
        checkpoint: WithdrawCheckpoint,
        #[source]
        source: Box<WorkflowError>,
    },
    #[error("wallet switched to chain {chain_id}; workflow aborted")]
    SessionInvalidated { chain_id: u64 },
}
