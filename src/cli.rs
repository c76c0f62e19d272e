//! CLI commands for portfolio creation, liquidity management and
//! withdrawals.

use std::io::Write;
use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::U256;
use alloy::providers::ProviderBuilder;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::chain::RpcChain;
use crate::config::{Ctx, Env};
use crate::error::WorkflowError;
use crate::permit::DepositMode;
use crate::session::LocalSession;
use crate::store::{RestStore, StoreClient};
use crate::units::to_base_units;
use crate::workflows::Orchestrator;
use crate::workflows::create::CreatePortfolioParams;
use crate::workflows::position::PositionSpec;

#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(about = "Client for the on-chain portfolio protocol")]
#[command(version)]
pub struct CliEnv {
    #[clap(flatten)]
    env: Env,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a portfolio and mirror it into the metadata store
    Create {
        /// Portfolio name
        #[arg(long)]
        name: String,
        /// Portfolio token symbol
        #[arg(long)]
        symbol: String,
        /// Management fee as a percentage, defaults from config
        #[arg(long)]
        management_fee: Option<Decimal>,
        /// Performance fee as a percentage
        #[arg(long)]
        performance_fee: Option<Decimal>,
        /// Entry fee as a percentage
        #[arg(long)]
        entry_fee: Option<Decimal>,
        /// Exit fee as a percentage
        #[arg(long)]
        exit_fee: Option<Decimal>,
        /// Initial portfolio amount in whole tokens
        #[arg(long)]
        initial_amount: Option<Decimal>,
        /// Minimum portfolio token holding in whole tokens
        #[arg(long)]
        min_holding: Option<Decimal>,
        /// Mark the portfolio private
        #[arg(long)]
        private: bool,
        /// Disallow portfolio token transfers
        #[arg(long)]
        non_transferable: bool,
        /// Restrict deposits to whitelisted tokens
        #[arg(long)]
        whitelist_tokens: bool,
    },
    /// List portfolios recorded for the signing wallet
    List,
    /// Enable the Thena position manager for a portfolio
    InitThena {
        #[arg(long)]
        portfolio_id: u64,
    },
    /// Deploy a liquidity position wrapper with the configured pair
    CreatePosition {
        #[arg(long)]
        portfolio_id: u64,
    },
    /// Grant Permit2 an ERC-20 allowance for every portfolio token
    ApproveTokens {
        #[arg(long)]
        portfolio_id: u64,
    },
    /// Deposit into every portfolio token with one permit signature
    Deposit {
        #[arg(long)]
        portfolio_id: u64,
        /// Per-token amount in whole tokens; omit to deposit full balances
        #[arg(long)]
        amount: Option<Decimal>,
    },
    /// Move the vault's base-token balance into the active position
    Rebalance {
        #[arg(long)]
        portfolio_id: u64,
    },
    /// Burn a percentage of portfolio tokens and unwind liquidity
    Withdraw {
        #[arg(long)]
        portfolio_id: u64,
        /// Percentage of the portfolio token balance to withdraw, in (0, 100]
        #[arg(long)]
        percentage: Decimal,
    },
    /// Re-run the liquidity-decrease leg of an interrupted withdrawal
    ResumeWithdraw {
        #[arg(long)]
        portfolio_id: u64,
    },
}

impl CliEnv {
    /// Parse CLI arguments, load config from file, and return with
    /// subcommand.
    pub fn parse_and_convert() -> anyhow::Result<(Ctx, Commands)> {
        Self::parse().load()
    }

    fn load(self) -> anyhow::Result<(Ctx, Commands)> {
        let ctx = self.env.try_into_ctx()?;
        Ok((ctx, self.command))
    }
}

pub async fn run_command(ctx: Ctx, command: Commands) -> anyhow::Result<()> {
    let signer = ctx.signer.clone();
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer.clone()))
        .connect_http(ctx.rpc_url.clone());
    let chain = Arc::new(RpcChain::new(provider, signer.address()));
    let session = Arc::new(LocalSession::new(signer));
    let store = Arc::new(RestStore::new(ctx.store_url.clone()));
    let orchestrator = Orchestrator::new(chain, session, store.clone(), ctx.protocol.clone());

    run_command_with_writer(
        &ctx,
        orchestrator,
        store,
        command,
        &mut std::io::stdout(),
    )
    .await
}

async fn run_command_with_writer<W: Write>(
    ctx: &Ctx,
    orchestrator: Orchestrator,
    store: Arc<dyn StoreClient>,
    command: Commands,
    stdout: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Create {
            name,
            symbol,
            management_fee,
            performance_fee,
            entry_fee,
            exit_fee,
            initial_amount,
            min_holding,
            private,
            non_transferable,
            whitelist_tokens,
        } => {
            let defaults = &ctx.defaults;
            let params = CreatePortfolioParams {
                name,
                symbol,
                management_fee: management_fee.unwrap_or(defaults.management_fee),
                performance_fee: performance_fee.unwrap_or(defaults.performance_fee),
                entry_fee: entry_fee.unwrap_or(defaults.entry_fee),
                exit_fee: exit_fee.unwrap_or(defaults.exit_fee),
                initial_amount: initial_amount.unwrap_or(defaults.initial_amount),
                min_holding: min_holding.unwrap_or(defaults.min_holding),
                is_public: !private,
                is_transferable: !non_transferable,
                is_transferable_to_public: !non_transferable && !private,
                whitelist_tokens,
            };
            let record = orchestrator.create_portfolio(params).await?;
            writeln!(
                stdout,
                "Created portfolio {} (id {}) with vault {}",
                record.portfolio_address, record.portfolio_id, record.vault_address
            )?;
        }
        Commands::List => {
            let records = store.get_by_user(orchestrator.owner()).await?;
            if records.is_empty() {
                writeln!(stdout, "No portfolios recorded")?;
            }
            for record in records {
                writeln!(
                    stdout,
                    "#{} {} ({}) at {} thena={} positions={}",
                    record.portfolio_id,
                    record.name,
                    record.symbol,
                    record.portfolio_address,
                    record.initialized_thena,
                    record.position_list.len(),
                )?;
            }
        }
        Commands::InitThena { portfolio_id } => {
            let manager = orchestrator.initialize_thena(portfolio_id).await?;
            writeln!(stdout, "Position manager enabled at {manager}")?;
        }
        Commands::CreatePosition { portfolio_id } => {
            let position = &ctx.defaults.position;
            let wrapper = orchestrator
                .create_position(
                    portfolio_id,
                    PositionSpec {
                        token0: position.token0,
                        token1: position.token1,
                        name: position.name.clone(),
                        symbol: position.symbol.clone(),
                        tick_lower: position.tick_lower,
                        tick_upper: position.tick_upper,
                    },
                )
                .await?;
            writeln!(stdout, "Position wrapper deployed at {wrapper}")?;
        }
        Commands::ApproveTokens { portfolio_id } => {
            let tx_hashes = orchestrator.approve_tokens(portfolio_id).await?;
            writeln!(stdout, "Approved {} tokens to Permit2", tx_hashes.len())?;
        }
        Commands::Deposit {
            portfolio_id,
            amount,
        } => {
            let mode = match amount {
                Some(amount) => DepositMode::Amount(base_units(amount)?),
                None => DepositMode::FullBalance,
            };
            let tx_hash = orchestrator.deposit(portfolio_id, mode).await?;
            writeln!(stdout, "Deposit confirmed in {tx_hash}")?;
        }
        Commands::Rebalance { portfolio_id } => {
            let tx_hash = orchestrator.rebalance(portfolio_id).await?;
            writeln!(stdout, "Rebalance confirmed in {tx_hash}")?;
        }
        Commands::Withdraw {
            portfolio_id,
            percentage,
        } => match orchestrator.withdraw(portfolio_id, percentage).await {
            Ok(outcome) => {
                writeln!(
                    stdout,
                    "Withdrawal complete: burn {} / decrease {}",
                    outcome.withdrawal_tx, outcome.decrease_tx
                )?;
            }
            Err(WorkflowError::PartialWithdrawal { checkpoint, source }) => {
                writeln!(
                    stdout,
                    "Burn {} confirmed but the liquidity decrease failed: {source}\n\
                     Run `folio resume-withdraw --portfolio-id {}` to finish.",
                    checkpoint.withdrawal_tx, checkpoint.portfolio_id
                )?;
                return Err(WorkflowError::PartialWithdrawal { checkpoint, source }.into());
            }
            Err(err) => return Err(err.into()),
        },
        Commands::ResumeWithdraw { portfolio_id } => {
            let tx_hash = orchestrator.resume_withdraw(portfolio_id).await?;
            writeln!(stdout, "Liquidity decrease confirmed in {tx_hash}")?;
        }
    }
    Ok(())
}

fn base_units(amount: Decimal) -> anyhow::Result<U256> {
    Ok(to_base_units(amount, 18).map_err(crate::error::ValidationError::Units)?)
}
