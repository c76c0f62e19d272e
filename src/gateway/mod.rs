//! Typed façades over the protocol contracts. Each façade owns a contract
//! address, encodes calls with the [`crate::bindings`] types, and routes
//! them through a [`ChainClient`](crate::chain::ChainClient).

mod asset_config;
mod factory;
mod portfolio;
mod position_manager;
mod rebalancing;
mod tokens;

pub use asset_config::AssetManagementConfig;
pub use factory::Factory;
pub use portfolio::Portfolio;
pub use position_manager::{MAX_WRAPPER_PROBE, PositionManager, WrapperSlot};
pub use rebalancing::Rebalancing;
pub use tokens::{Erc20, Permit2, PositionWrapper};
