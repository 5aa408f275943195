use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ethers::prelude::*;

use crate::chain::providers;
use crate::chain::tick_reader::{PoolKey, ReaderLimits, StateViewTickReader};
use crate::config::Config;
use crate::engine::service::OrderBookService;
use crate::models::PoolDescriptor;

pub type LiveOrderBookService = OrderBookService<StateViewTickReader>;

pub struct AppState {
    pub service: Arc<LiveOrderBookService>,
    pub refresh_interval: Duration,
    pub rows_per_side: usize,
}

fn parse_address(label: &str, raw: &str) -> Result<Address> {
    Address::from_str(raw).with_context(|| format!("{} is not an address: {}", label, raw))
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let provider = providers::create_provider(&config.rpc_url)?;
        let state_view = parse_address("UNISWAP_V4_STATE_VIEW", &config.uniswap_state_view)?;
        let multicall = config
            .multicall_address
            .as_deref()
            .map(|addr| parse_address("MULTICALL_ADDRESS", addr))
            .transpose()?;

        let key = PoolKey {
            currency0: parse_address("POOL_CURRENCY0", &config.currency0)?,
            currency1: parse_address("POOL_CURRENCY1", &config.currency1)?,
            fee_ppm: config.fee_ppm,
            tick_spacing: config.tick_spacing,
            hooks: config
                .hooks
                .as_deref()
                .map(|addr| parse_address("POOL_HOOKS", addr))
                .transpose()?
                .unwrap_or_else(Address::zero),
        };
        let pool = PoolDescriptor::new(config.tick_spacing, config.token0_decimals, config.token1_decimals)
            .context("POOL_TICK_SPACING must be positive")?;

        log::info!("Pool id 0x{}", ethers::utils::hex::encode(key.pool_id()));

        let limits = ReaderLimits { tick_chunk_size: config.tick_chunk_size, parallel_chunks: config.parallel_chunks };
        let reader = StateViewTickReader::new(provider, state_view, &key, multicall, limits);

        Ok(AppState {
            service: Arc::new(OrderBookService::new(reader, pool, config.order_book, config.units.clone())),
            refresh_interval: Duration::from_millis(config.refresh_interval_ms.max(1)),
            rows_per_side: config.order_book.rows_per_side as usize,
        })
    }
}
