use std::env;
use std::str::FromStr;

use crate::engine::book::{OrderBookConfig, DEFAULT_BUCKET_SIZE, DEFAULT_ROWS_PER_SIDE};
use crate::engine::buckets::PriceFilter;
use crate::engine::format::LevelUnits;
use crate::engine::tick_range::tick_window_for_prices;
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub uniswap_state_view: String,
    pub multicall_address: Option<String>,
    pub port: u16,

    // Pool key
    pub currency0: String,
    pub currency1: String,
    pub fee_ppm: u32,
    pub tick_spacing: i32,
    pub hooks: Option<String>,
    pub token0_decimals: u8,
    pub token1_decimals: u8,

    // Projection
    pub order_book: OrderBookConfig,
    pub units: LevelUnits,

    // Polling and batching
    pub refresh_interval_ms: u64,
    pub tick_chunk_size: usize,
    pub parallel_chunks: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load configuration files (secrets first, then public config)
        dotenv::from_filename("secrets.env").ok();
        dotenv::from_filename("config/pool.env").ok();
        dotenv::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| lookup(var).ok_or(ConfigError::Missing(var));

        let token0_decimals = parsed(&lookup, "TOKEN0_DECIMALS", 18u8)?;
        let token1_decimals = parsed(&lookup, "TOKEN1_DECIMALS", 18u8)?;
        let (min_price_tick, max_price_tick) = price_window(&lookup, token0_decimals, token1_decimals)?;

        let order_book = OrderBookConfig {
            bucket_size: parsed(&lookup, "BUCKET_SIZE", DEFAULT_BUCKET_SIZE)?,
            rows_per_side: parsed(&lookup, "ROWS_PER_SIDE", DEFAULT_ROWS_PER_SIDE)?,
            min_price_tick,
            max_price_tick,
            price_filter: match lookup("PRICE_FILTER").as_deref() {
                None | Some("none") => PriceFilter::None,
                Some("unit") => PriceFilter::UnitInterval,
                Some(other) => return Err(ConfigError::Invalid { var: "PRICE_FILTER", value: other.to_string() }),
            },
        };
        order_book.validate()?;

        let tick_spacing: i32 = parsed(&lookup, "POOL_TICK_SPACING", 60)?;
        if tick_spacing <= 0 {
            return Err(ConfigError::Invalid { var: "POOL_TICK_SPACING", value: tick_spacing.to_string() });
        }

        Ok(Config {
            rpc_url: required("RPC_URL")?,
            uniswap_state_view: required("UNISWAP_V4_STATE_VIEW")?,
            multicall_address: lookup("MULTICALL_ADDRESS"),
            port: parsed(&lookup, "PORT", 8000)?,

            currency0: required("POOL_CURRENCY0")?,
            currency1: required("POOL_CURRENCY1")?,
            fee_ppm: parsed(&lookup, "POOL_FEE_PPM", 3000)?,
            tick_spacing,
            hooks: lookup("POOL_HOOKS"),
            token0_decimals,
            token1_decimals,

            order_book,
            units: LevelUnits {
                price_suffix: lookup("PRICE_SUFFIX").unwrap_or_default(),
                size_suffix: lookup("SIZE_SUFFIX").unwrap_or_default(),
                ..LevelUnits::default()
            },

            refresh_interval_ms: parsed(&lookup, "REFRESH_INTERVAL_MS", 4000)?,
            tick_chunk_size: parsed(&lookup, "TICK_CHUNK_SIZE", 1024)?,
            parallel_chunks: parsed(&lookup, "PARALLEL_CHUNKS", 4)?,
        })
    }
}

fn parsed<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

/// Tick bounds win over price bounds when both are given.
fn price_window<F>(lookup: &F, dec0: u8, dec1: u8) -> Result<(i32, i32), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let min_tick: Option<i32> = lookup("MIN_PRICE_TICK").map(|_| parsed(lookup, "MIN_PRICE_TICK", 0)).transpose()?;
    let max_tick: Option<i32> = lookup("MAX_PRICE_TICK").map(|_| parsed(lookup, "MAX_PRICE_TICK", 0)).transpose()?;
    if let (Some(min), Some(max)) = (min_tick, max_tick) {
        return Ok((min, max));
    }

    match (lookup("MIN_PRICE"), lookup("MAX_PRICE")) {
        (Some(_), Some(_)) => {
            let min_price: f64 = parsed(lookup, "MIN_PRICE", 0.0)?;
            let max_price: f64 = parsed(lookup, "MAX_PRICE", 0.0)?;
            tick_window_for_prices(min_price, max_price, dec0, dec1).ok_or_else(|| {
                ConfigError::InvalidOrderBook(format!("price window [{}, {}] is not usable", min_price, max_price))
            })
        }
        _ => Err(ConfigError::Missing(if min_tick.is_none() { "MIN_PRICE_TICK" } else { "MAX_PRICE_TICK" })),
    }
}
