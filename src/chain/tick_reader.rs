use ethers::abi::{self, Token};
use ethers::contract::{abigen, Multicall};
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use ethers::utils::keccak256;
use futures::{stream, StreamExt};
use std::future::Future;
use std::sync::Arc;

use crate::error::{FetchError, TickFetchError};
use crate::models::{LivePoolState, RawTickLiquidity, TickRead};

abigen!(
    StateView,
    r#"[
      {
        "type": "function",
        "name": "getSlot0",
        "stateMutability": "view",
        "inputs": [{"name": "poolId", "type": "bytes32"}],
        "outputs": [
          {"name": "sqrtPriceX96", "type": "uint160"},
          {"name": "tick", "type": "int24"},
          {"name": "protocolFee", "type": "uint24"},
          {"name": "lpFee", "type": "uint24"}
        ]
      },
      {
        "type": "function",
        "name": "getLiquidity",
        "stateMutability": "view",
        "inputs": [{"name": "poolId", "type": "bytes32"}],
        "outputs": [{"name": "liquidity", "type": "uint128"}]
      },
      {
        "type": "function",
        "name": "getTickInfo",
        "stateMutability": "view",
        "inputs": [
          {"name": "poolId", "type": "bytes32"},
          {"name": "tick", "type": "int24"}
        ],
        "outputs": [
          {"name": "liquidityGross", "type": "uint128"},
          {"name": "liquidityNet", "type": "int128"},
          {"name": "feeGrowthOutside0X128", "type": "uint256"},
          {"name": "feeGrowthOutside1X128", "type": "uint256"}
        ]
      }
    ]"#
);

/// Source of live pool state and raw per-tick liquidity.
///
/// `read_ticks` returns one entry per requested tick; individual failures are `Err` entries.
/// An outer `Err` means the whole pass failed and nothing should be shown.
pub trait TickReader: Send + Sync {
    fn read_pool_state(&self) -> impl Future<Output = Result<LivePoolState, FetchError>> + Send;

    fn read_ticks(&self, ticks: &[i32]) -> impl Future<Output = Result<Vec<TickRead>, FetchError>> + Send;
}

/// Uniswap v4 PoolKey, as hashed into the pool id.
#[derive(Clone, Debug)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    pub fee_ppm: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

impl PoolKey {
    /// keccak256(abi.encode(PoolKey))
    pub fn pool_id(&self) -> [u8; 32] {
        let tokens = vec![Token::Tuple(vec![
            Token::Address(self.currency0),
            Token::Address(self.currency1),
            Token::Uint(U256::from(self.fee_ppm)),            // uint24 in practice
            Token::Int(U256::from(self.tick_spacing as i64)), // int24, always positive
            Token::Address(self.hooks),
        ])];
        keccak256(abi::encode(&tokens))
    }
}

/// (liquidityGross, liquidityNet, feeGrowthOutside0X128, feeGrowthOutside1X128)
type TickInfo = (u128, i128, U256, U256);

#[derive(Clone, Copy, Debug)]
pub struct ReaderLimits {
    pub tick_chunk_size: usize,
    pub parallel_chunks: usize,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        Self { tick_chunk_size: 1024, parallel_chunks: 4 }
    }
}

/// Reads a v4 pool through the StateView lens with batched Multicall.
pub struct StateViewTickReader {
    client: Arc<Provider<Http>>,
    view: StateView<Provider<Http>>,
    pool_id: [u8; 32],
    multicall_addr: Option<Address>,
    limits: ReaderLimits,
}

impl StateViewTickReader {
    pub fn new(
        client: Arc<Provider<Http>>,
        state_view_addr: Address,
        key: &PoolKey,
        multicall_addr: Option<Address>,
        limits: ReaderLimits,
    ) -> Self {
        let view = StateView::new(state_view_addr, client.clone());
        Self { client, view, pool_id: key.pool_id(), multicall_addr, limits }
    }

    /// ONE multicall for slot0 + liquidity
    async fn fetch_core_state(&self) -> Result<LivePoolState, FetchError> {
        let mut mc = Multicall::new(self.client.clone(), self.multicall_addr)
            .await
            .map_err(|e| FetchError::PoolState(e.to_string()))?;
        mc.add_call(self.view.get_slot_0(self.pool_id), false);
        mc.add_call(self.view.get_liquidity(self.pool_id), false);
        let ((_sqrt_price_x96, tick, _protocol_fee, _lp_fee), liquidity): ((U256, i32, u32, u32), u128) =
            mc.call().await.map_err(|e| FetchError::PoolState(e.to_string()))?;

        log::debug!("V4 state: tick {}, liquidity {}", tick, liquidity);
        Ok(LivePoolState { current_tick: tick, liquidity: Some(liquidity) })
    }

    /// Tick infos in chunks, at most `parallel_chunks` in flight. A failed chunk marks its
    /// ticks unavailable; only a pass where every chunk fails is an error.
    async fn fetch_tick_infos(&self, ticks: Vec<i32>) -> Result<Vec<TickRead>, FetchError> {
        if ticks.is_empty() {
            return Ok(Vec::new());
        }
        let chunk_size = self.limits.tick_chunk_size.max(1);
        let chunks: Vec<Vec<i32>> = ticks.chunks(chunk_size).map(|s| s.to_vec()).collect();

        let results: Vec<ChunkResult> = stream::iter(
            chunks.into_iter().map(|chunk| {
                let client = self.client.clone();
                let view = self.view.clone();
                let pool_id = self.pool_id;
                let multicall_addr = self.multicall_addr;
                async move {
                    let infos = async {
                        let mut mc = Multicall::new(client, multicall_addr).await.map_err(|e| e.to_string())?;
                        for t in &chunk {
                            mc.add_call(view.get_tick_info(pool_id, *t), false);
                        }
                        mc.call_array::<TickInfo>().await.map_err(|e| e.to_string())
                    }
                    .await;
                    (chunk, infos)
                }
            }),
        )
        .buffer_unordered(self.limits.parallel_chunks.max(1))
        .collect()
        .await;

        merge_chunk_results(results)
    }
}

/// A chunk's ticks with what its multicall returned.
type ChunkResult = (Vec<i32>, Result<Vec<TickInfo>, String>);

/// Flatten chunk outcomes into per-tick reads. A failed chunk marks its ticks unavailable;
/// the pass fails only when every chunk failed.
fn merge_chunk_results(results: Vec<ChunkResult>) -> Result<Vec<TickRead>, FetchError> {
    let chunk_count = results.len();
    let mut failed_chunks = 0usize;
    let mut last_error = String::new();
    let mut reads = Vec::new();
    for (chunk, infos) in results {
        match infos {
            Ok(infos) => reads.extend(decode_chunk(&chunk, infos)),
            Err(e) => {
                log::warn!("Tick chunk [{:?}..{:?}] failed: {}", chunk.first(), chunk.last(), e);
                failed_chunks += 1;
                last_error = e;
                reads.extend(chunk.iter().map(|&t| Err(TickFetchError::Unavailable(t))));
            }
        }
    }

    if chunk_count > 0 && failed_chunks == chunk_count {
        return Err(FetchError::TickBatch(last_error));
    }
    Ok(reads)
}

/// Pair a chunk's ticks with their infos; a short response marks the tail malformed.
fn decode_chunk(chunk: &[i32], infos: Vec<TickInfo>) -> Vec<TickRead> {
    let returned = infos.len();
    let mut infos = infos.into_iter();
    chunk
        .iter()
        .map(|&tick| match infos.next() {
            Some((liquidity_gross, liquidity_net, _f0, _f1)) => {
                Ok(RawTickLiquidity { tick_index: tick, liquidity_gross, liquidity_net })
            }
            None => Err(TickFetchError::Malformed {
                tick,
                reason: format!("chunk returned {} of {} ticks", returned, chunk.len()),
            }),
        })
        .collect()
}

impl TickReader for StateViewTickReader {
    fn read_pool_state(&self) -> impl Future<Output = Result<LivePoolState, FetchError>> + Send {
        self.fetch_core_state()
    }

    fn read_ticks(&self, ticks: &[i32]) -> impl Future<Output = Result<Vec<TickRead>, FetchError>> + Send {
        self.fetch_tick_infos(ticks.to_vec())
    }
}
