use anyhow::{Context, Result};
use ethers::prelude::*;
use std::sync::Arc;

pub fn create_provider(rpc_url: &str) -> Result<Arc<Provider<Http>>> {
    let provider = Provider::<Http>::try_from(rpc_url)
        .with_context(|| format!("Invalid RPC URL: {}", rpc_url))?;
    Ok(Arc::new(provider))
}
