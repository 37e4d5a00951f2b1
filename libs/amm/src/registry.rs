//! Pool registry
//!
//! Pools are addressed by asset, collateral and maturity. Callers receive a
//! registry by injection, never through a global.

use crate::pool::Pool;
use std::collections::HashMap;
use tenor_types::{FeeParams, PoolError, PoolKey};
use tracing::info;

/// Lookup and creation of pools
pub trait PoolRegistry {
    fn lookup(&self, asset: &str, collateral: &str, maturity: u64) -> Option<&Pool>;

    fn lookup_mut(&mut self, asset: &str, collateral: &str, maturity: u64) -> Option<&mut Pool>;

    /// Register an empty pool; `PoolExists` if the key is taken
    fn create(&mut self, key: PoolKey, fees: FeeParams) -> Result<&mut Pool, PoolError>;

    /// Like `lookup_mut` but with a typed miss
    fn get_mut(
        &mut self,
        asset: &str,
        collateral: &str,
        maturity: u64,
    ) -> Result<&mut Pool, PoolError> {
        self.lookup_mut(asset, collateral, maturity)
            .ok_or_else(|| PoolError::PoolNotFound {
                asset: asset.to_string(),
                collateral: collateral.to_string(),
                maturity,
            })
    }
}

/// `HashMap`-backed registry
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    pools: HashMap<PoolKey, Pool>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }
}

impl PoolRegistry for InMemoryRegistry {
    fn lookup(&self, asset: &str, collateral: &str, maturity: u64) -> Option<&Pool> {
        self.pools.get(&PoolKey::new(asset, collateral, maturity))
    }

    fn lookup_mut(&mut self, asset: &str, collateral: &str, maturity: u64) -> Option<&mut Pool> {
        self.pools.get_mut(&PoolKey::new(asset, collateral, maturity))
    }

    fn create(&mut self, key: PoolKey, fees: FeeParams) -> Result<&mut Pool, PoolError> {
        use std::collections::hash_map::Entry;

        match self.pools.entry(key) {
            Entry::Occupied(entry) => {
                let key = entry.key();
                Err(PoolError::PoolExists {
                    asset: key.asset.clone(),
                    collateral: key.collateral.clone(),
                    maturity: key.maturity,
                })
            }
            Entry::Vacant(entry) => {
                info!(pool = %entry.key(), fee = fees.fee, protocol_fee = fees.protocol_fee, "pool created");
                let pool = Pool::new(entry.key().clone(), fees);
                Ok(entry.insert(pool))
            }
        }
    }
}
