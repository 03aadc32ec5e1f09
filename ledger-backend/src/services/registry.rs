//! Named sandbox strategies behind one async lock.
//!
//! Calls are serialized across the whole registry, matching the ledger's
//! single-threaded execution model.

use std::collections::BTreeMap;

use strategy_ledger::{
    sandbox::{AdapterKind, Sandbox, SandboxEnv},
    SharePolicy, StrategyConfig,
};
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    error::{BackendError, Result},
    types::{parse_address, CreateStrategyRequest},
};

pub struct StrategyRegistry {
    strategies: Mutex<BTreeMap<String, Sandbox>>,
    max_strategies: usize,
}

impl StrategyRegistry {
    pub fn new(max_strategies: usize) -> Self {
        Self {
            strategies: Mutex::new(BTreeMap::new()),
            max_strategies,
        }
    }

    pub async fn create(&self, req: &CreateStrategyRequest) -> Result<(String, AdapterKind)> {
        let id = req.id.trim();
        if id.is_empty() {
            return Err(BackendError::BadRequest("Strategy id is empty".to_string()));
        }

        let strategy = parse_address("strategy", &req.strategy)?;
        let underlying = parse_address("underlying", &req.underlying)?;
        let vault = parse_address("vault", &req.vault)?;

        let config = StrategyConfig {
            name: id.to_string(),
            strategy,
            underlying,
            vault,
            share_policy: if req.plain_shares {
                SharePolicy::plain()
            } else {
                SharePolicy::default()
            },
        };

        let mut strategies = self.strategies.lock().await;
        if strategies.contains_key(id) {
            return Err(BackendError::AlreadyExists(id.to_string()));
        }
        if strategies.len() >= self.max_strategies {
            return Err(BackendError::CapacityReached(self.max_strategies));
        }

        let sandbox = Sandbox::new(config, SandboxEnv::new(req.kind, strategy, underlying))?;
        strategies.insert(id.to_string(), sandbox);

        info!(id, kind = ?req.kind, "Strategy created");

        Ok((id.to_string(), req.kind))
    }

    /// Run `f` against the strategy registered under `id`.
    pub async fn with_strategy<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Sandbox) -> Result<T>,
    ) -> Result<T> {
        let mut strategies = self.strategies.lock().await;
        let sandbox = strategies
            .get_mut(id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        f(sandbox)
    }

    pub async fn len(&self) -> usize {
        self.strategies.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str) -> CreateStrategyRequest {
        CreateStrategyRequest {
            id: id.to_string(),
            kind: AdapterKind::Aave,
            strategy: "0x5151515151515151515151515151515151515151".to_string(),
            underlying: "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a".to_string(),
            vault: "0x7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a".to_string(),
            plain_shares: true,
        }
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let registry = StrategyRegistry::new(4);
        registry.create(&request("aave")).await.unwrap();

        assert!(matches!(
            registry.create(&request("aave")).await,
            Err(BackendError::AlreadyExists(_))
        ));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_enforced() {
        let registry = StrategyRegistry::new(1);
        registry.create(&request("a")).await.unwrap();

        assert!(matches!(
            registry.create(&request("b")).await,
            Err(BackendError::CapacityReached(1))
        ));
    }

    #[tokio::test]
    async fn test_unknown_strategy_not_found() {
        let registry = StrategyRegistry::new(1);
        let result = registry
            .with_strategy("missing", |sandbox| Ok(sandbox.strategy_balance()))
            .await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }
}
