//! Query registry
//!
//! Handlers are keyed by `(driver, function)`. Keys are validated when
//! registered, so dispatch only ever fails with "not found" or the
//! handler's own error.

use crate::domain::{ConsensusError, ConsensusResult};
use crate::ports::ConsensusApi;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Driver name of the generic queries every driver answers.
pub const BASE_DRIVER: &str = "base";

pub type QueryHandler = Arc<dyn Fn(&dyn ConsensusApi, &Value) -> ConsensusResult<Value> + Send + Sync>;

#[derive(Default)]
pub struct QueryRegistry {
    handlers: HashMap<(String, String), QueryHandler>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the `base` queries.
    pub fn with_base_queries() -> ConsensusResult<Self> {
        let mut registry = Self::new();
        register_base_queries(&mut registry)?;
        Ok(registry)
    }

    /// Register `handler` under `driver.func`.
    ///
    /// Rejects empty names and duplicate keys.
    pub fn register<F>(&mut self, driver: &str, func: &str, handler: F) -> ConsensusResult<()>
    where
        F: Fn(&dyn ConsensusApi, &Value) -> ConsensusResult<Value> + Send + Sync + 'static,
    {
        if driver.is_empty() || func.is_empty() {
            return Err(ConsensusError::InvalidQuery(format!(
                "empty query key {driver:?}.{func:?}"
            )));
        }
        let key = (driver.to_string(), func.to_string());
        if self.handlers.contains_key(&key) {
            return Err(ConsensusError::InvalidQuery(format!(
                "duplicate query {driver}.{func}"
            )));
        }
        self.handlers.insert(key, Arc::new(handler));
        Ok(())
    }

    pub fn contains(&self, driver: &str, func: &str) -> bool {
        self.handlers
            .contains_key(&(driver.to_string(), func.to_string()))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn dispatch(
        &self,
        api: &dyn ConsensusApi,
        driver: &str,
        func: &str,
        param: &Value,
    ) -> ConsensusResult<Value> {
        let handler = self
            .handlers
            .get(&(driver.to_string(), func.to_string()))
            .ok_or_else(|| ConsensusError::QueryNotFound {
                driver: driver.to_string(),
                func: func.to_string(),
            })?;
        handler(api, param)
    }
}

fn register_base_queries(registry: &mut QueryRegistry) -> ConsensusResult<()> {
    registry.register(BASE_DRIVER, "current_height", |api, _| {
        Ok(json!(api.current_height()?))
    })?;
    registry.register(BASE_DRIVER, "current_block", |api, _| {
        let block = api.current_block()?;
        serde_json::to_value(block.as_ref()).map_err(|e| ConsensusError::InvalidQuery(e.to_string()))
    })?;
    registry.register(BASE_DRIVER, "is_mining", |api, _| Ok(json!(api.is_mining())))?;
    Ok(())
}
