//! Name-keyed catalogue of interchangeable strategies.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::config::StrategyConfig;
use crate::error::{PatternError, Result};
use crate::operation::SharedOperation;
use crate::strategy::StrategySlot;

/// Strategies registered under their [`Operation::name`](crate::Operation::name).
///
/// The registry only stores and looks up; installing a strategy into a slot is
/// an explicit [`StrategyRegistry::select`] call.
pub struct StrategyRegistry<I, O> {
    strategies: BTreeMap<String, SharedOperation<I, O>>,
}

impl<I, O> StrategyRegistry<I, O> {
    pub fn new() -> Self {
        Self {
            strategies: BTreeMap::new(),
        }
    }

    /// Register a strategy under its own name.
    pub fn register(&mut self, strategy: SharedOperation<I, O>) -> Result<()> {
        let name = strategy.name().to_string();
        if self.strategies.contains_key(&name) {
            return Err(PatternError::DuplicateStrategy { name });
        }
        debug!(strategy = %name, "registered strategy");
        self.strategies.insert(name, strategy);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, strategy: SharedOperation<I, O>) -> Result<Self> {
        self.register(strategy)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Result<SharedOperation<I, O>> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| PatternError::UnknownStrategy {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Registered names in ascending order.
    pub fn names(&self) -> Vec<String> {
        self.strategies.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Install the named strategy into `slot`. The slot is left untouched when
    /// the name is unknown or the strategy already contains the slot.
    pub fn select(&self, name: &str, slot: &StrategySlot<I, O>) -> Result<()> {
        let strategy = self.get(name)?;
        debug!(slot = slot.label(), strategy = name, "selecting strategy");
        slot.try_set_strategy(strategy)
    }

    /// Build a slot whose initial strategy comes from configuration. Without a
    /// configured default the slot starts empty.
    pub fn slot_from_config(
        &self,
        label: impl Into<String>,
        config: &StrategyConfig,
    ) -> Result<StrategySlot<I, O>> {
        let slot = StrategySlot::new(label);
        if let Some(name) = config.default.as_deref() {
            self.select(name, &slot)?;
        }
        Ok(slot)
    }
}

impl<I, O> Default for StrategyRegistry<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O> fmt::Debug for StrategyRegistry<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}
