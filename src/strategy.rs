//! Runtime-swappable algorithm holder.
//!
//! A [`StrategySlot`] holds at most one active [`Operation`]. It performs no
//! selection of its own: callers decide which algorithm to install, so new
//! algorithms never require changes here.

use std::fmt;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace, warn};

use crate::error::{PatternError, Result};
use crate::operation::{LayerId, Operation, SharedOperation};

// Serializes cycle check + install across all slots, so two slots cannot
// each accept a strategy containing the other.
static INSTALL: Mutex<()> = Mutex::new(());

/// Holder for the currently selected strategy.
///
/// A slot built with [`StrategySlot::new`] starts empty and fails every
/// `execute` with [`PatternError::NoStrategySelected`] until a strategy is set.
/// Use [`StrategySlot::with_strategy`] to start from a default instead.
///
/// The slot can be shared between threads (`Arc<StrategySlot<_, _>>`).
/// `execute` snapshots the active strategy under a read lock and releases the
/// lock before running it, so a concurrent `set_strategy` never tears a read
/// and never waits on a long-running strategy.
///
/// A slot is also an [`Operation`], so it can be wrapped by layers. A strategy
/// that reaches back to the slot itself is refused, see
/// [`StrategySlot::try_set_strategy`].
pub struct StrategySlot<I, O> {
    id: LayerId,
    label: String,
    active: RwLock<Option<SharedOperation<I, O>>>,
}

impl<I, O> StrategySlot<I, O> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: LayerId::next(),
            label: label.into(),
            active: RwLock::new(None),
        }
    }

    pub fn with_strategy(label: impl Into<String>, strategy: SharedOperation<I, O>) -> Self {
        Self {
            id: LayerId::next(),
            label: label.into(),
            active: RwLock::new(Some(strategy)),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Replace the active strategy.
    ///
    /// Never fails. A strategy that contains this slot would recurse forever,
    /// so it is logged and ignored; use [`try_set_strategy`](Self::try_set_strategy)
    /// to get the error instead.
    pub fn set_strategy(&self, strategy: SharedOperation<I, O>) {
        if let Err(err) = self.try_set_strategy(strategy) {
            warn!(slot = %self.label, error = %err, "refusing strategy");
        }
    }

    /// Replace the active strategy, failing with
    /// [`PatternError::CyclicChain`] when `strategy` reaches back to this
    /// slot. The slot is unchanged on failure.
    pub fn try_set_strategy(&self, strategy: SharedOperation<I, O>) -> Result<()> {
        let _install = INSTALL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if strategy.contains_layer(self.id) {
            return Err(PatternError::cyclic(&self.label));
        }

        let mut active = self.write();
        debug!(
            slot = %self.label,
            from = active.as_ref().map(|s| s.name()).unwrap_or("<none>"),
            to = strategy.name(),
            "switching strategy"
        );
        *active = Some(strategy);
        Ok(())
    }

    /// Return the slot to the unconfigured state.
    pub fn clear(&self) {
        debug!(slot = %self.label, "clearing strategy");
        *self.write() = None;
    }

    pub fn current(&self) -> Option<SharedOperation<I, O>> {
        self.read().clone()
    }

    pub fn current_name(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.name().to_string())
    }

    pub fn is_configured(&self) -> bool {
        self.read().is_some()
    }

    #[tracing::instrument(level = "trace", skip_all, fields(slot = %self.label))]
    pub fn execute(&self, input: I) -> Result<O> {
        let strategy = self
            .current()
            .ok_or_else(|| PatternError::no_strategy(&self.label))?;
        trace!(strategy = strategy.name(), "dispatching");
        strategy.execute(input)
    }

    // The guarded value is a single pointer, so a writer that panicked cannot
    // have left it half-updated.
    fn read(&self) -> RwLockReadGuard<'_, Option<SharedOperation<I, O>>> {
        self.active.read().unwrap_or_else(|poisoned| {
            warn!(slot = %self.label, "strategy lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<SharedOperation<I, O>>> {
        self.active.write().unwrap_or_else(|poisoned| {
            warn!(slot = %self.label, "strategy lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// A slot can itself sit at the bottom of a decorator chain.
impl<I, O> Operation<I, O> for StrategySlot<I, O> {
    fn name(&self) -> &str {
        &self.label
    }

    fn execute(&self, input: I) -> Result<O> {
        StrategySlot::execute(self, input)
    }

    fn contains_layer(&self, id: LayerId) -> bool {
        self.id == id || self.current().is_some_and(|s| s.contains_layer(id))
    }
}

impl<I, O> fmt::Debug for StrategySlot<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategySlot")
            .field("label", &self.label)
            .field("active", &self.current_name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::from_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn counting(
        name: &'static str,
        factor: i64,
        calls: Arc<AtomicUsize>,
    ) -> SharedOperation<i64, i64> {
        from_fn(name, move |x: i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(x * factor)
        })
    }

    #[test]
    fn test_empty_slot_fails() {
        let slot: StrategySlot<i64, i64> = StrategySlot::new("pricing");
        assert_eq!(
            slot.execute(1),
            Err(PatternError::NoStrategySelected {
                slot: "pricing".to_string()
            })
        );
        assert!(!slot.is_configured());
    }

    #[test]
    fn test_default_strategy_is_used() {
        let slot = StrategySlot::with_strategy("math", from_fn("inc", |x: i64| Ok(x + 1)));
        assert_eq!(slot.execute(1), Ok(2));
        assert_eq!(slot.current_name().as_deref(), Some("inc"));
    }

    #[test]
    fn test_swap_dispatches_only_to_new_strategy() {
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));
        let slot = StrategySlot::new("math");

        slot.set_strategy(counting("double", 2, first_calls.clone()));
        assert_eq!(slot.execute(5), Ok(10));

        slot.set_strategy(counting("triple", 3, second_calls.clone()));
        assert_eq!(slot.execute(5), Ok(15));
        assert_eq!(slot.execute(5), Ok(15));

        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clear_returns_to_unconfigured() {
        let slot = StrategySlot::with_strategy("math", from_fn("id", |x: i64| Ok(x)));
        slot.clear();
        assert!(matches!(
            slot.execute(1),
            Err(PatternError::NoStrategySelected { .. })
        ));
    }

    #[test]
    fn test_strategy_failure_passes_through() {
        let slot = StrategySlot::with_strategy(
            "math",
            from_fn("always_fails", |_: i64| -> Result<i64> {
                Err(PatternError::failed("always_fails", "boom"))
            }),
        );
        assert_eq!(
            slot.execute(1),
            Err(PatternError::failed("always_fails", "boom"))
        );
    }

    #[test]
    fn test_concurrent_readers_see_whole_strategies() {
        let slot = Arc::new(StrategySlot::with_strategy(
            "math",
            from_fn("double", |x: i64| Ok(x * 2)),
        ));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let out = slot.execute(7).unwrap();
                        assert!(out == 14 || out == 21, "torn read: {}", out);
                    }
                })
            })
            .collect();

        slot.set_strategy(from_fn("triple", |x: i64| Ok(x * 3)));

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(slot.execute(7), Ok(21));
    }

    // ========================================================================
    // Cycles through slots
    // ========================================================================

    #[test]
    fn test_strategy_reaching_back_to_slot_is_refused() {
        use crate::decorator::{wrap, Layer};

        let slot: Arc<StrategySlot<i64, i64>> = Arc::new(StrategySlot::new("loop"));
        let layer = Layer::new("double").after(|x: i64| Ok(x * 2)).shared();
        let around_slot = wrap::<i64, i64>(slot.clone(), layer).unwrap();

        assert_eq!(
            slot.try_set_strategy(Arc::clone(&around_slot)),
            Err(PatternError::cyclic("loop"))
        );
        slot.set_strategy(around_slot.clone());
        assert!(!slot.is_configured());
        assert_eq!(around_slot.execute(1), Err(PatternError::no_strategy("loop")));

        slot.set_strategy(from_fn("inc", |x: i64| Ok(x + 1)));
        slot.set_strategy(around_slot.clone());
        assert_eq!(slot.current_name().as_deref(), Some("inc"));
        assert_eq!(around_slot.execute(1), Ok(4));
    }

    #[test]
    fn test_slot_cannot_hold_itself() {
        let slot: Arc<StrategySlot<i64, i64>> =
            Arc::new(StrategySlot::with_strategy("self", from_fn("id", |x: i64| Ok(x))));
        assert!(matches!(
            slot.try_set_strategy(slot.clone()),
            Err(PatternError::CyclicChain { ref layer }) if layer == "self"
        ));
        assert_eq!(slot.execute(3), Ok(3));
    }

    #[test]
    fn test_mutual_slots_are_refused() {
        let first: Arc<StrategySlot<i64, i64>> = Arc::new(StrategySlot::new("first"));
        let second: Arc<StrategySlot<i64, i64>> = Arc::new(StrategySlot::new("second"));

        first.try_set_strategy(second.clone()).unwrap();
        assert_eq!(
            second.try_set_strategy(first.clone()),
            Err(PatternError::cyclic("second"))
        );
        assert_eq!(first.execute(1), Err(PatternError::no_strategy("second")));
    }

    #[test]
    fn test_layer_hidden_behind_slot_is_seen_by_wrap() {
        use crate::decorator::{wrap, Layer};

        let layer = Layer::new("audit").shared();
        let inner = wrap(from_fn("base", |x: i64| Ok(x)), Arc::clone(&layer)).unwrap();
        let slot: Arc<StrategySlot<i64, i64>> = Arc::new(StrategySlot::with_strategy("hub", inner));

        assert!(matches!(
            wrap::<i64, i64>(slot, layer),
            Err(PatternError::CyclicChain { ref layer }) if layer == "audit"
        ));
    }

    // ========================================================================
    // Poisoned lock
    // ========================================================================

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let slot = Arc::new(StrategySlot::with_strategy(
            "math",
            from_fn("double", |x: i64| Ok(x * 2)),
        ));

        let holder = Arc::clone(&slot);
        let crashed = thread::spawn(move || {
            let _guard = holder.active.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(crashed.is_err());
        assert!(slot.active.is_poisoned());
        assert_eq!(slot.execute(4), Ok(8));
        assert_eq!(slot.current_name().as_deref(), Some("double"));

        slot.set_strategy(from_fn("triple", |x: i64| Ok(x * 3)));
        assert_eq!(slot.execute(4), Ok(12));
    }

    #[test]
    fn test_debug_shows_active_name() {
        let slot = StrategySlot::with_strategy("math", from_fn("inc", |x: i64| Ok(x + 1)));
        assert_eq!(
            format!("{:?}", slot),
            "StrategySlot { label: \"math\", active: Some(\"inc\") }"
        );
    }
}
