//! The single capability shared by strategies and decorator layers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;

/// A named unit of work.
///
/// Implementations are immutable once constructed; `execute` may be called any
/// number of times, from any thread.
pub trait Operation<I, O>: Send + Sync {
    /// Key the operation is registered and logged under.
    fn name(&self) -> &str;

    fn execute(&self, input: I) -> Result<O>;

    /// Whether the node `id` (a layer or a slot) appears anywhere in this
    /// operation's chain, including behind slots.
    ///
    /// Base operations never delegate, so the default is `false`.
    fn contains_layer(&self, _id: LayerId) -> bool {
        false
    }
}

/// Operations are shared between slots, registries and chains.
pub type SharedOperation<I, O> = Arc<dyn Operation<I, O>>;

/// Identity of a delegating node (decorator layer or strategy slot), unique
/// for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

impl LayerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        LayerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// Closure-backed operations
// ============================================================================

/// Operation whose body is a closure.
pub struct FnOperation<F> {
    name: String,
    body: F,
}

impl<F> FnOperation<F> {
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<I, O, F> Operation<I, O> for FnOperation<F>
where
    F: Fn(I) -> Result<O> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, input: I) -> Result<O> {
        (self.body)(input)
    }
}

impl<F> fmt::Debug for FnOperation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Shorthand for a shared closure-backed operation.
pub fn from_fn<I, O, F>(name: impl Into<String>, body: F) -> SharedOperation<I, O>
where
    F: Fn(I) -> Result<O> + Send + Sync + 'static,
{
    Arc::new(FnOperation::new(name, body))
}
