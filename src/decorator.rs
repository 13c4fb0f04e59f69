//! Ordered wrapping of a base operation.
//!
//! A [`Layer`] describes an enhancer: an optional `before` hook, an optional
//! `after` hook and an optional `recover` hook. [`wrap`] binds a layer to an
//! inner operation and yields a new operation; [`DecoratorChain`] is a small
//! builder over repeated `wrap` calls.
//!
//! Execution of a wrapped operation:
//!
//! 1. `before(&input)`; a failure here aborts before anything inner runs.
//! 2. `inner.execute(input)`.
//! 3. On success, `after(output)` (or the output unchanged).
//! 4. On failure, `recover(error)` if the layer has one, otherwise the error
//!    propagates as is. A recovered value is returned without running `after`.
//!
//! The last layer applied is the outermost: its `before` runs first and its
//! `after` runs last.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{PatternError, Result};
use crate::operation::{LayerId, Operation, SharedOperation};

type BeforeHook<I> = Box<dyn Fn(&I) -> Result<()> + Send + Sync>;
type AfterHook<O> = Box<dyn Fn(O) -> Result<O> + Send + Sync>;
type RecoverHook<O> = Box<dyn Fn(PatternError) -> Result<O> + Send + Sync>;

// ============================================================================
// Layer
// ============================================================================

/// A reusable enhancer. Each `Layer` value has its own identity, and one
/// identity may appear at most once in any chain.
pub struct Layer<I, O> {
    id: LayerId,
    name: String,
    before: Option<BeforeHook<I>>,
    after: Option<AfterHook<O>>,
    recover: Option<RecoverHook<O>>,
}

impl<I, O> Layer<I, O> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LayerId::next(),
            name: name.into(),
            before: None,
            after: None,
            recover: None,
        }
    }

    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&I) -> Result<()> + Send + Sync + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(O) -> Result<O> + Send + Sync + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }

    /// Substitute a value when the wrapped operation fails. Without this hook
    /// the layer never intercepts errors.
    pub fn recover<F>(mut self, hook: F) -> Self
    where
        F: Fn(PatternError) -> Result<O> + Send + Sync + 'static,
    {
        self.recover = Some(Box::new(hook));
        self
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl<I, O> fmt::Debug for Layer<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("recover", &self.recover.is_some())
            .finish()
    }
}

// ============================================================================
// Decorated operation
// ============================================================================

/// A layer bound to the operation it wraps.
pub struct Decorated<I, O> {
    layer: Arc<Layer<I, O>>,
    inner: SharedOperation<I, O>,
}

impl<I, O> Decorated<I, O> {
    pub fn layer(&self) -> &Layer<I, O> {
        &self.layer
    }

    pub fn inner(&self) -> &SharedOperation<I, O> {
        &self.inner
    }
}

impl<I, O> Operation<I, O> for Decorated<I, O> {
    fn name(&self) -> &str {
        &self.layer.name
    }

    #[tracing::instrument(level = "trace", skip_all, fields(layer = %self.layer.name))]
    fn execute(&self, input: I) -> Result<O> {
        if let Some(before) = &self.layer.before {
            before(&input)?;
        }

        match self.inner.execute(input) {
            Ok(output) => match &self.layer.after {
                Some(after) => after(output),
                None => Ok(output),
            },
            Err(err) => match &self.layer.recover {
                Some(recover) => {
                    trace!(error = %err, "recovering from inner failure");
                    recover(err)
                }
                None => Err(err),
            },
        }
    }

    fn contains_layer(&self, id: LayerId) -> bool {
        self.layer.id == id || self.inner.contains_layer(id)
    }
}

/// Wrap `inner` with `layer`.
///
/// Fails with [`PatternError::CyclicChain`] when `layer` already occurs in
/// `inner`'s chain. Nothing is executed either way.
pub fn wrap<I, O>(
    inner: SharedOperation<I, O>,
    layer: Arc<Layer<I, O>>,
) -> Result<SharedOperation<I, O>>
where
    I: 'static,
    O: 'static,
{
    if inner.contains_layer(layer.id) {
        return Err(PatternError::cyclic(&layer.name));
    }
    debug!(layer = %layer.name, inner = inner.name(), "wrapping operation");
    Ok(Arc::new(Decorated { layer, inner }))
}

// ============================================================================
// Chain builder
// ============================================================================

/// Builder that applies layers one at a time, innermost first.
pub struct DecoratorChain<I, O> {
    base: String,
    head: SharedOperation<I, O>,
    // innermost first
    layers: Vec<String>,
}

impl<I: 'static, O: 'static> DecoratorChain<I, O> {
    pub fn new(base: SharedOperation<I, O>) -> Self {
        Self {
            base: base.name().to_string(),
            head: base,
            layers: Vec::new(),
        }
    }

    /// Apply `layer` around everything applied so far.
    pub fn layer(mut self, layer: Arc<Layer<I, O>>) -> Result<Self> {
        let name = layer.name.clone();
        self.head = wrap(self.head, layer)?;
        self.layers.push(name);
        Ok(self)
    }

    pub fn base_name(&self) -> &str {
        &self.base
    }

    /// Layer names from the outermost inwards, in the order their `before`
    /// hooks run.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().rev().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn execute(&self, input: I) -> Result<O> {
        self.head.execute(input)
    }

    pub fn build(self) -> SharedOperation<I, O> {
        self.head
    }
}

impl<I, O> fmt::Debug for DecoratorChain<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorChain")
            .field("base", &self.base)
            .field("layers", &self.layers)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
