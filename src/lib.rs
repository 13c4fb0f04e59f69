//! # Design Patterns: Strategy and Decorator
//!
//! Runtime algorithm selection and ordered behavior composition, built around
//! one capability: [`Operation`].
//!
//! ## Strategy
//! - [`StrategySlot`] holds the active algorithm and can be swapped at runtime,
//!   including from other threads.
//! - [`StrategyRegistry`] looks strategies up by name and installs them into
//!   slots, optionally driven by [`CatalogConfig`].
//!
//! ## Decorator
//! - [`Layer`] carries `before` / `after` / `recover` hooks.
//! - [`wrap`] and [`DecoratorChain`] bind layers around a base operation. The
//!   last layer applied runs first on the way in and last on the way out.
//!
//! ## Catalogue
//! - [`sorting`]: quick, shell and merge sort behind a [`sorting::SortedList`].
//! - [`pricing`]: regular and preorder totals with a premium discount layer.
//! - [`library`]: books and videos made lendable by [`library::Borrowable`].
//!
//! ```
//! use design_patterns::{from_fn, DecoratorChain, Layer};
//!
//! let chain = DecoratorChain::new(from_fn("base", |_: ()| Ok(10)))
//!     .layer(Layer::new("double").after(|x: i32| Ok(x * 2)).shared())?
//!     .layer(Layer::new("plus_three").after(|x: i32| Ok(x + 3)).shared())?;
//!
//! assert_eq!(chain.execute(())?, 23);
//! # Ok::<(), design_patterns::PatternError>(())
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod config;
pub mod decorator;
pub mod error;
pub mod library;
pub mod operation;
pub mod pricing;
pub mod registry;
pub mod sorting;
pub mod strategy;

pub use config::{CatalogConfig, PricingConfig, StrategyConfig};
pub use decorator::{wrap, Decorated, DecoratorChain, Layer};
pub use error::{PatternError, Result};
pub use operation::{from_fn, FnOperation, LayerId, Operation, SharedOperation};
pub use registry::StrategyRegistry;
pub use strategy::StrategySlot;
