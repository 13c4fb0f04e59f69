//! Order pricing: plain strategies plus a discount layer on top.

use std::sync::Arc;

use crate::config::{check_factor, PricingConfig};
use crate::decorator::{wrap, Layer};
use crate::error::{PatternError, Result};
use crate::operation::{Operation, SharedOperation};
use crate::registry::StrategyRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub price: f64,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// The stock basket: a phone, a tablet and a PC.
pub fn default_products() -> Vec<Product> {
    vec![
        Product::new("Phone", 587.0),
        Product::new("Tablet", 800.0),
        Product::new("PC", 1200.0),
    ]
}

pub type PriceOperation = SharedOperation<Vec<Product>, f64>;

fn subtotal(operation: &str, products: &[Product]) -> Result<f64> {
    products.iter().try_fold(0.0, |sum, product| {
        if product.price.is_finite() && product.price >= 0.0 {
            Ok(sum + product.price)
        } else {
            Err(PatternError::failed(
                operation,
                format!("invalid price {} for '{}'", product.price, product.name),
            ))
        }
    })
}

/// Full price.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegularOrder;

impl Operation<Vec<Product>, f64> for RegularOrder {
    fn name(&self) -> &str {
        "regular"
    }

    fn execute(&self, products: Vec<Product>) -> Result<f64> {
        subtotal("regular", &products)
    }
}

/// Full price times the preorder discount.
#[derive(Debug, Clone, Copy)]
pub struct Preorder {
    discount: f64,
}

impl Preorder {
    /// Fails with [`PatternError::Config`] unless `discount` is in `(0, 1]`.
    pub fn new(discount: f64) -> Result<Self> {
        check_factor("preorder_discount", discount)?;
        Ok(Self { discount })
    }
}

impl Default for Preorder {
    fn default() -> Self {
        Self {
            discount: PricingConfig::default().preorder_discount,
        }
    }
}

impl Operation<Vec<Product>, f64> for Preorder {
    fn name(&self) -> &str {
        "preorder"
    }

    fn execute(&self, products: Vec<Product>) -> Result<f64> {
        Ok(subtotal("preorder", &products)? * self.discount)
    }
}

/// Layer applying an extra discount to whatever total it wraps.
///
/// Fails with [`PatternError::Config`] unless `factor` is in `(0, 1]`, so a
/// NaN or surcharge factor never reaches a chain.
pub fn premium_discount(factor: f64) -> Result<Arc<Layer<Vec<Product>, f64>>> {
    check_factor("premium_discount", factor)?;
    Ok(Layer::new("premium")
        .after(move |total: f64| Ok(total * factor))
        .shared())
}

/// `regular` and `preorder` pricing, discounts taken from `config`.
pub fn order_registry(config: &PricingConfig) -> Result<StrategyRegistry<Vec<Product>, f64>> {
    config.validate()?;
    StrategyRegistry::<Vec<Product>, f64>::new()
        .with(Arc::new(RegularOrder))?
        .with(Arc::new(Preorder::new(config.preorder_discount)?))
}

/// A preorder with the premium discount layered on top.
pub fn premium_preorder(config: &PricingConfig) -> Result<PriceOperation> {
    config.validate()?;
    let preorder: PriceOperation = Arc::new(Preorder::new(config.preorder_discount)?);
    wrap(preorder, premium_discount(config.premium_discount)?)
}
