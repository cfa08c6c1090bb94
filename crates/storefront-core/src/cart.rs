//! # Cart Model
//!
//! The in-memory cart. While nobody is logged in this is the only copy of
//! the cart; once a session exists it becomes a cache of the server cart and
//! is rebuilt from `GET api/cart` after every change.
//!
//! ## Line Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add(product, n) ──► line exists? ── yes ──► quantity += n             │
//! │                           │                                             │
//! │                           no ──► push CartLine { product, n }          │
//! │                                                                         │
//! │  increment(id)   ──► quantity += 1                                     │
//! │  decrement(id)   ──► quantity > 1 ? quantity -= 1 : remove line        │
//! │  remove(id)      ──► drop line                                         │
//! │                                                                         │
//! │  Every line always has 1 <= quantity <= MAX_ITEM_QUANTITY.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderItemRequest, PlaceOrderRequest, Product, RemoteCartLine};
use crate::validation::validate_quantity;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart with a snapshot of the product as it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product: Product, quantity: u32) -> Self {
        CartLine { product, quantity }
    }

    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply_quantity(self.quantity)
    }
}

impl From<RemoteCartLine> for CartLine {
    fn from(remote: RemoteCartLine) -> Self {
        CartLine::new(remote.product, remote.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered set of cart lines, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Builds a cart from server lines, dropping any with a zero quantity.
    pub fn from_remote(lines: Vec<RemoteCartLine>) -> Self {
        Cart {
            lines: lines
                .into_iter()
                .filter(|l| l.quantity > 0)
                .map(CartLine::from)
                .collect(),
        }
    }

    /// Adds `quantity` of a product, merging into an existing line.
    pub fn add(&mut self, product: &Product, quantity: u32) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            let new_qty = line.quantity.saturating_add(quantity);
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::new(product.clone(), quantity));
        Ok(())
    }

    /// Raises a line's quantity by one.
    pub fn increment(&mut self, product_id: &str) -> CoreResult<()> {
        let line = self.line_mut(product_id)?;
        if line.quantity >= MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity + 1,
                max: MAX_ITEM_QUANTITY,
            });
        }
        line.quantity += 1;
        Ok(())
    }

    /// Lowers a line's quantity by one, removing the line at quantity 1.
    pub fn decrement(&mut self, product_id: &str) -> CoreResult<()> {
        let line = self.line_mut(product_id)?;
        if line.quantity > 1 {
            line.quantity -= 1;
            return Ok(());
        }
        self.remove(product_id)
    }

    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);

        if self.lines.len() == initial_len {
            Err(CoreError::ProductNotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn get(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == product_id)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ(unit price × quantity) over all lines.
    pub fn total(&self) -> Money {
        total_of(&self.lines)
    }

    /// Order body for the current lines.
    pub fn to_order_request(&self) -> CoreResult<PlaceOrderRequest> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        Ok(PlaceOrderRequest {
            items: self
                .lines
                .iter()
                .map(|l| OrderItemRequest {
                    product_id: l.product.id.clone(),
                    quantity: l.quantity,
                })
                .collect(),
        })
    }

    fn line_mut(&mut self, product_id: &str) -> CoreResult<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.product.id == product_id)
            .ok_or_else(|| CoreError::ProductNotInCart(product_id.to_string()))
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }
}

/// Σ(unit price × quantity) over a slice of lines.
pub fn total_of(lines: &[CartLine]) -> Money {
    lines.iter().map(CartLine::line_total).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
