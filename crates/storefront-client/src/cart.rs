//! # Cart Synchronizer
//!
//! One cart, two backends, chosen per call by the session state.
//!
//! ## Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  token = None   ──► local Cart (storefront-core) ──► publish lines     │
//! │                                                                         │
//! │  token = Some   ──► remote mutation ──► GET api/cart ──► publish lines │
//! │                       │ fails                                           │
//! │                       └──► warn!, lines untouched, Err to caller       │
//! │                                                                         │
//! │  Every publish of lines also publishes Σ(unit price × quantity).        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations run one at a time behind an async mutex, so a double tap on
//! "+" applies two increments in order.

use std::sync::{Arc, Weak};

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::StorefrontApi;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionGate;
use storefront_core::cart::total_of;
use storefront_core::validation::validate_quantity;
use storefront_core::{
    AddToCartRequest, AuthToken, Cart, CartLine, CoreError, LanguageTag, Money, OrderResponse,
    Product, MAX_ITEM_QUANTITY,
};

pub struct CartSynchronizer {
    api: Arc<dyn StorefrontApi>,
    session: Arc<SessionGate>,
    mutation: Mutex<()>,
    lines_tx: watch::Sender<Vec<CartLine>>,
    total_tx: watch::Sender<Money>,
}

impl CartSynchronizer {
    pub fn new(api: Arc<dyn StorefrontApi>, session: Arc<SessionGate>) -> Self {
        let (lines_tx, _) = watch::channel(Vec::new());
        let (total_tx, _) = watch::channel(Money::zero());
        CartSynchronizer {
            api,
            session,
            mutation: Mutex::new(()),
            lines_tx,
            total_tx,
        }
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn lines(&self) -> Vec<CartLine> {
        self.lines_tx.borrow().clone()
    }

    pub fn total(&self) -> Money {
        *self.total_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLine>> {
        self.lines_tx.subscribe()
    }

    pub fn subscribe_total(&self) -> watch::Receiver<Money> {
        self.total_tx.subscribe()
    }

    fn local_cart(&self) -> Cart {
        Cart::from(self.lines())
    }

    fn publish(&self, lines: Vec<CartLine>) {
        let total = total_of(&lines);
        self.lines_tx.send_replace(lines);
        self.total_tx.send_replace(total);
    }

    fn quantity_of(&self, product_id: &str) -> ClientResult<u32> {
        self.lines_tx
            .borrow()
            .iter()
            .find(|l| l.product_id() == product_id)
            .map(|l| l.quantity)
            .ok_or_else(|| CoreError::ProductNotInCart(product_id.to_string()).into())
    }

    /// Replaces local state with the server's cart.
    async fn refetch(&self, token: &AuthToken) -> ClientResult<()> {
        let remote = self.api.cart(token).await.map_err(|e| {
            warn!(error = %e, "Cart fetch failed");
            e
        })?;
        let cart = Cart::from_remote(remote);
        debug!(lines = cart.len(), "Cart synchronized");
        self.publish(cart.into_lines());
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` of `product`, merging with an existing line.
    pub async fn add_item(&self, product: &Product, quantity: u32) -> ClientResult<()> {
        let _guard = self.mutation.lock().await;

        match self.session.token() {
            Some(token) => {
                validate_quantity(quantity)?;
                let request = AddToCartRequest {
                    product_id: product.id.clone(),
                    quantity,
                };
                self.api
                    .add_to_cart(&token, &request)
                    .await
                    .map_err(|e| mutation_failed("add", &product.id, e))?;
                self.refetch(&token).await
            }
            None => {
                let mut cart = self.local_cart();
                cart.add(product, quantity)?;
                self.publish(cart.into_lines());
                Ok(())
            }
        }
    }

    pub async fn increment(&self, product_id: &str) -> ClientResult<()> {
        let _guard = self.mutation.lock().await;

        match self.session.token() {
            Some(token) => {
                let quantity = self.quantity_of(product_id)?;
                if quantity >= MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: quantity + 1,
                        max: MAX_ITEM_QUANTITY,
                    }
                    .into());
                }
                self.api
                    .update_cart_item(&token, product_id, quantity + 1)
                    .await
                    .map_err(|e| mutation_failed("increment", product_id, e))?;
                self.refetch(&token).await
            }
            None => {
                let mut cart = self.local_cart();
                cart.increment(product_id)?;
                self.publish(cart.into_lines());
                Ok(())
            }
        }
    }

    /// Decrements a line. A line at quantity 1 is removed.
    pub async fn decrement(&self, product_id: &str) -> ClientResult<()> {
        let _guard = self.mutation.lock().await;

        match self.session.token() {
            Some(token) => {
                let quantity = self.quantity_of(product_id)?;
                let result = if quantity <= 1 {
                    self.api.remove_cart_item(&token, product_id).await
                } else {
                    self.api
                        .update_cart_item(&token, product_id, quantity - 1)
                        .await
                };
                result.map_err(|e| mutation_failed("decrement", product_id, e))?;
                self.refetch(&token).await
            }
            None => {
                let mut cart = self.local_cart();
                cart.decrement(product_id)?;
                self.publish(cart.into_lines());
                Ok(())
            }
        }
    }

    pub async fn remove(&self, product_id: &str) -> ClientResult<()> {
        let _guard = self.mutation.lock().await;

        match self.session.token() {
            Some(token) => {
                self.api
                    .remove_cart_item(&token, product_id)
                    .await
                    .map_err(|e| mutation_failed("remove", product_id, e))?;
                self.refetch(&token).await
            }
            None => {
                let mut cart = self.local_cart();
                cart.remove(product_id)?;
                self.publish(cart.into_lines());
                Ok(())
            }
        }
    }

    /// Orders the current lines. Requires a session.
    pub async fn place_order(&self) -> ClientResult<OrderResponse> {
        let _guard = self.mutation.lock().await;

        let Some(token) = self.session.token() else {
            return Err(ClientError::NotAuthenticated);
        };

        let request = self.local_cart().to_order_request()?;
        let order = self.api.place_order(&token, &request).await.map_err(|e| {
            warn!(error = %e, "Order placement failed");
            e
        })?;
        info!(order_id = order.id, total = %order.total_amount, "Order placed");

        // The order stands even if the follow-up refresh fails.
        if let Err(e) = self.refetch(&token).await {
            warn!(error = %e, "Cart refresh after order failed");
        }
        Ok(order)
    }

    // =========================================================================
    // Reactions
    // =========================================================================

    /// Logged in: one full fetch replaces local lines. Logged out: the cart
    /// is emptied.
    ///
    /// Lines added while anonymous are not carried into the session.
    pub async fn refresh_for_session_change(&self) -> ClientResult<()> {
        let _guard = self.mutation.lock().await;

        match self.session.token() {
            Some(token) => self.refetch(&token).await,
            None => {
                debug!("Session ended, clearing cart");
                self.publish(Vec::new());
                Ok(())
            }
        }
    }

    /// Product names are localized server-side; refetch when logged in.
    pub async fn refresh_for_language_change(&self) -> ClientResult<()> {
        let _guard = self.mutation.lock().await;

        match self.session.token() {
            Some(token) => self.refetch(&token).await,
            None => Ok(()),
        }
    }

    /// Runs [`refresh_for_session_change`](Self::refresh_for_session_change)
    /// after every login or logout, and once at start for a restored
    /// session.
    pub fn spawn_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let cart = Arc::downgrade(self);
        let rx = self.session.subscribe();
        tokio::spawn(listen_session(cart, rx))
    }

    /// Refetches after each language change.
    pub fn spawn_language_listener(
        self: &Arc<Self>,
        rx: watch::Receiver<Option<LanguageTag>>,
    ) -> JoinHandle<()> {
        let cart = Arc::downgrade(self);
        tokio::spawn(listen_language(cart, rx))
    }
}

fn mutation_failed(action: &str, product_id: &str, err: ClientError) -> ClientError {
    warn!(action, product_id, error = %err, "Cart mutation failed");
    err
}

async fn listen_session(cart: Weak<CartSynchronizer>, mut rx: watch::Receiver<Option<AuthToken>>) {
    // Only a restored session needs an initial fetch.
    let restored = rx.borrow_and_update().is_some();
    if restored {
        if let Some(cart) = cart.upgrade() {
            let _ = cart.refresh_for_session_change().await;
        }
    }

    while rx.changed().await.is_ok() {
        let Some(cart) = cart.upgrade() else { break };
        // Failures are logged inside; the listener keeps running.
        let _ = cart.refresh_for_session_change().await;
    }
    debug!("Cart session listener stopped");
}

async fn listen_language(
    cart: Weak<CartSynchronizer>,
    mut rx: watch::Receiver<Option<LanguageTag>>,
) {
    while rx.changed().await.is_ok() {
        let Some(cart) = cart.upgrade() else { break };
        let _ = cart.refresh_for_language_change().await;
    }
    debug!("Cart language listener stopped");
}
