use std::sync::Arc;
use tracing::{info, instrument};

use super::state_service::{Mutation, StateService};
use crate::domain::errors::{EcoError, EcoResult};
use crate::domain::models::{CartEntry, CartSummary};
use crate::domain::ports::StateKey;

/// Shopping cart, unique by product URL.
pub struct CartService {
    state: Arc<StateService>,
}

impl CartService {
    pub const fn new(state: Arc<StateService>) -> Self {
        Self { state }
    }

    /// Append `entry` unless an entry with the same URL is already present.
    ///
    /// Returns the cart as written.
    #[instrument(skip(self, entry), fields(url = %entry.url))]
    pub async fn add(&self, entry: CartEntry) -> EcoResult<Vec<CartEntry>> {
        self.state
            .update(StateKey::Cart, move |current: Option<Vec<CartEntry>>| {
                let cart = append_unique(current.unwrap_or_default(), entry)?;
                Ok((Mutation::Put(cart.clone()), cart))
            })
            .await
    }

    /// Remove the entry at zero-based `index`.
    #[instrument(skip(self))]
    pub async fn remove_at(&self, index: usize) -> EcoResult<CartEntry> {
        self.state
            .update(StateKey::Cart, move |current: Option<Vec<CartEntry>>| {
                let mut cart = current.unwrap_or_default();
                if index >= cart.len() {
                    return Err(EcoError::IndexOutOfRange {
                        index,
                        len: cart.len(),
                    });
                }
                let removed = cart.remove(index);
                info!(url = %removed.url, remaining = cart.len(), "cart entry removed");
                Ok((Mutation::Put(cart), removed))
            })
            .await
    }

    pub async fn list(&self) -> EcoResult<Vec<CartEntry>> {
        Ok(self.state.read(StateKey::Cart).await?.unwrap_or_default())
    }

    pub async fn summary(&self) -> EcoResult<CartSummary> {
        Ok(CartSummary::of(&self.list().await?))
    }

    pub async fn clear(&self) -> EcoResult<()> {
        self.state
            .write(StateKey::Cart, &Vec::<CartEntry>::new())
            .await?;
        info!("cart cleared");
        Ok(())
    }
}

/// `cart` with `entry` appended; `AlreadyInCart` if its URL is taken.
pub fn append_unique(mut cart: Vec<CartEntry>, entry: CartEntry) -> EcoResult<Vec<CartEntry>> {
    if cart.iter().any(|existing| existing.url == entry.url) {
        return Err(EcoError::AlreadyInCart(entry.title));
    }
    cart.push(entry);
    Ok(cart)
}
