use crate::domain::error::AveoError;
use crate::domain::model::{Cart, CartItem, Product};
use crate::domain::traits::KeyValueStore;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Read-modify-write cart operations over a [`KeyValueStore`].
///
/// Every operation loads the whole cart, changes it and writes it back. Two
/// writers racing on the same store resolve as last-write-wins.
pub struct CartService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for CartService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: KeyValueStore + ?Sized> CartService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Current cart. A missing or unreadable entry is an empty cart.
    pub async fn get_cart(&self) -> Result<Cart, AveoError> {
        let Some(raw) = self.store.load(CART_KEY).await? else {
            return Ok(Cart::default());
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => Ok(cart),
            Err(e) => {
                tracing::warn!(error = %e, "stored cart is unreadable, starting empty");
                Ok(Cart::default())
            }
        }
    }

    /// Add `quantity` of `product`, merging with an existing line.
    ///
    /// A zero quantity never creates a new line.
    pub async fn add_to_cart(&self, product: Product, quantity: u32) -> Result<Cart, AveoError> {
        let mut cart = self.get_cart().await?;

        if let Some(item) = cart
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            item.quantity = item.quantity.saturating_add(quantity);
        } else if quantity > 0 {
            cart.items.push(CartItem { product, quantity });
        }

        self.write(&cart).await?;
        Ok(cart)
    }

    pub async fn remove_from_cart(&self, product_id: &str) -> Result<Cart, AveoError> {
        let mut cart = self.get_cart().await?;
        cart.items.retain(|item| item.product.id != product_id);
        self.write(&cart).await?;
        Ok(cart)
    }

    /// Set a line's quantity; zero removes the line. Unknown ids leave the cart as is.
    pub async fn update_quantity(&self, product_id: &str, quantity: u32) -> Result<Cart, AveoError> {
        let mut cart = self.get_cart().await?;

        if cart.is_in_cart(product_id) && quantity == 0 {
            return self.remove_from_cart(product_id).await;
        }
        if let Some(item) = cart
            .items
            .iter_mut()
            .find(|item| item.product.id == product_id)
        {
            item.quantity = quantity;
        }

        self.write(&cart).await?;
        Ok(cart)
    }

    pub async fn clear_cart(&self) -> Result<Cart, AveoError> {
        self.store.remove(CART_KEY).await?;
        Ok(Cart::default())
    }

    async fn write(&self, cart: &Cart) -> Result<(), AveoError> {
        let raw = serde_json::to_string(cart)?;
        self.store.save(CART_KEY, &raw).await
    }
}

/// Cart state held by a long-lived front end.
///
/// Keeps the last known cart in memory. Failed operations are logged and leave
/// the snapshot untouched. [`CartSession::spawn_sync`] keeps the snapshot in step
/// with writes made through other handles of the same store.
pub struct CartSession<S: ?Sized> {
    service: CartService<S>,
    snapshot: Arc<RwLock<Cart>>,
}

impl<S: KeyValueStore + ?Sized + 'static> CartSession<S> {
    pub async fn load(service: CartService<S>) -> Self {
        let cart = match service.get_cart().await {
            Ok(cart) => cart,
            Err(e) => {
                tracing::error!(error = %e, "error loading cart");
                Cart::default()
            }
        };

        Self {
            service,
            snapshot: Arc::new(RwLock::new(cart)),
        }
    }

    pub async fn cart(&self) -> Cart {
        self.snapshot.read().await.clone()
    }

    pub async fn add_to_cart(&self, product: Product, quantity: u32) -> Cart {
        let result = self.service.add_to_cart(product, quantity).await;
        self.apply("adding to cart", result).await
    }

    pub async fn remove_from_cart(&self, product_id: &str) -> Cart {
        let result = self.service.remove_from_cart(product_id).await;
        self.apply("removing from cart", result).await
    }

    pub async fn update_quantity(&self, product_id: &str, quantity: u32) -> Cart {
        let result = self.service.update_quantity(product_id, quantity).await;
        self.apply("updating quantity", result).await
    }

    pub async fn clear_cart(&self) -> Cart {
        let result = self.service.clear_cart().await;
        self.apply("clearing cart", result).await
    }

    pub async fn total_price(&self) -> f64 {
        self.snapshot.read().await.total_price()
    }

    pub async fn total_items(&self) -> u64 {
        self.snapshot.read().await.total_items()
    }

    pub async fn is_in_cart(&self, product_id: &str) -> bool {
        self.snapshot.read().await.is_in_cart(product_id)
    }

    pub async fn item_quantity(&self, product_id: &str) -> u32 {
        self.snapshot.read().await.item_quantity(product_id)
    }

    /// Reload the snapshot whenever the store reports a change to the cart key.
    ///
    /// The task ends when the store's event channel closes. Abort the handle to
    /// stop it earlier.
    pub fn spawn_sync(&self) -> JoinHandle<()> {
        let mut events = self.service.store().subscribe();
        let service = self.service.clone();
        let snapshot = self.snapshot.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if event.key() == CART_KEY => match service.get_cart().await {
                        Ok(cart) => *snapshot.write().await = cart,
                        Err(e) => tracing::error!(error = %e, "error reloading cart"),
                    },
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "cart sync lagged, reloading");
                        if let Ok(cart) = service.get_cart().await {
                            *snapshot.write().await = cart;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn apply(&self, action: &str, result: Result<Cart, AveoError>) -> Cart {
        match result {
            Ok(cart) => {
                *self.snapshot.write().await = cart.clone();
                cart
            }
            Err(e) => {
                tracing::error!(error = %e, "error {}", action);
                self.snapshot.read().await.clone()
            }
        }
    }
}
