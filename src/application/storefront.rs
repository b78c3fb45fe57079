use crate::domain::error::AveoError;
use crate::domain::model::{
    Address, AuthResponse, Brand, Category, HealthStatus, MessageResponse, NewAddress, NewOrder,
    Order, Paginated, Product, RemoteCart, Review, UserProfile, WishlistItem,
};
use crate::domain::params::{to_query, PageParams, RecommendationKind, SearchRequest};
use crate::infrastructure::network::ApiClient;
use crate::infrastructure::storage::TtlCache;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const CATEGORIES_KEY: &str = "categories_tree";
const BRANDS_KEY: &str = "brands_active";
const WISHLIST_KEY: &str = "wishlist";

/// Buyer-facing API: auth, catalog, server-side cart, orders, wishlist.
pub struct StorefrontService {
    api: Arc<ApiClient>,
    cache: TtlCache<Value>,
}

impl StorefrontService {
    pub fn new(api: Arc<ApiClient>, ttl: Duration) -> Self {
        Self {
            api,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn with_cache(api: Arc<ApiClient>, cache: TtlCache<Value>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    // Auth

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
        phone: Option<&str>,
    ) -> Result<AuthResponse, AveoError> {
        let body = json!({ "email": email, "password": password, "name": name, "phone": phone });
        self.call(Method::POST, "/auth/signup", &[], Some(&body))
            .await
    }

    /// Log in and keep the returned access token on the client.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AveoError> {
        let body = json!({ "email": email, "password": password });
        let response: AuthResponse = self
            .call(Method::POST, "/auth/login", &[], Some(&body))
            .await?;
        self.api.set_token(Some(response.access_token.clone()));
        // cached per-user data belongs to whoever was logged in before
        self.cache.invalidate(WISHLIST_KEY);
        tracing::info!("logged in as {}", email);
        Ok(response)
    }

    pub fn logout(&self) {
        self.api.set_token(None);
        self.cache.invalidate(WISHLIST_KEY);
    }

    pub async fn profile(&self) -> Result<UserProfile, AveoError> {
        self.call(Method::GET, "/me", &[], None).await
    }

    pub async fn update_profile(&self, updates: &Value) -> Result<UserProfile, AveoError> {
        self.call(Method::PUT, "/profile", &[], Some(updates)).await
    }

    // Catalog

    pub async fn products(&self, params: &SearchRequest) -> Result<Paginated<Product>, AveoError> {
        self.call(Method::GET, "/products", &to_query(params), None)
            .await
    }

    pub async fn product(&self, product_id: &str) -> Result<Product, AveoError> {
        let path = format!("/products/{}", product_id);
        self.call(Method::GET, &path, &[], None).await
    }

    pub async fn search(
        &self,
        query: &str,
        filters: &SearchRequest,
    ) -> Result<Paginated<Product>, AveoError> {
        let request = SearchRequest {
            query: Some(query.to_string()),
            ..filters.clone()
        };
        let body = serde_json::to_value(&request)?;
        self.call(Method::POST, "/search/", &[], Some(&body)).await
    }

    pub async fn trending(&self, limit: u32) -> Result<Vec<Product>, AveoError> {
        self.call(Method::GET, "/search/trending", &limit_query(limit), None)
            .await
    }

    pub async fn eco_friendly(&self, limit: u32) -> Result<Vec<Product>, AveoError> {
        self.call(Method::GET, "/search/eco-friendly", &limit_query(limit), None)
            .await
    }

    pub async fn recommendations(
        &self,
        kind: RecommendationKind,
        limit: u32,
    ) -> Result<Vec<Product>, AveoError> {
        let mut query = vec![("type".to_string(), kind.as_str().to_string())];
        query.extend(limit_query(limit));
        self.call(Method::GET, "/search/recommendations", &query, None)
            .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, AveoError> {
        self.cached(CATEGORIES_KEY, "/products/categories/tree")
            .await
    }

    pub async fn category(&self, category_id: &str) -> Result<Category, AveoError> {
        let path = format!("/products/categories/{}", category_id);
        self.call(Method::GET, &path, &[], None).await
    }

    pub async fn brands(&self) -> Result<Vec<Brand>, AveoError> {
        self.cached(BRANDS_KEY, "/products/brands/active").await
    }

    pub async fn brand(&self, brand_id: &str) -> Result<Brand, AveoError> {
        let path = format!("/products/brands/{}", brand_id);
        self.call(Method::GET, &path, &[], None).await
    }

    // Server-side cart

    pub async fn cart(&self) -> Result<RemoteCart, AveoError> {
        self.call(Method::GET, "/buyer/orders/cart", &[], None).await
    }

    pub async fn add_cart_item(
        &self,
        product_id: &str,
        quantity: u32,
        variant_id: Option<&str>,
    ) -> Result<MessageResponse, AveoError> {
        let body = json!({ "product_id": product_id, "quantity": quantity, "variant_id": variant_id });
        self.call_message(Method::POST, "/buyer/orders/cart/items", Some(&body))
            .await
    }

    pub async fn update_cart_item(
        &self,
        cart_item_id: &str,
        quantity: u32,
    ) -> Result<MessageResponse, AveoError> {
        let path = format!("/buyer/orders/cart/items/{}", cart_item_id);
        let body = json!({ "quantity": quantity });
        self.call_message(Method::PUT, &path, Some(&body)).await
    }

    pub async fn remove_cart_item(&self, cart_item_id: &str) -> Result<MessageResponse, AveoError> {
        let path = format!("/buyer/orders/cart/items/{}", cart_item_id);
        self.call_message(Method::DELETE, &path, None).await
    }

    pub async fn clear_remote_cart(&self) -> Result<MessageResponse, AveoError> {
        self.call_message(Method::DELETE, "/buyer/orders/cart", None)
            .await
    }

    // Orders

    pub async fn orders(&self, page: &PageParams) -> Result<Paginated<Order>, AveoError> {
        let page = PageParams {
            page: page.page.or(Some(1)),
            limit: page.limit.or(Some(10)),
        };
        self.call(Method::GET, "/buyer/orders", &to_query(&page), None)
            .await
    }

    pub async fn order(&self, order_id: &str) -> Result<Order, AveoError> {
        let path = format!("/buyer/orders/{}", order_id);
        self.call(Method::GET, &path, &[], None).await
    }

    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, AveoError> {
        let body = serde_json::to_value(order)?;
        self.call(Method::POST, "/buyer/orders", &[], Some(&body))
            .await
    }

    pub async fn cancel_order(
        &self,
        order_id: &str,
        reason: &str,
    ) -> Result<MessageResponse, AveoError> {
        let path = format!("/buyer/orders/{}/cancel", order_id);
        let body = json!({ "cancel_reason": reason });
        self.call_message(Method::POST, &path, Some(&body)).await
    }

    // Wishlist

    pub async fn wishlist(&self) -> Result<Vec<WishlistItem>, AveoError> {
        self.cached(WISHLIST_KEY, "/products/wishlist").await
    }

    pub async fn add_to_wishlist(&self, product_id: &str) -> Result<MessageResponse, AveoError> {
        let body = json!({ "product_id": product_id });
        let response = self
            .call_message(Method::POST, "/products/wishlist", Some(&body))
            .await?;
        self.cache.invalidate(WISHLIST_KEY);
        Ok(response)
    }

    pub async fn remove_from_wishlist(
        &self,
        product_id: &str,
    ) -> Result<MessageResponse, AveoError> {
        let path = format!("/products/wishlist/{}", product_id);
        let response = self.call_message(Method::DELETE, &path, None).await?;
        self.cache.invalidate(WISHLIST_KEY);
        Ok(response)
    }

    pub async fn is_in_wishlist(&self, product_id: &str) -> Result<bool, AveoError> {
        let path = format!("/products/wishlist/{}/check", product_id);
        let response: Value = self.call(Method::GET, &path, &[], None).await?;
        Ok(response
            .get("in_wishlist")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    // Reviews

    pub async fn product_reviews(
        &self,
        product_id: &str,
        page: &PageParams,
    ) -> Result<Paginated<Review>, AveoError> {
        let path = format!("/products/{}/reviews", product_id);
        self.call(Method::GET, &path, &to_query(page), None).await
    }

    pub async fn create_review(
        &self,
        product_id: &str,
        rating: u8,
        comment: &str,
    ) -> Result<Review, AveoError> {
        let path = format!("/products/{}/reviews", product_id);
        let body = json!({ "rating": rating, "comment": comment });
        self.call(Method::POST, &path, &[], Some(&body)).await
    }

    pub async fn update_review(
        &self,
        review_id: &str,
        rating: u8,
        comment: &str,
    ) -> Result<Review, AveoError> {
        let path = format!("/products/reviews/{}", review_id);
        let body = json!({ "rating": rating, "comment": comment });
        self.call(Method::PUT, &path, &[], Some(&body)).await
    }

    pub async fn delete_review(&self, review_id: &str) -> Result<MessageResponse, AveoError> {
        let path = format!("/products/reviews/{}", review_id);
        self.call_message(Method::DELETE, &path, None).await
    }

    // Addresses

    pub async fn addresses(&self) -> Result<Vec<Address>, AveoError> {
        self.call(Method::GET, "/buyer/addresses", &[], None).await
    }

    pub async fn create_address(&self, address: &NewAddress) -> Result<Address, AveoError> {
        let body = serde_json::to_value(address)?;
        self.call(Method::POST, "/buyer/addresses", &[], Some(&body))
            .await
    }

    /// Partial update: only the fields present in `changes` are sent.
    pub async fn update_address(
        &self,
        address_id: &str,
        changes: &Value,
    ) -> Result<Address, AveoError> {
        let path = format!("/buyer/addresses/{}", address_id);
        self.call(Method::PUT, &path, &[], Some(changes)).await
    }

    pub async fn delete_address(&self, address_id: &str) -> Result<MessageResponse, AveoError> {
        let path = format!("/buyer/addresses/{}", address_id);
        self.call_message(Method::DELETE, &path, None).await
    }

    pub async fn health(&self) -> Result<HealthStatus, AveoError> {
        self.call(Method::GET, "/health", &[], None).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<T, AveoError> {
        self.api
            .send(method, path, query, body)
            .await
            .inspect_err(|e| tracing::error!(error = %e, path, "api error"))
    }

    /// Like `call`, but an empty success body counts as an empty message.
    async fn call_message(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<MessageResponse, AveoError> {
        let value: Value = self.call(method, path, &[], body).await?;
        if value.is_null() {
            return Ok(MessageResponse::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str, path: &str) -> Result<T, AveoError> {
        let value = match self.cache.get(key) {
            Some(value) => value,
            None => {
                let value: Value = self.call(Method::GET, path, &[], None).await?;
                self.cache.set(key, value.clone());
                value
            }
        };
        Ok(serde_json::from_value(value)?)
    }
}

fn limit_query(limit: u32) -> Vec<(String, String)> {
    vec![("limit".to_string(), limit.to_string())]
}
