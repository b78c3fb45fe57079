use crate::domain::error::AveoError;
use crate::domain::model::{envelope_total, DashboardStats, SalesChart, SalesPoint, TopProduct};
use crate::domain::params::{
    cache_key, to_query, AnalyticsParams, ChartParams, OrderFilter, PageParams, ProductFilter,
    SupplierFilter, TopProductsParams,
};
use crate::infrastructure::network::ApiClient;
use crate::infrastructure::storage::TtlCache;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const DASHBOARD_KEY: &str = "dashboard_stats";

const PRODUCT_PATTERNS: &[&str] = &["products", "pending_products", DASHBOARD_KEY];
const ORDER_PATTERNS: &[&str] = &["orders", DASHBOARD_KEY];
const SUPPLIER_PATTERNS: &[&str] = &["supplier", DASHBOARD_KEY];

/// Supplier review decision.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SupplierAction {
    Approve,
    Reject,
}

/// Admin panel operations with a read-through response cache.
///
/// Reads are served from the cache while fresh. Every mutation drops the
/// cache entries whose keys mention the touched entity type.
pub struct AdminService {
    api: Arc<ApiClient>,
    cache: TtlCache<Value>,
}

impl AdminService {
    pub fn new(api: Arc<ApiClient>, ttl: Duration) -> Self {
        Self::with_cache(api, TtlCache::new(ttl))
    }

    pub fn with_cache(api: Arc<ApiClient>, cache: TtlCache<Value>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    // Products

    pub async fn pending_products(&self, params: &PageParams) -> Result<Value, AveoError> {
        let key = cache_key("pending_products", params);
        logged(
            "get pending products",
            self.cached_get(key, "/admin/products/pending", to_query(params))
                .await,
        )
    }

    pub async fn all_products(&self, params: &ProductFilter) -> Result<Value, AveoError> {
        let key = cache_key("all_products", params);
        logged(
            "get all products",
            self.cached_get(key, "/admin/products", to_query(params)).await,
        )
    }

    pub async fn product(&self, product_id: &str) -> Result<Value, AveoError> {
        let key = format!("product_{}", product_id);
        let path = format!("/admin/products/{}", product_id);
        logged("get product", self.cached_get(key, &path, Vec::new()).await)
    }

    /// Approve or reject a product awaiting review.
    pub async fn review_product(
        &self,
        product_id: &str,
        approved: bool,
        approval_notes: &str,
    ) -> Result<Value, AveoError> {
        let body = json!({ "approved": approved, "approval_notes": approval_notes });
        let path = format!("/admin/products/{}/review", product_id);
        let result = self.mutate(Method::POST, &path, Vec::new(), Some(&body)).await;
        if result.is_ok() {
            self.invalidate_product(product_id);
        }
        logged("review product", result)
    }

    pub async fn delete_product(&self, product_id: &str) -> Result<(), AveoError> {
        let path = format!("/admin/products/{}", product_id);
        let result = self.mutate(Method::DELETE, &path, Vec::new(), None).await;
        if result.is_ok() {
            self.invalidate_product(product_id);
        }
        logged("delete product", result).map(|_| ())
    }

    pub async fn update_product_status(
        &self,
        product_id: &str,
        status: &str,
    ) -> Result<Value, AveoError> {
        let body = json!({ "status": status });
        let path = format!("/admin/products/{}/status", product_id);
        let result = self.mutate(Method::PUT, &path, Vec::new(), Some(&body)).await;
        if result.is_ok() {
            self.invalidate_product(product_id);
        }
        logged("update product status", result)
    }

    // Orders

    pub async fn all_orders(&self, params: &OrderFilter) -> Result<Value, AveoError> {
        let key = cache_key("all_orders", params);
        logged(
            "get all orders",
            self.cached_get(key, "/orders/admin/orders", to_query(params))
                .await,
        )
    }

    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: &str,
    ) -> Result<Value, AveoError> {
        let body = json!({ "status": status });
        let path = format!("/orders/admin/orders/{}/status", order_id);
        let result = self.mutate(Method::PUT, &path, Vec::new(), Some(&body)).await;
        if result.is_ok() {
            self.invalidate_order_caches();
        }
        logged("update order status", result)
    }

    pub async fn order_analytics(&self, params: &AnalyticsParams) -> Result<Value, AveoError> {
        let key = cache_key("order_analytics", params);
        logged(
            "get order analytics",
            self.cached_get(key, "/orders/admin/analytics", to_query(params))
                .await,
        )
    }

    // Suppliers

    pub async fn all_suppliers(&self, params: &SupplierFilter) -> Result<Value, AveoError> {
        let key = cache_key("all_suppliers", params);
        logged(
            "get all suppliers",
            self.cached_get(key, "/admin/suppliers", to_query(params)).await,
        )
    }

    pub async fn supplier_documents(&self, supplier_id: &str) -> Result<Value, AveoError> {
        let key = format!("supplier_docs_{}", supplier_id);
        let path = format!("/admin/suppliers/{}/documents", supplier_id);
        logged(
            "get supplier documents",
            self.cached_get(key, &path, Vec::new()).await,
        )
    }

    pub async fn review_supplier(
        &self,
        supplier_id: &str,
        action: SupplierAction,
        comment: &str,
    ) -> Result<Value, AveoError> {
        let body = json!({ "action": action, "comment": comment });
        let path = format!("/admin/suppliers/{}/review", supplier_id);
        let result = self.mutate(Method::POST, &path, Vec::new(), Some(&body)).await;
        if result.is_ok() {
            self.invalidate_supplier_caches();
        }
        logged("review supplier", result)
    }

    /// Mark a supplier verified or rejected. An empty comment is not sent.
    pub async fn update_supplier_status(
        &self,
        supplier_id: &str,
        verified: bool,
        comment: &str,
    ) -> Result<Value, AveoError> {
        let status = if verified { "verified" } else { "rejected" };
        let mut query = vec![("verification_status".to_string(), status.to_string())];
        if !comment.is_empty() {
            query.push(("verification_notes".to_string(), comment.to_string()));
        }

        let path = format!("/admin/suppliers/{}/verification-status", supplier_id);
        let result = self.mutate(Method::PUT, &path, query, None).await;
        if result.is_ok() {
            self.invalidate_supplier_caches();
        }
        logged("update supplier status", result)
    }

    // Dashboard

    /// Headline counts for the admin dashboard.
    ///
    /// Product and order totals must both load. Pending and supplier counts are
    /// best effort and stay at zero when their requests fail.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AveoError> {
        if let Some(cached) = self.cache.get(DASHBOARD_KEY) {
            if let Ok(stats) = serde_json::from_value(cached) {
                return Ok(stats);
            }
        }

        let result = self.load_dashboard_stats().await;
        if let Ok(stats) = &result {
            if let Ok(value) = serde_json::to_value(stats) {
                self.cache.set(DASHBOARD_KEY, value);
            }
        }
        logged("get dashboard stats", result)
    }

    async fn load_dashboard_stats(&self) -> Result<DashboardStats, AveoError> {
        self.api.require_token()?;

        let one = PageParams::new(1, 1);
        let products_filter = ProductFilter {
            page: one.page,
            limit: one.limit,
            ..Default::default()
        };
        let orders_filter = OrderFilter {
            page: one.page,
            limit: one.limit,
            ..Default::default()
        };
        let (products, orders) = tokio::try_join!(
            self.all_products(&products_filter),
            self.all_orders(&orders_filter)
        )?;

        let mut stats = DashboardStats {
            total_products: envelope_total(&products),
            total_orders: envelope_total(&orders),
            ..Default::default()
        };

        match self.pending_products(&one).await {
            Ok(pending) => stats.pending_products = envelope_total(&pending),
            Err(e) => tracing::warn!(error = %e, "could not fetch pending products count"),
        }

        let all_suppliers = SupplierFilter {
            page: one.page,
            limit: one.limit,
            ..Default::default()
        };
        let verified_suppliers = SupplierFilter {
            verification_status: Some("verified".to_string()),
            ..all_suppliers.clone()
        };
        let suppliers = async {
            let all = self.all_suppliers(&all_suppliers).await?;
            let verified = self.all_suppliers(&verified_suppliers).await?;
            Ok::<_, AveoError>((envelope_total(&all), envelope_total(&verified)))
        };
        match suppliers.await {
            Ok((total, verified)) => {
                stats.total_suppliers = total;
                stats.verified_suppliers = verified;
            }
            Err(e) => tracing::warn!(error = %e, "could not fetch suppliers count"),
        }

        Ok(stats)
    }

    // Analytics. These never fail: errors are logged and built-in sample data returned.

    pub async fn sales_chart(&self, params: &ChartParams) -> SalesChart {
        let key = cache_key("sales_chart", params);
        match self
            .cached_get_as(key, "/admin/analytics/sales-chart", to_query(params))
            .await
        {
            Ok(chart) => chart,
            Err(e) => {
                tracing::error!(error = %e, "failed to get sales chart data");
                fallback_sales_chart()
            }
        }
    }

    pub async fn top_products(&self, params: &TopProductsParams) -> Vec<TopProduct> {
        let key = cache_key("top_products", params);
        match self
            .cached_get_as(key, "/admin/analytics/top-products", to_query(params))
            .await
        {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(error = %e, "failed to get top products");
                fallback_top_products()
            }
        }
    }

    // Invalidation

    pub fn invalidate_product_caches(&self) -> usize {
        self.cache.invalidate_any(PRODUCT_PATTERNS)
    }

    pub fn invalidate_order_caches(&self) -> usize {
        self.cache.invalidate_any(ORDER_PATTERNS)
    }

    pub fn invalidate_supplier_caches(&self) -> usize {
        self.cache.invalidate_any(SUPPLIER_PATTERNS)
    }

    fn invalidate_product(&self, product_id: &str) {
        self.cache.remove(&format!("product_{}", product_id));
        self.invalidate_product_caches();
    }

    async fn cached_get(
        &self,
        key: String,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<Value, AveoError> {
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(%key, "admin cache hit");
            return Ok(cached);
        }

        let token = self.api.require_token()?;
        let value = self
            .api
            .request(Method::GET, path, &query, None, Some(&token))
            .await?;
        self.cache.set(key, value.clone());
        Ok(value)
    }

    async fn cached_get_as<T: DeserializeOwned>(
        &self,
        key: String,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, AveoError> {
        let value = self.cached_get(key, path, query).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn mutate(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<&Value>,
    ) -> Result<Value, AveoError> {
        let token = self.api.require_token()?;
        self.api
            .request(method, path, &query, body, Some(&token))
            .await
    }
}

fn logged<T>(action: &str, result: Result<T, AveoError>) -> Result<T, AveoError> {
    if let Err(e) = &result {
        tracing::error!(error = %e, "failed to {}", action);
    }
    result
}

pub fn fallback_sales_chart() -> SalesChart {
    let values = [20, 45, 30, 65, 50, 85, 90, 75, 60, 40, 55, 70, 80];
    SalesChart {
        data: values
            .iter()
            .zip(10..)
            .map(|(value, day)| SalesPoint {
                day: day.to_string(),
                value: f64::from(*value),
            })
            .collect(),
        max_value: 90.0,
        min_value: 20.0,
    }
}

pub fn fallback_top_products() -> Vec<TopProduct> {
    [
        ("Bamboo Spoons", 2345, 2223, "/spoons.png"),
        ("Wooden Baskets", 1890, 1856, "/category1.png"),
        ("Jute Bags", 1654, 1423, "/category1.png"),
        ("Eco-friendly Plates", 1432, 1289, "/spoons.png"),
    ]
    .into_iter()
    .map(|(name, orders, likes, image)| TopProduct {
        name: name.to_string(),
        orders,
        likes,
        image: Some(image.to_string()),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::network::http::create_client;
    use crate::infrastructure::config::HttpConfig;

    fn offline_service() -> AdminService {
        let http = create_client(&HttpConfig::default()).unwrap();
        // nothing listens on port 9; any request would fail
        let api = Arc::new(ApiClient::new(http, "http://127.0.0.1:9"));
        AdminService::new(api, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn reads_require_token() {
        let admin = offline_service();
        let err = admin.pending_products(&PageParams::default()).await.unwrap_err();
        assert!(matches!(err, AveoError::AuthRequired));
        let err = admin.delete_product("p1").await.unwrap_err();
        assert!(matches!(err, AveoError::AuthRequired));
    }

    #[tokio::test]
    async fn cached_reads_skip_token_check() {
        let admin = offline_service();
        admin
            .cache()
            .set("product_p1", json!({"id": "p1", "name": "Jute Bag"}));
        let product = admin.product("p1").await.unwrap();
        assert_eq!(product["name"], "Jute Bag");
    }

    #[tokio::test]
    async fn analytics_fall_back_without_token() {
        let admin = offline_service();
        let chart = admin.sales_chart(&ChartParams::default()).await;
        assert_eq!(chart, fallback_sales_chart());
        assert_eq!(chart.data.len(), 13);
        assert_eq!(chart.data[0].day, "10");
        assert_eq!(chart.data[12].day, "22");

        let top = admin.top_products(&TopProductsParams::default()).await;
        assert_eq!(top.len(), 4);
        assert_eq!(top[0].name, "Bamboo Spoons");
    }

    #[test]
    fn invalidation_sets() {
        let admin = offline_service();
        for key in [
            "all_products_{}",
            "pending_products_{}",
            "product_p1",
            "all_orders_{}",
            "order_analytics_{}",
            "all_suppliers_{}",
            "supplier_docs_s1",
            "dashboard_stats",
        ] {
            admin.cache().set(key, Value::Null);
        }

        assert_eq!(admin.invalidate_supplier_caches(), 3);
        assert_eq!(admin.invalidate_order_caches(), 1);
        assert_eq!(admin.invalidate_product_caches(), 2);

        let mut left = admin.cache().keys();
        left.sort();
        assert_eq!(left, vec!["order_analytics_{}", "product_p1"]);
    }
}
