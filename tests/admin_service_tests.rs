//! Admin service caching and invalidation against a fake backend.

mod common;

use aveo::application::admin::SupplierAction;
use aveo::domain::params::{OrderFilter, PageParams, ProductFilter, SupplierFilter};
use aveo::{AdminService, ManualClock, TtlCache};
use common::FakeBackend;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn admin_with_clock(backend: &FakeBackend) -> (AdminService, Arc<ManualClock>) {
    let api = backend.client().await;
    api.set_token(Some("admin-token".to_string()));
    let clock = Arc::new(ManualClock::new(1_000));
    let cache = TtlCache::with_clock(Duration::from_secs(300), clock.clone());
    (AdminService::with_cache(api, cache), clock)
}

#[tokio::test]
async fn repeated_reads_hit_cache_until_expiry() {
    let backend = FakeBackend::new();
    backend.json("GET", "/admin/products/pending", 200, json!({"data": [], "total": 4}));
    let (admin, clock) = admin_with_clock(&backend).await;
    let params = PageParams::new(1, 10);

    let first = admin.pending_products(&params).await.unwrap();
    let second = admin.pending_products(&params).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.count("GET", "/admin/products/pending"), 1);

    let seen = backend.last("GET", "/admin/products/pending").unwrap();
    assert_eq!(seen.authorization.as_deref(), Some("Bearer admin-token"));
    let query = seen.query.unwrap();
    assert!(query.contains("page=1") && query.contains("limit=10"));

    clock.advance(300_000);
    admin.pending_products(&params).await.unwrap();
    assert_eq!(backend.count("GET", "/admin/products/pending"), 2);
}

#[tokio::test]
async fn different_params_are_different_keys() {
    let backend = FakeBackend::new();
    backend.json("GET", "/admin/products", 200, json!({"data": [], "total": 9}));
    let (admin, _) = admin_with_clock(&backend).await;

    admin.all_products(&ProductFilter::default()).await.unwrap();
    admin
        .all_products(&ProductFilter {
            status_filter: Some("approved".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(backend.count("GET", "/admin/products"), 2);
    assert_eq!(admin.cache().len(), 2);
}

#[tokio::test]
async fn reviewing_a_product_invalidates_product_caches() {
    let backend = FakeBackend::new();
    backend.json("GET", "/admin/products/p1", 200, json!({"id": "p1"}));
    backend.json("GET", "/admin/products", 200, json!({"data": [], "total": 1}));
    backend.json("GET", "/orders/admin/orders", 200, json!({"data": [], "total": 3}));
    backend.json("POST", "/admin/products/p1/review", 200, json!({"ok": true}));
    let (admin, _) = admin_with_clock(&backend).await;

    admin.product("p1").await.unwrap();
    admin.all_products(&ProductFilter::default()).await.unwrap();
    admin.all_orders(&OrderFilter::default()).await.unwrap();

    admin.review_product("p1", true, "looks good").await.unwrap();
    let sent: serde_json::Value =
        serde_json::from_str(&backend.last("POST", "/admin/products/p1/review").unwrap().body)
            .unwrap();
    assert_eq!(sent, json!({"approved": true, "approval_notes": "looks good"}));

    let keys = admin.cache().keys();
    assert!(!keys.iter().any(|k| k.contains("products")));
    assert!(!keys.contains(&"product_p1".to_string()));
    assert!(keys.iter().any(|k| k.starts_with("all_orders_")));

    admin.product("p1").await.unwrap();
    assert_eq!(backend.count("GET", "/admin/products/p1"), 2);
}

#[tokio::test]
async fn failed_mutation_keeps_cache() {
    let backend = FakeBackend::new();
    backend.json("GET", "/admin/products", 200, json!({"data": [], "total": 1}));
    backend.json("DELETE", "/admin/products/p1", 403, json!({"detail": "Forbidden"}));
    let (admin, _) = admin_with_clock(&backend).await;

    admin.all_products(&ProductFilter::default()).await.unwrap();
    let err = admin.delete_product("p1").await.unwrap_err();
    assert_eq!(err.to_string(), "Forbidden");
    assert_eq!(admin.cache().len(), 1);
}

#[tokio::test]
async fn supplier_status_goes_in_query_and_invalidates() {
    let backend = FakeBackend::new();
    backend.json("GET", "/admin/suppliers", 200, json!({"data": [], "total": 2}));
    backend.json("GET", "/admin/suppliers/s1/documents", 200, json!([]));
    backend.json(
        "PUT",
        "/admin/suppliers/s1/verification-status",
        200,
        json!({"verification_status": "verified"}),
    );
    backend.json("POST", "/admin/suppliers/s1/review", 200, json!({}));
    let (admin, _) = admin_with_clock(&backend).await;

    admin.all_suppliers(&SupplierFilter::default()).await.unwrap();
    admin.supplier_documents("s1").await.unwrap();
    assert_eq!(admin.cache().len(), 2);

    admin
        .update_supplier_status("s1", true, "docs ok")
        .await
        .unwrap();
    let seen = backend
        .last("PUT", "/admin/suppliers/s1/verification-status")
        .unwrap();
    assert_eq!(
        seen.query.as_deref(),
        Some("verification_status=verified&verification_notes=docs+ok")
    );
    assert!(admin.cache().is_empty());

    admin
        .update_supplier_status("s1", false, "")
        .await
        .unwrap();
    let seen = backend
        .last("PUT", "/admin/suppliers/s1/verification-status")
        .unwrap();
    assert_eq!(seen.query.as_deref(), Some("verification_status=rejected"));

    admin
        .review_supplier("s1", SupplierAction::Reject, "missing licence")
        .await
        .unwrap();
    let body: serde_json::Value =
        serde_json::from_str(&backend.last("POST", "/admin/suppliers/s1/review").unwrap().body)
            .unwrap();
    assert_eq!(body, json!({"action": "reject", "comment": "missing licence"}));
}

#[tokio::test]
async fn dashboard_combines_counts() {
    let backend = FakeBackend::new();
    backend.json("GET", "/admin/products", 200, json!({"data": [], "total": 120}));
    backend.json("GET", "/orders/admin/orders", 200, json!({"data": [], "total": 45}));
    backend.json("GET", "/admin/products/pending", 200, json!({"data": [], "total": 7}));
    backend.json("GET", "/admin/suppliers", 200, json!({"data": [], "total": 12}));
    let (admin, _) = admin_with_clock(&backend).await;

    let stats = admin.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_products, 120);
    assert_eq!(stats.total_orders, 45);
    assert_eq!(stats.pending_products, 7);
    assert_eq!(stats.total_suppliers, 12);
    // the fake backend ignores the filter, so verified sees the same total
    assert_eq!(stats.verified_suppliers, 12);
    assert_eq!(backend.count("GET", "/admin/suppliers"), 2);

    let again = admin.dashboard_stats().await.unwrap();
    assert_eq!(again, stats);
    assert_eq!(backend.count("GET", "/admin/products"), 1);
}

#[tokio::test]
async fn dashboard_tolerates_missing_optional_counts() {
    let backend = FakeBackend::new();
    backend.json("GET", "/admin/products", 200, json!({"data": [], "total": 3}));
    backend.json("GET", "/orders/admin/orders", 200, json!({"data": [], "total": 1}));
    let (admin, _) = admin_with_clock(&backend).await;

    let stats = admin.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_products, 3);
    assert_eq!(stats.pending_products, 0);
    assert_eq!(stats.total_suppliers, 0);
}

#[tokio::test]
async fn dashboard_fails_when_required_counts_fail() {
    let backend = FakeBackend::new();
    backend.json("GET", "/admin/products", 200, json!({"data": [], "total": 3}));
    backend.json("GET", "/orders/admin/orders", 500, json!({"message": "db down"}));
    let (admin, _) = admin_with_clock(&backend).await;

    let err = admin.dashboard_stats().await.unwrap_err();
    assert_eq!(err.to_string(), "db down");
    assert!(admin.cache().get("dashboard_stats").is_none());
}

#[tokio::test]
async fn analytics_use_backend_data_when_available() {
    let backend = FakeBackend::new();
    backend.json(
        "GET",
        "/admin/analytics/sales-chart",
        200,
        json!({"data": [{"day": "1", "value": 5}], "maxValue": 5, "minValue": 5}),
    );
    backend.json("GET", "/admin/analytics/top-products", 500, json!({}));
    let (admin, _) = admin_with_clock(&backend).await;

    let chart = admin.sales_chart(&Default::default()).await;
    assert_eq!(chart.data.len(), 1);
    assert_eq!(chart.max_value, 5.0);

    let top = admin.top_products(&Default::default()).await;
    assert_eq!(top, aveo::application::admin::fallback_top_products());
}
