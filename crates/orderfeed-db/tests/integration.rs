//! Offline unit tests for orderfeed-db pool configuration and row types.
//! These tests do not require a live database connection.

use orderfeed_core::{AppConfig, Environment};
use orderfeed_db::{LineItemDetailRow, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        commerce_api_url: "https://api.example.com".to_string(),
        commerce_auth_url: "https://auth.example.com".to_string(),
        commerce_client_id: None,
        commerce_client_secret: None,
        commerce_scope: "FullAccess".to_string(),
        commerce_request_timeout_secs: 30,
        commerce_page_size: 100,
        commerce_max_retries: 0,
        commerce_retry_backoff_base_ms: 1000,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`LineItemDetailRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn line_item_detail_row_has_expected_fields() {
    use chrono::Utc;

    let row = LineItemDetailRow {
        id: "0b6c1f0e-doc".to_string(),
        partition_key: orderfeed_core::LINE_ITEM_DETAIL_PARTITION.to_string(),
        order_id: "SO-1".to_string(),
        data: serde_json::json!({ "Order": { "ID": "SO-1" } }),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.partition_key, "PartitionValue");
    assert_eq!(row.order_id, "SO-1");
    assert_eq!(row.data["Order"]["ID"], "SO-1");
}
