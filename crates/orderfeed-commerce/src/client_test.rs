use super::*;

fn settings(api_url: &str) -> CommerceSettings {
    CommerceSettings {
        api_url: api_url.to_owned(),
        auth_url: "https://auth.example.com".to_owned(),
        client_id: "client".to_owned(),
        client_secret: "secret".to_owned(),
        scope: "FullAccess".to_owned(),
        timeout_secs: 30,
        page_size: 100,
        max_retries: 0,
        backoff_base_ms: 0,
    }
}

fn test_client(api_url: &str) -> CommerceClient {
    CommerceClient::new(&settings(api_url)).expect("client construction should not fail")
}

#[test]
fn build_url_prefixes_version_segment() {
    let client = test_client("https://api.example.com");
    let url = client
        .build_url(&["orders", "Incoming", "SO-1", "worksheet"], &[])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.example.com/v1/orders/Incoming/SO-1/worksheet"
    );
}

#[test]
fn build_url_keeps_base_path_and_strips_trailing_slash() {
    let client = test_client("https://gateway.example.com/commerce/");
    let url = client.build_url(&["buyers", "b-1"], &[]).unwrap();
    assert_eq!(
        url.as_str(),
        "https://gateway.example.com/commerce/v1/buyers/b-1"
    );
}

#[test]
fn build_url_encodes_segments_and_query() {
    let client = test_client("https://api.example.com");
    let url = client
        .build_url(
            &["orders", "Outgoing"],
            &[("page", "1"), ("ID", "SO 1-*")],
        )
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.example.com/v1/orders/Outgoing?page=1&ID=SO+1-*"
    );

    let url = client.build_url(&["suppliers", "a/b"], &[]).unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v1/suppliers/a%2Fb");
}

#[test]
fn token_url_is_derived_from_auth_url() {
    let client = test_client("https://api.example.com");
    assert_eq!(
        client.token_url.as_str(),
        "https://auth.example.com/oauth/token"
    );
}

#[test]
fn page_size_is_clamped() {
    let mut s = settings("https://api.example.com");
    s.page_size = 1_000;
    let client = CommerceClient::new(&s).unwrap();
    assert_eq!(client.page_size, 100);
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = CommerceClient::new(&settings("not a url"));
    assert!(matches!(result, Err(CommerceError::InvalidBaseUrl { .. })));
}

#[test]
fn settings_debug_redacts_secret() {
    let rendered = format!("{:?}", settings("https://api.example.com"));
    assert!(!rendered.contains("\"secret\""));
    assert!(rendered.contains("[redacted]"));
}
