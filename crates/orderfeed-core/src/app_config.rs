use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub commerce_api_url: String,
    pub commerce_auth_url: String,
    pub commerce_client_id: Option<String>,
    pub commerce_client_secret: Option<String>,
    pub commerce_scope: String,
    pub commerce_request_timeout_secs: u64,
    pub commerce_page_size: u32,
    pub commerce_max_retries: u32,
    pub commerce_retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("commerce_api_url", &self.commerce_api_url)
            .field("commerce_auth_url", &self.commerce_auth_url)
            .field("commerce_client_id", &self.commerce_client_id)
            .field(
                "commerce_client_secret",
                &self.commerce_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("commerce_scope", &self.commerce_scope)
            .field(
                "commerce_request_timeout_secs",
                &self.commerce_request_timeout_secs,
            )
            .field("commerce_page_size", &self.commerce_page_size)
            .field("commerce_max_retries", &self.commerce_max_retries)
            .field(
                "commerce_retry_backoff_base_ms",
                &self.commerce_retry_backoff_base_ms,
            )
            .finish()
    }
}
