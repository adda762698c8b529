//! HTTP client for the commerce platform REST API.
//!
//! Wraps `reqwest` with client-credentials authentication, a cached bearer
//! token, sequential page walking for list endpoints, and typed response
//! deserialization. One client is meant to live for the whole process.

use std::time::{Duration, Instant};

use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::CommerceError;
use crate::retry::RetryPolicy;
use crate::types::{Buyer, LineItem, ListPage, Order, OrderDirection, OrderWorksheet, Supplier};

/// Upper bound on pages walked by a single list call.
pub(crate) const MAX_PAGES: usize = 500;

/// Tokens are refreshed this long before the platform says they expire.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// Cached tokens are refreshed at least this often, whatever `expires_in` says.
const MAX_TOKEN_LIFETIME_SECS: u64 = 24 * 60 * 60;

/// Connection and credential settings for [`CommerceClient`].
#[derive(Clone)]
pub struct CommerceSettings {
    pub api_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl std::fmt::Debug for CommerceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceSettings")
            .field("api_url", &self.api_url)
            .field("auth_url", &self.auth_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("scope", &self.scope)
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}

impl CommerceSettings {
    /// Builds settings from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::MissingCredentials`] when the client ID or
    /// secret is not configured.
    pub fn from_app_config(config: &orderfeed_core::AppConfig) -> Result<Self, CommerceError> {
        let client_id = config
            .commerce_client_id
            .clone()
            .ok_or(CommerceError::MissingCredentials("COMMERCE_CLIENT_ID"))?;
        let client_secret = config
            .commerce_client_secret
            .clone()
            .ok_or(CommerceError::MissingCredentials("COMMERCE_CLIENT_SECRET"))?;

        Ok(Self {
            api_url: config.commerce_api_url.clone(),
            auth_url: config.commerce_auth_url.clone(),
            client_id,
            client_secret,
            scope: config.commerce_scope.clone(),
            timeout_secs: config.commerce_request_timeout_secs,
            page_size: config.commerce_page_size,
            max_retries: config.commerce_max_retries,
            backoff_base_ms: config.commerce_retry_backoff_base_ms,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Client for the commerce platform REST API.
pub struct CommerceClient {
    client: Client,
    api_url: Url,
    token_url: Url,
    client_id: String,
    client_secret: String,
    scope: String,
    page_size: u32,
    retry: RetryPolicy,
    token: Mutex<Option<CachedToken>>,
}

impl CommerceClient {
    /// Creates a client from settings.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CommerceError::InvalidBaseUrl`] if either
    /// URL does not parse.
    pub fn new(settings: &CommerceSettings) -> Result<Self, CommerceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("orderfeed/0.1 (line-item-details)")
            .build()?;

        let api_url = normalise_base_url(&settings.api_url)?;
        let auth_base = normalise_base_url(&settings.auth_url)?;
        let token_url = auth_base
            .join("oauth/token")
            .map_err(|e| CommerceError::InvalidBaseUrl {
                url: settings.auth_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_url,
            token_url,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            scope: settings.scope.clone(),
            page_size: settings.page_size.clamp(1, 100),
            retry: RetryPolicy::new(settings.max_retries, settings.backoff_base_ms),
            token: Mutex::new(None),
        })
    }

    /// Fetches the worksheet (order, line items, calculate response) of an order.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] if the order does not exist.
    /// - [`CommerceError::Auth`] if no token can be obtained.
    /// - [`CommerceError::Unauthorized`] if a freshly issued token is rejected too.
    /// - [`CommerceError::Http`] / [`CommerceError::UnexpectedStatus`] on transport failures.
    /// - [`CommerceError::Deserialize`] if the body does not match the expected shape.
    pub async fn get_worksheet(
        &self,
        direction: OrderDirection,
        order_id: &str,
    ) -> Result<OrderWorksheet, CommerceError> {
        let url = self.build_url(&["orders", direction.as_path(), order_id, "worksheet"], &[])?;
        self.get_json(&url, &format!("worksheet for order {order_id}"))
            .await
    }

    /// Lists every line item of an order, walking all pages.
    ///
    /// # Errors
    ///
    /// Same as [`CommerceClient::get_worksheet`], plus
    /// [`CommerceError::PaginationLimit`] on runaway listings.
    pub async fn list_all_line_items(
        &self,
        direction: OrderDirection,
        order_id: &str,
    ) -> Result<Vec<LineItem>, CommerceError> {
        self.list_all(
            &["orders", direction.as_path(), order_id, "lineitems"],
            &[],
            &format!("line items of order {order_id}"),
        )
        .await
    }

    /// Lists every order in `direction` matching the given filters.
    ///
    /// Filters are passed as query parameters, e.g. `("ID", "SO-1-*")`.
    ///
    /// # Errors
    ///
    /// Same as [`CommerceClient::list_all_line_items`].
    pub async fn list_all_orders(
        &self,
        direction: OrderDirection,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Order>, CommerceError> {
        self.list_all(
            &["orders", direction.as_path()],
            filters,
            &format!("{direction} orders"),
        )
        .await
    }

    /// Fetches a buyer organization.
    ///
    /// # Errors
    ///
    /// Same as [`CommerceClient::get_worksheet`].
    pub async fn get_buyer(&self, buyer_id: &str) -> Result<Buyer, CommerceError> {
        let url = self.build_url(&["buyers", buyer_id], &[])?;
        self.get_json(&url, &format!("buyer {buyer_id}")).await
    }

    /// Fetches a supplier organization.
    ///
    /// # Errors
    ///
    /// Same as [`CommerceClient::get_worksheet`].
    pub async fn get_supplier(&self, supplier_id: &str) -> Result<Supplier, CommerceError> {
        let url = self.build_url(&["suppliers", supplier_id], &[])?;
        self.get_json(&url, &format!("supplier {supplier_id}"))
            .await
    }

    /// Walks `page = 1..=TotalPages` sequentially and concatenates the items.
    async fn list_all<T>(
        &self,
        segments: &[&str],
        filters: &[(&str, &str)],
        resource: &str,
    ) -> Result<Vec<T>, CommerceError>
    where
        T: DeserializeOwned + Send,
    {
        let page_size = self.page_size.to_string();
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            if page as usize > MAX_PAGES {
                return Err(CommerceError::PaginationLimit {
                    resource: resource.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let page_str = page.to_string();
            let mut query: Vec<(&str, &str)> =
                vec![("page", page_str.as_str()), ("pageSize", page_size.as_str())];
            query.extend_from_slice(filters);

            let url = self.build_url(segments, &query)?;
            let list: ListPage<T> = self.get_json(&url, resource).await?;
            let fetched = list.items.len();
            items.extend(list.items);

            tracing::debug!(
                resource,
                page,
                total_pages = list.meta.total_pages,
                fetched,
                "fetched list page"
            );

            if fetched == 0 || page >= list.meta.total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Builds `{api_url}/v1/{segments...}?{query}` with every segment and
    /// query value percent-encoded.
    fn build_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, CommerceError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| CommerceError::InvalidBaseUrl {
                url: self.api_url.to_string(),
                reason: "URL cannot be a base".to_owned(),
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        resource: &str,
    ) -> Result<T, CommerceError> {
        self.retry
            .run(resource, || self.get_json_once(url, resource))
            .await
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: &Url,
        resource: &str,
    ) -> Result<T, CommerceError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CommerceError::NotFound {
                resource: resource.to_owned(),
            });
        }
        if status == StatusCode::UNAUTHORIZED {
            self.clear_token().await;
            return Err(CommerceError::Unauthorized {
                resource: resource.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(CommerceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CommerceError::Deserialize {
            context: resource.to_owned(),
            source: e,
        })
    }

    /// Returns a cached bearer token, requesting a new one when absent or stale.
    async fn access_token(&self) -> Result<String, CommerceError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn clear_token(&self) {
        *self.token.lock().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken, CommerceError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
        ];
        let response = self
            .client
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CommerceError::Auth(format!(
                "token endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| CommerceError::Deserialize {
                context: "token response".to_owned(),
                source: e,
            })?;

        tracing::debug!(expires_in = token.expires_in, "obtained commerce API token");

        let lifetime = token
            .expires_in
            .min(MAX_TOKEN_LIFETIME_SECS)
            .saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(lifetime))
            .ok_or_else(|| {
                CommerceError::Auth(format!("token lifetime of {lifetime}s is out of range"))
            })?;
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

/// Ensures the base URL ends with exactly one slash.
fn normalise_base_url(raw: &str) -> Result<Url, CommerceError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| CommerceError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
