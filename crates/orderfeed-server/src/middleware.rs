use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, RETRY_AFTER},
        HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::ApiError;

pub const API_KEYS_VAR: &str = "ORDERFEED_API_KEYS";

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Accepted bearer tokens for the protected routes; `None` leaves them open.
#[derive(Debug, Clone)]
pub struct AuthState {
    keys: Option<Arc<[String]>>,
}

impl AuthState {
    /// Reads comma-separated tokens from `ORDERFEED_API_KEYS`.
    ///
    /// # Errors
    ///
    /// Fails outside development when no keys are configured.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        Self::from_keys(
            &std::env::var(API_KEYS_VAR).unwrap_or_default(),
            is_development,
        )
    }

    /// Parses a comma-separated token list. An empty list leaves the routes
    /// open in development and is an error everywhere else.
    ///
    /// # Errors
    ///
    /// Fails when `raw` holds no tokens and `is_development` is false.
    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let keys: BTreeSet<&str> = raw.split(',').map(str::trim).filter(|k| !k.is_empty()).collect();

        match (keys.is_empty(), is_development) {
            (false, _) => Ok(Self {
                keys: Some(keys.into_iter().map(str::to_owned).collect()),
            }),
            (true, true) => {
                tracing::warn!("{API_KEYS_VAR} is empty; protected routes are open in development");
                Ok(Self { keys: None })
            }
            (true, false) => Err(anyhow::anyhow!(
                "{API_KEYS_VAR} must list at least one bearer token outside development"
            )),
        }
    }

    #[must_use]
    pub fn is_enforced(&self) -> bool {
        self.keys.is_some()
    }

    /// Constant-time match against every key, with no early exit.
    fn accepts(&self, token: &str) -> bool {
        let Some(keys) = self.keys.as_deref() else {
            return true;
        };
        keys.iter()
            .map(|key| key.as_bytes().ct_eq(token.as_bytes()))
            .fold(subtle::Choice::from(0), |acc, hit| acc | hit)
            .into()
    }
}

/// Per-caller token buckets in front of the protected routes. Each bearer
/// token (or `anonymous` when auth is off) gets `burst` requests, refilled
/// evenly over `period`.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    burst: f64,
    refill_per_sec: f64,
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl Bucket {
    /// Takes one token, or returns how long until one is available.
    fn take(&mut self, now: Instant, burst: f64, refill_per_sec: f64) -> Result<(), Duration> {
        let elapsed = now.saturating_duration_since(self.refilled_at).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_per_sec).min(burst);
        self.refilled_at = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / refill_per_sec))
        }
    }
}

impl RateLimitState {
    #[must_use]
    pub fn new(burst: u32, period: Duration) -> Self {
        let burst = f64::from(burst.max(1));
        let period = period.max(Duration::from_millis(1)).as_secs_f64();
        Self {
            burst,
            refill_per_sec: burst / period,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn check(&self, caller: &str, now: Instant) -> Result<(), Duration> {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        buckets
            .entry(caller.to_owned())
            .or_insert(Bucket {
                tokens: self.burst,
                refilled_at: now,
            })
            .take(now, self.burst, self.refill_per_sec)
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Caller-supplied ids are kept only when short and printable.
fn acceptable_request_id(raw: &str) -> bool {
    !raw.is_empty() && raw.len() <= MAX_REQUEST_ID_LEN && raw.bytes().all(|b| b.is_ascii_graphic())
}

/// Tags the request with a [`RequestId`] (the caller's `x-request-id` when
/// acceptable, a fresh UUID otherwise), runs the rest of the stack inside a
/// span carrying it and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| acceptable_request_id(v))
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let span = tracing::info_span!("request", request_id = %id);
    let mut res = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    let accepted = !auth.is_enforced()
        || bearer_token(req.headers().get(AUTHORIZATION)).is_some_and(|t| auth.accepts(t));
    if accepted {
        return next.run(req).await;
    }

    tracing::debug!(path = %req.uri().path(), "rejected request without a valid bearer token");
    ApiError::new(
        request_id_of(&req),
        "unauthorized",
        "missing or invalid bearer token",
    )
    .into_response()
}

/// Runs after auth, so buckets are only created for accepted tokens.
pub async fn enforce_rate_limit(
    State(limits): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let caller = bearer_token(req.headers().get(AUTHORIZATION)).unwrap_or("anonymous");

    match limits.check(caller, Instant::now()) {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            let retry_after = wait.as_secs().saturating_add(1);
            tracing::warn!(retry_after, "rate limit exceeded");
            let mut res = ApiError::new(
                request_id_of(&req),
                "rate_limited",
                format!("rate limit exceeded; retry in {retry_after}s"),
            )
            .into_response();
            res.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            res
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header. The scheme is
/// matched case-insensitively.
fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    let (scheme, token) = value?.to_str().ok()?.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        for raw in ["Bearer tok-1", "bearer tok-1", "BEARER   tok-1 "] {
            let header = HeaderValue::from_str(raw).unwrap();
            assert_eq!(bearer_token(Some(&header)), Some("tok-1"), "{raw}");
        }
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_ignored() {
        for raw in ["Basic abc123", "Bearer", "Bearer    ", "tok-1"] {
            let header = HeaderValue::from_str(raw).unwrap();
            assert_eq!(bearer_token(Some(&header)), None, "{raw}");
        }
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn request_ids_must_be_short_and_printable() {
        assert!(acceptable_request_id("req-health"));
        assert!(!acceptable_request_id(""));
        assert!(!acceptable_request_id("has space"));
        assert!(!acceptable_request_id(&"x".repeat(MAX_REQUEST_ID_LEN + 1)));
    }

    #[test]
    fn bucket_allows_burst_then_waits_for_refill() {
        let limits = RateLimitState::new(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limits.check("key-a", start).is_ok());
        assert!(limits.check("key-a", start).is_ok());
        let wait = limits.check("key-a", start).unwrap_err();
        assert!(wait > Duration::from_secs(4) && wait < Duration::from_secs(6));

        assert!(limits.check("key-a", start + Duration::from_secs(6)).is_ok());
    }

    #[test]
    fn callers_have_separate_buckets() {
        let limits = RateLimitState::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limits.check("key-a", now).is_ok());
        assert!(limits.check("key-a", now).is_err());
        assert!(limits.check("key-b", now).is_ok());
    }

    #[test]
    fn bucket_never_holds_more_than_burst() {
        let limits = RateLimitState::new(1, Duration::from_secs(1));
        let start = Instant::now();

        assert!(limits.check("key-a", start).is_ok());
        let later = start + Duration::from_secs(3600);
        assert!(limits.check("key-a", later).is_ok());
        assert!(limits.check("key-a", later).is_err());
    }

    #[test]
    fn empty_key_list_opens_routes_only_in_development() {
        let open = AuthState::from_keys("", true).expect("development allows no keys");
        assert!(!open.is_enforced());
        assert!(open.accepts("anything"));

        assert!(AuthState::from_keys(" , ", false).is_err());
    }

    #[test]
    fn keys_are_trimmed_deduplicated_and_matched_exactly() {
        let auth = AuthState::from_keys(" key-a , key-b,key-a,", false).expect("keys parse");
        assert!(auth.is_enforced());
        assert_eq!(auth.keys.as_deref().map(<[String]>::len), Some(2));
        assert!(auth.accepts("key-a"));
        assert!(auth.accepts("key-b"));
        assert!(!auth.accepts("key-"));
        assert!(!auth.accepts("key-a "));
        assert!(!auth.accepts("key-c"));
    }
}
