//! Session state shared by the transport and the facade.
//!
//! [`SessionStore`] owns the cookie jar and the response cache. It is a
//! cheap-to-clone handle: clones share the same state, so the handle given
//! to [`crate::ODataClientBuilder::session`] is the one cleared by
//! [`crate::ODataClient::logout`].
//!
//! Cookies are keyed by host; `Secure` cookies are only sent over https.
//! The response cache keeps at most [`DEFAULT_CACHE_CAPACITY`] entries unless
//! configured otherwise, evicting the oldest stored response first.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sapodata_core::Response;
use url::Url;

/// Cached responses kept by [`SessionStore::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug)]
struct SessionState {
    /// host -> cookie name -> cookie
    cookies: HashMap<String, BTreeMap<String, StoredCookie>>,
    /// url -> validated response
    cache: HashMap<String, CachedResponse>,
    cache_capacity: usize,
    /// insertion counter, orders cache entries for eviction
    stored: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            cookies: HashMap::new(),
            cache: HashMap::new(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            stored: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    secure: bool,
}

#[derive(Debug, Clone)]
struct CachedResponse {
    etag: String,
    response: Response,
    stored: u64,
}

/// A parsed `Set-Cookie` value.
#[derive(Debug, PartialEq, Eq)]
struct SetCookie<'a> {
    name: &'a str,
    value: &'a str,
    expired: bool,
    secure: bool,
}

/// Cookie jar and `ETag` response cache.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use bytes::Bytes;
/// use sapodata::SessionStore;
/// use sapodata_core::Response;
///
/// let session = SessionStore::new();
/// let url = "https://host/sap/opu/odata/sap/ZSRV/".parse().unwrap();
/// let response = Response::new(
///     200,
///     HashMap::from([("Set-Cookie".to_string(), "SAP_SESSIONID=abc; path=/".to_string())]),
///     Bytes::new(),
/// );
///
/// session.store_cookies(&url, &response);
/// assert_eq!(session.cookie_header(&url).as_deref(), Some("SAP_SESSIONID=abc"));
///
/// session.clear();
/// assert!(session.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    state: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    /// An empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty session keeping at most `capacity` cached responses.
    ///
    /// A capacity of zero disables the response cache.
    #[must_use]
    pub fn with_cache_capacity(capacity: usize) -> Self {
        let session = Self::default();
        session.lock().cache_capacity = capacity;
        session
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Cookies
    // ========================================================================

    /// Record every `Set-Cookie` of `response`, received from `url`.
    ///
    /// A cookie with `Max-Age=0` is removed and `Secure` is remembered; other
    /// attributes are ignored.
    pub fn store_cookies(&self, url: &Url, response: &Response) {
        let Some(host) = url.host_str() else {
            return;
        };

        let mut state = self.lock();
        for set_cookie in response.set_cookies() {
            let Some(cookie) = parse_set_cookie(set_cookie) else {
                continue;
            };
            let jar = state.cookies.entry(host.to_string()).or_default();
            if cookie.expired {
                jar.remove(cookie.name);
            } else {
                let stored = StoredCookie {
                    value: cookie.value.to_string(),
                    secure: cookie.secure,
                };
                jar.insert(cookie.name.to_string(), stored);
            }
        }
        state.cookies.retain(|_, jar| !jar.is_empty());
    }

    /// `Cookie` header value for a request to `url`.
    ///
    /// `Secure` cookies are left out unless `url` is https.
    #[must_use]
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?;
        let https = url.scheme() == "https";
        let state = self.lock();
        let pairs = state
            .cookies
            .get(host)?
            .iter()
            .filter(|(_, cookie)| https || !cookie.secure)
            .map(|(name, cookie)| format!("{name}={}", cookie.value))
            .collect::<Vec<_>>();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    /// Number of stored cookies, over every host.
    #[must_use]
    pub fn cookie_count(&self) -> usize {
        self.lock().cookies.values().map(BTreeMap::len).sum()
    }

    // ========================================================================
    // Response cache
    // ========================================================================

    /// Keep `response` for `url` if it is a 2xx carrying an `ETag`.
    ///
    /// When the cache is full the oldest stored response is evicted.
    pub fn store_response(&self, url: &Url, response: &Response) {
        if !response.is_success() {
            return;
        }
        let Some(etag) = response.header("etag") else {
            return;
        };

        let mut state = self.lock();
        if state.cache_capacity == 0 {
            return;
        }
        let key = url.to_string();
        if !state.cache.contains_key(&key) && state.cache.len() >= state.cache_capacity {
            let oldest = state
                .cache
                .iter()
                .min_by_key(|(_, cached)| cached.stored)
                .map(|(url, _)| url.clone());
            if let Some(oldest) = oldest {
                state.cache.remove(&oldest);
            }
        }

        state.stored += 1;
        let cached = CachedResponse {
            etag: etag.to_string(),
            response: response.clone(),
            stored: state.stored,
        };
        state.cache.insert(key, cached);
    }

    /// `ETag` of the cached response for `url`.
    #[must_use]
    pub fn etag(&self, url: &Url) -> Option<String> {
        self.lock()
            .cache
            .get(url.as_str())
            .map(|cached| cached.etag.clone())
    }

    /// The cached response for `url`.
    #[must_use]
    pub fn cached_response(&self, url: &Url) -> Option<Response> {
        self.lock()
            .cache
            .get(url.as_str())
            .map(|cached| cached.response.clone())
    }

    /// Number of cached responses.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.lock().cache.len()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Drop every cookie and every cached response.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.cookies.clear();
        state.cache.clear();
    }

    /// No cookie and no cached response.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let state = self.lock();
        state.cookies.is_empty() && state.cache.is_empty()
    }
}

/// `name=value; attr; attr`
fn parse_set_cookie(set_cookie: &str) -> Option<SetCookie<'_>> {
    let mut parts = set_cookie.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = SetCookie {
        name,
        value: value.trim(),
        expired: false,
        secure: false,
    };
    for attribute in parts {
        let (key, value) = attribute.split_once('=').unwrap_or((attribute, ""));
        let key = key.trim();
        if key.eq_ignore_ascii_case("max-age") && value.trim() == "0" {
            cookie.expired = true;
        } else if key.eq_ignore_ascii_case("secure") {
            cookie.secure = true;
        }
    }

    Some(cookie)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use bytes::Bytes;

    use super::*;

    fn url(value: &str) -> Url {
        value.parse().expect("url")
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> Response {
        let headers = headers
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        Response::new(status, headers, Bytes::from(body.to_string()))
    }

    #[test]
    fn parses_set_cookie() {
        let_assert!(Some(session) = parse_set_cookie("SAP_SESSIONID=abc; path=/; HttpOnly"));
        check!((session.name, session.value, session.expired, session.secure) == ("SAP_SESSIONID", "abc", false, false));

        let_assert!(Some(context) = parse_set_cookie("sap-usercontext=sap-client=100; path=/"));
        check!((context.name, context.value) == ("sap-usercontext", "sap-client=100"));

        let_assert!(Some(sso) = parse_set_cookie("MYSAPSSO2=t0k3n; path=/; secure; HttpOnly"));
        check!(sso.secure);

        let_assert!(Some(logoff) = parse_set_cookie("MYSAPSSO2=; Max-Age=0"));
        check!(logoff.expired);

        check!(parse_set_cookie("garbage").is_none());
        check!(parse_set_cookie("=value").is_none());
    }

    #[test]
    fn secure_cookies_stay_on_https() {
        let session = SessionStore::new();
        let https = url("https://sap.example.com/sap/opu/odata/");
        let http = url("http://sap.example.com/sap/opu/odata/");

        session.store_cookies(&https, &response(200, &[("set-cookie", "MYSAPSSO2=t0k3n; Secure\nsap-usercontext=sap-client=100")], ""));

        check!(session.cookie_header(&https).as_deref() == Some("MYSAPSSO2=t0k3n; sap-usercontext=sap-client=100"));
        check!(session.cookie_header(&http).as_deref() == Some("sap-usercontext=sap-client=100"));

        session.store_cookies(&https, &response(200, &[("set-cookie", "sap-usercontext=; Max-Age=0")], ""));
        check!(session.cookie_header(&http).is_none());
        check!(session.cookie_count() == 1);
    }

    #[test]
    fn cache_evicts_oldest_response() {
        let session = SessionStore::with_cache_capacity(2);
        let first = url("https://sap.example.com/ZSRV/Products('1')");
        let second = url("https://sap.example.com/ZSRV/Products('2')");
        let third = url("https://sap.example.com/ZSRV/Products('3')");

        session.store_response(&first, &response(200, &[("etag", "1")], "{}"));
        session.store_response(&second, &response(200, &[("etag", "2")], "{}"));
        session.store_response(&first, &response(200, &[("etag", "1b")], "{}"));
        session.store_response(&third, &response(200, &[("etag", "3")], "{}"));

        check!(session.cached_count() == 2);
        check!(session.etag(&second).is_none());
        check!(session.etag(&first).as_deref() == Some("1b"));
        check!(session.etag(&third).as_deref() == Some("3"));
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let session = SessionStore::with_cache_capacity(0);
        let products = url("https://sap.example.com/ZSRV/Products");

        session.store_response(&products, &response(200, &[("etag", "1")], "{}"));

        check!(session.cached_count() == 0);
    }

    #[test]
    fn cookies_are_scoped_by_host() {
        let session = SessionStore::new();
        let sap = url("https://sap.example.com/sap/opu/odata/");
        let other = url("https://other.example.com/");

        session.store_cookies(&sap, &response(200, &[("set-cookie", "b=2\na=1; Secure")], ""));

        check!(session.cookie_header(&sap).as_deref() == Some("a=1; b=2"));
        check!(session.cookie_header(&other).is_none());
        check!(session.cookie_count() == 2);
    }

    #[test]
    fn max_age_zero_removes_cookie() {
        let session = SessionStore::new();
        let sap = url("https://sap.example.com/");

        session.store_cookies(&sap, &response(200, &[("set-cookie", "a=1")], ""));
        session.store_cookies(&sap, &response(200, &[("set-cookie", "a=; max-age=0")], ""));

        check!(session.cookie_header(&sap).is_none());
        check!(session.is_empty());
    }

    #[test]
    fn caches_only_successful_responses_with_etag() {
        let session = SessionStore::new();
        let products = url("https://sap.example.com/ZSRV/Products");

        session.store_response(&products, &response(200, &[], "{}"));
        check!(session.cached_count() == 0);

        session.store_response(&products, &response(404, &[("etag", "W/\"1\"")], "{}"));
        check!(session.cached_count() == 0);

        session.store_response(&products, &response(200, &[("ETag", "W/\"2\"")], "{}"));
        check!(session.etag(&products).as_deref() == Some("W/\"2\""));
        let_assert!(Some(cached) = session.cached_response(&products));
        check!(cached.status() == 200);
    }

    #[test]
    fn clear_empties_everything() {
        let session = SessionStore::new();
        let shared = session.clone();
        let products = url("https://sap.example.com/ZSRV/Products");

        session.store_cookies(&products, &response(200, &[("set-cookie", "a=1")], ""));
        session.store_response(&products, &response(200, &[("etag", "1")], "{}"));
        check!(!shared.is_empty());

        shared.clear();

        check!(session.is_empty());
        check!(session.cookie_header(&products).is_none());
        check!(session.cached_response(&products).is_none());
    }
}
