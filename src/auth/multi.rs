//! Scheme auto-detecting authenticator.

use axum::http::HeaderMap;
use tracing::debug;

use super::{AllowAll, Authenticate, BasicAuth, BearerAuth, authorization};

/// Dispatches to Basic or Bearer based on the request's declared scheme.
///
/// Either sub-strategy is absent when no matching credentials were
/// configured. With neither present every request is allowed, exactly like
/// [`AllowAll`].
///
/// # Example
///
/// ```rust
/// use kahook::auth::{Authenticate, MultiAuth};
/// use axum::http::HeaderMap;
///
/// let open = MultiAuth::new(Vec::<(String, String)>::new(), Vec::<String>::new());
/// assert!(!open.has_auth());
/// assert!(open.authenticate(&HeaderMap::new()));
///
/// let locked = MultiAuth::new([("admin", "secret")], Vec::<String>::new());
/// assert!(locked.has_auth());
/// assert!(!locked.authenticate(&HeaderMap::new()));
/// ```
#[derive(Debug, Clone)]
pub struct MultiAuth {
    basic: Option<BasicAuth>,
    bearer: Option<BearerAuth>,
}

impl MultiAuth {
    /// Build from whatever users and tokens are configured.
    ///
    /// Empty inputs leave the corresponding scheme disabled.
    pub fn new<U, N, P, T, K>(users: U, tokens: T) -> Self
    where
        U: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<String>,
        T: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let basic = BasicAuth::new(users);
        let bearer = BearerAuth::new(tokens);

        Self {
            basic: (!basic.is_empty()).then_some(basic),
            bearer: (!bearer.is_empty()).then_some(bearer),
        }
    }

    /// True when at least one scheme has credentials configured.
    pub fn has_auth(&self) -> bool {
        self.basic.is_some() || self.bearer.is_some()
    }

    pub fn basic(&self) -> Option<&BasicAuth> {
        self.basic.as_ref()
    }

    pub fn bearer(&self) -> Option<&BearerAuth> {
        self.bearer.as_ref()
    }
}

impl Authenticate for MultiAuth {
    fn authenticate(&self, headers: &HeaderMap) -> bool {
        if !self.has_auth() {
            return AllowAll.authenticate(headers);
        }

        let Some((scheme, _)) = authorization(headers).and_then(|v| v.split_once(' ')) else {
            debug!("Missing or malformed Authorization header");
            return false;
        };

        if scheme.eq_ignore_ascii_case("basic") {
            self.basic.as_ref().is_some_and(|b| b.authenticate(headers))
        } else if scheme.eq_ignore_ascii_case("bearer") {
            self.bearer.as_ref().is_some_and(|b| b.authenticate(headers))
        } else {
            debug!(scheme, "Unsupported authorization scheme");
            false
        }
    }
}
