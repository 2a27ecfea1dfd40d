//! Pluggable request authentication.
//!
//! # Strategies
//!
//! - [`AllowAll`]: accepts every request (no credentials configured)
//! - [`BasicAuth`]: `Authorization: Basic <base64(user:pass)>`
//! - [`BearerAuth`]: `Authorization: Bearer <token>`
//! - [`MultiAuth`]: picks Basic or Bearer from the declared scheme
//!
//! All strategies look at headers only, never mutate the request, and treat
//! missing or malformed credentials as a plain `false`. Every secret
//! comparison goes through [`matcher::constant_time_eq`].
//!
//! # Challenges
//!
//! A rejected request gets a `WWW-Authenticate` challenge chosen by
//! [`Challenge::for_headers`]: `Bearer` when the caller declared the bearer
//! scheme, `Basic` otherwise.

mod basic;
mod bearer;
pub mod matcher;
mod multi;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

pub use basic::{BasicAuth, basic_credentials};
pub use bearer::{BearerAuth, bearer_token};
pub use multi::MultiAuth;

/// Realm advertised in `WWW-Authenticate` challenges.
pub const REALM: &str = "kahook";

/// The single capability every strategy implements.
pub trait Authenticate: Send + Sync {
    /// Decide whether the request carrying `headers` is allowed.
    fn authenticate(&self, headers: &HeaderMap) -> bool;
}

/// Accepts every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authenticate for AllowAll {
    fn authenticate(&self, _headers: &HeaderMap) -> bool {
        true
    }
}

/// Challenge scheme sent back with a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    Basic,
    Bearer,
}

impl Challenge {
    /// Pick the challenge for a rejected request.
    ///
    /// Only the first space-separated token of `Authorization` is inspected:
    /// a declared `bearer` scheme gets a Bearer challenge; a missing header,
    /// `basic`, or any unrecognised scheme gets Basic.
    ///
    /// The scheme is read from the raw header bytes, so a bearer header whose
    /// token is not visible ASCII still gets a Bearer challenge.
    pub fn for_headers(headers: &HeaderMap) -> Self {
        let scheme = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.as_bytes().split(|b| *b == b' ').next())
            .unwrap_or_default();

        if scheme.eq_ignore_ascii_case(b"bearer") {
            Challenge::Bearer
        } else {
            Challenge::Basic
        }
    }

    /// The full `WWW-Authenticate` header value.
    pub fn header_value(self) -> &'static str {
        match self {
            Challenge::Basic => r#"Basic realm="kahook""#,
            Challenge::Bearer => r#"Bearer realm="kahook""#,
        }
    }
}

/// The first `Authorization` header value, if present and valid visible ASCII.
fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn header(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_allow_all() {
        assert!(AllowAll.authenticate(&HeaderMap::new()));
        assert!(AllowAll.authenticate(&header("Bearer nope")));
    }

    #[test]
    fn test_challenge_selection() {
        assert_eq!(Challenge::for_headers(&HeaderMap::new()), Challenge::Basic);
        assert_eq!(Challenge::for_headers(&header("Basic abc")), Challenge::Basic);
        assert_eq!(Challenge::for_headers(&header("Bearer abc")), Challenge::Bearer);
        assert_eq!(Challenge::for_headers(&header("BEARER abc")), Challenge::Bearer);
        assert_eq!(Challenge::for_headers(&header("Bearer")), Challenge::Bearer);
        assert_eq!(Challenge::for_headers(&header("Bearertoken")), Challenge::Basic);
        assert_eq!(Challenge::for_headers(&header("Digest x")), Challenge::Basic);
    }

    #[test]
    fn test_challenge_for_opaque_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xfftok").unwrap());
        assert_eq!(Challenge::for_headers(&headers), Challenge::Bearer);

        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Basic \xff").unwrap());
        assert_eq!(Challenge::for_headers(&headers), Challenge::Basic);
    }

    #[test]
    fn test_challenge_header_values() {
        assert_eq!(Challenge::Basic.header_value(), format!("Basic realm=\"{REALM}\""));
        assert_eq!(Challenge::Bearer.header_value(), format!("Bearer realm=\"{REALM}\""));
    }
}
