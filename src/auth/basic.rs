//! HTTP Basic authentication against a fixed username → password map.

use std::collections::HashMap;

use axum::http::HeaderMap;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::matcher::constant_time_eq;
use super::{Authenticate, authorization};

/// Validates `Authorization: Basic <base64(user:pass)>` credentials.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    users: HashMap<String, String>,
}

impl BasicAuth {
    /// Build from any source of `(username, password)` pairs.
    ///
    /// The pairs are collected into a map owned by the strategy; later
    /// duplicates of the same username replace earlier ones.
    pub fn new<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }

    /// Number of configured users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Authenticate for BasicAuth {
    fn authenticate(&self, headers: &HeaderMap) -> bool {
        let Some((username, password)) = basic_credentials(headers) else {
            return false;
        };

        let Some(expected) = self.users.get(&username) else {
            return false;
        };

        constant_time_eq(password.as_bytes(), expected.as_bytes())
    }
}

/// Extract `(username, password)` from a Basic `Authorization` header.
///
/// The scheme keyword is matched case-insensitively and must be followed by
/// exactly one space. The decoded payload is split at the first `:`, so
/// passwords may contain colons. Returns `None` for anything malformed.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = authorization(headers)?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
