//! Bearer token authentication against a fixed token list.

use axum::http::HeaderMap;
use subtle::Choice;

use super::matcher::ct_eq_choice;
use super::{Authenticate, authorization};

/// Validates `Authorization: Bearer <token>` against every configured token.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    tokens: Vec<String>,
}

impl BearerAuth {
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of configured tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check a presented token against the whole list.
    ///
    /// Every configured token is compared and the results are OR-ed together,
    /// so the running time does not reveal which token (if any) matched.
    pub fn matches(&self, presented: &[u8]) -> bool {
        let mut matched = Choice::from(0);
        for token in &self.tokens {
            matched |= ct_eq_choice(presented, token.as_bytes());
        }
        matched.into()
    }
}

impl Authenticate for BearerAuth {
    fn authenticate(&self, headers: &HeaderMap) -> bool {
        bearer_token(headers).is_some_and(|token| self.matches(token.as_bytes()))
    }
}

/// Extract the token from a Bearer `Authorization` header.
///
/// The scheme is matched case-insensitively and must be separated from the
/// token by a single space; `Bearertoken` is rejected.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = authorization(headers)?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}
