//! Fuzz the Authorization parsers, the authenticator and topic derivation.
//!
//! None of these may panic on any input; malformed credentials are a plain
//! rejection.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_auth
//! cargo +nightly fuzz run fuzz_auth -- -max_total_time=60
//! ```

#![no_main]

use std::sync::LazyLock;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};
use kahook::auth::{Authenticate, Challenge, MultiAuth, basic_credentials, bearer_token};
use kahook::validation::derive_topic;
use libfuzzer_sys::fuzz_target;

static AUTH: LazyLock<MultiAuth> =
    LazyLock::new(|| MultiAuth::new([("admin", "secret")], ["token-1", "token-2"]));

fuzz_target!(|data: &[u8]| {
    if let Ok(path) = std::str::from_utf8(data) {
        let _ = derive_topic(path);
    }

    let Ok(value) = HeaderValue::from_bytes(data) else {
        return;
    };
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);

    let _ = basic_credentials(&headers);
    let _ = bearer_token(&headers);
    let _ = Challenge::for_headers(&headers);
    let _ = AUTH.authenticate(&headers);
});
