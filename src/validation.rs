//! Input validation for webhook requests.
//!
//! A topic name comes straight from the URL path, so it is checked before
//! anything is read from the body or sent to the broker:
//!
//! - The path is percent-decoded (it must decode to UTF-8)
//! - Leading and trailing `/` are stripped
//! - What remains must be a single, non-empty path segment
//! - It must not collide with an operational endpoint name

use percent_encoding::percent_decode_str;

use crate::error::{AppError, AppResult};

// =============================================================================
// Validation Constants
// =============================================================================

/// Path names served by operational endpoints; never usable as topics.
pub const RESERVED_TOPICS: [&str; 3] = ["health", "ready", "metrics"];

/// Separator between URL path segments.
const PATH_SEPARATOR: char = '/';

/// Derive the destination topic from a raw request path.
///
/// Decoding happens before the segment check, so `/a%2Fb` is two segments
/// and `/%68ealth` is the reserved `health`.
///
/// # Examples
///
/// ```rust
/// use kahook::validation::derive_topic;
///
/// assert_eq!(derive_topic("/my-topic").unwrap(), "my-topic");
/// assert_eq!(derive_topic("/my.nested.topic/").unwrap(), "my.nested.topic");
/// assert!(derive_topic("/").is_err());
/// assert!(derive_topic("/a/b").is_err());
/// assert!(derive_topic("/metrics").is_err());
/// assert_eq!(derive_topic("/my%20topic").unwrap(), "my topic");
/// ```
pub fn derive_topic(path: &str) -> AppResult<String> {
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| AppError::InvalidTopic(path.to_string()))?;
    let topic = decoded.trim_matches(PATH_SEPARATOR);

    if topic.is_empty() || topic.contains(PATH_SEPARATOR) {
        return Err(AppError::InvalidTopic(path.to_string()));
    }

    if is_reserved_topic(topic) {
        return Err(AppError::ReservedTopic(topic.to_string()));
    }

    Ok(topic.to_owned())
}

/// Whether `name` is one of the operational endpoint names.
pub fn is_reserved_topic(name: &str) -> bool {
    RESERVED_TOPICS.contains(&name)
}
