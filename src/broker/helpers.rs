//! Helper functions for the Iggy publisher.

use iggy::prelude::Identifier;

use crate::error::AppError;

/// Convert a name to an Iggy `Identifier`, returning an appropriate error on failure.
///
/// Iggy identifiers must be 1-255 characters. The original SDK error is logged
/// at debug level; callers only see which name was rejected.
pub fn to_identifier(name: &str, resource_type: &str) -> Result<Identifier, AppError> {
    name.try_into().map_err(|e: iggy::prelude::IggyError| {
        tracing::debug!(
            resource_type,
            name,
            original_error = %e,
            "Identifier conversion failed"
        );
        AppError::TopicError(format!("Invalid {resource_type} name '{name}'"))
    })
}
