//! HTTP middleware.
//!
//! ```text
//! Request → Request ID → Deadline → Trace → Track → Body limit → Handler
//!               ↓            ↓                 ↓
//!        X-Request-ID   RequestDeadline   counters + log line
//! ```

pub mod deadline;
pub mod request_id;
pub mod track;

pub use deadline::{
    MAX_REQUEST_TIMEOUT_MS, MIN_REQUEST_TIMEOUT_MS, REQUEST_TIMEOUT_HEADER, RequestDeadline,
    stamp_deadline,
};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer};
pub use track::track_requests;
