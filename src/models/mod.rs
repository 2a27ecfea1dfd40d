mod api;

pub use api::{AcceptedResponse, MetricsResponse, StatusResponse};
