mod health;
pub mod webhook;

pub use health::{health, metrics, ready};
pub use webhook::ingest;
