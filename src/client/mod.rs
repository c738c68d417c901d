//! Client Module
//!
//! The HTTP collaborator every resource talks through.
//!
//! # Pieces
//! - `ApigeeApi` - the seam resources are generic over
//! - `ApigeeClient` - reqwest implementation against the management API
//! - `paths` - endpoint templates
//! - `retry` - bounded backoff for throttled/unavailable responses

mod http;
pub mod paths;
mod retry;

pub use http::{json_headers, ApigeeApi, ApigeeClient};
pub use retry::{retry, RetryConfig};

/// Content type for every JSON request body.
pub const APPLICATION_JSON: &str = "application/json";
