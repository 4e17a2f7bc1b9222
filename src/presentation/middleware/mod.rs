//! Middleware
//!
//! Tower middleware for request processing.

pub mod context;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod response;

pub use context::RequestContext;
pub use rate_limit::{
    add_rate_limit_headers,
    bucket_key,
    rate_limit_api,
    rate_limit_auth,
    AuthSubject,
    ClientKeyExtractor,
    KeyExtractor,
    RouteGroup,
};
pub use response::{handle_panic, response_pipeline};
