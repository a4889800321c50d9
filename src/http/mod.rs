//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{select_ranges, ByteSpan, RangeSelection};
pub use response::{
    apply_cors, build_304_response, build_412_response, build_416_response,
    build_health_response, build_multipart_response, build_options_response,
    build_redirect_response, build_redirect_response_with_code,
};
