//! Request handler module
//!
//! Front door dispatch and response negotiation for bundled assets.

pub mod negotiate;
pub mod router;

// Re-export main entry point
pub use router::{handle_request, respond, RequestContext};
