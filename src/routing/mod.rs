//! Routing module
//!
//! Resolves request paths against a fixed, ordered rule table:
//! - Exact special paths (`/`, `/health`)
//! - Legacy alias rewrites
//! - Permanent external redirects
//! - Asset store lookup

mod resolver;
mod rules;

pub use resolver::{resolve, Resolution};
pub use rules::{PathRule, RuleAction, PATH_RULES};
