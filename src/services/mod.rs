//! Feature services: thin typed wrappers over the backend endpoints.
//!
//! Services never catch errors; callers decide what the user sees.

pub mod accounts;
pub mod ai;
pub mod fallback;
pub mod jobs;
pub mod profile;

pub use fallback::{FallbackPolicy, Sourced};
