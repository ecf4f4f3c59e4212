//! API request handlers.

mod analyze;
mod info;

pub use analyze::*;
pub use info::*;
