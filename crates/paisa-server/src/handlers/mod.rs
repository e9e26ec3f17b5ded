//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analytics;
pub mod bills;
pub mod categories;
pub mod health;
pub mod parse;
pub mod transactions;
pub mod upi;

// Re-export all handlers for use in router
pub use analytics::*;
pub use bills::*;
pub use categories::*;
pub use health::*;
pub use parse::*;
pub use transactions::*;
pub use upi::*;
