//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Config loading, opening the ledger, init and status
//! - `users` - User onboarding and lookup
//! - `expenses` - Recording expenses
//! - `reports` - Period reports
//! - `dimensions` - Category and currency listings

pub mod core;
pub mod dimensions;
pub mod expenses;
pub mod reports;
pub mod users;

// Re-export command functions for main.rs
pub use self::core::*;
pub use dimensions::*;
pub use expenses::*;
pub use reports::*;
pub use users::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
