//! The balance of an owner, derived from their transactions on every request.

mod core;
mod endpoint;

pub use endpoint::get_balance_endpoint;

#[cfg(test)]
pub use core::calculate_balance;
