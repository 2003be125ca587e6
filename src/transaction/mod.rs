//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and deleting transactions
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod form;
mod list_endpoint;
mod query;

pub use core::{Transaction, TransactionKind, create_transaction, create_transaction_table};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use form::AmountPolicy;
pub use list_endpoint::list_transactions_endpoint;
pub use query::{SortOrder, TransactionQuery, query_transactions};

#[cfg(test)]
pub use core::{delete_transaction, get_transaction};
