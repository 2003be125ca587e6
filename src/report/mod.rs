//! Reports over an owner's transactions: a monthly series, category breakdowns and a summary.

mod aggregation;
mod endpoint;

pub use endpoint::get_report_endpoint;

#[cfg(test)]
pub use aggregation::Report;
