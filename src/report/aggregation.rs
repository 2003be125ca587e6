//! Aggregation of transactions into the monthly series, category breakdowns and summary.
//!
//! All aggregates keep the order in which their keys are first seen in the
//! input. Callers that want a chronological monthly series must pass the
//! transactions sorted by date.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Transaction, TransactionKind};

/// The income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// The month as "{month}/{year}" without zero padding, e.g. "1/2024".
    pub month: String,
    /// The summed magnitude of income in the month.
    pub income: f64,
    /// The summed magnitude of expenses in the month.
    pub expense: f64,
}

/// The summed magnitude of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category label.
    pub name: String,
    /// The summed magnitude of the transactions in the category.
    pub value: f64,
}

/// Category totals split by transaction kind.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryBreakdown {
    /// Expense categories in first-seen order.
    pub expense: Vec<CategoryTotal>,
    /// Income categories in first-seen order.
    pub income: Vec<CategoryTotal>,
}

/// Totals over a set of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The summed magnitude of all income.
    pub total_income: f64,
    /// The summed magnitude of all expenses.
    pub total_expense: f64,
    /// Income minus expenses.
    pub net_balance: f64,
}

/// Everything shown on the report page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Totals over all transactions.
    pub summary: Summary,
    /// Income and expense per month.
    pub monthly: Vec<MonthlyTotal>,
    /// Expense totals per category.
    pub expense_categories: Vec<CategoryTotal>,
    /// Income totals per category.
    pub income_categories: Vec<CategoryTotal>,
}

/// The key used to group transactions by month, e.g. "1/2024".
pub fn month_key(date: Date) -> String {
    format!("{}/{}", u8::from(date.month()), date.year())
}

/// Sum income and expenses per month in first-seen order.
pub fn monthly_series(transactions: &[Transaction]) -> Vec<MonthlyTotal> {
    let mut series: Vec<MonthlyTotal> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for transaction in transactions {
        let key = month_key(transaction.date);
        let position = *positions.entry(key.clone()).or_insert_with(|| {
            series.push(MonthlyTotal {
                month: key,
                income: 0.0,
                expense: 0.0,
            });
            series.len() - 1
        });

        let total = &mut series[position];
        match transaction.kind {
            TransactionKind::Income => total.income += transaction.amount,
            TransactionKind::Expense => total.expense += transaction.amount,
        }
    }

    series
}

/// Sum magnitudes per category, separately for expenses and income.
pub fn category_breakdown(transactions: &[Transaction]) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::default();
    let mut positions: HashMap<(TransactionKind, &str), usize> = HashMap::new();

    for transaction in transactions {
        let totals = match transaction.kind {
            TransactionKind::Expense => &mut breakdown.expense,
            TransactionKind::Income => &mut breakdown.income,
        };

        let position = *positions
            .entry((transaction.kind, transaction.category.as_str()))
            .or_insert_with(|| {
                totals.push(CategoryTotal {
                    name: transaction.category.clone(),
                    value: 0.0,
                });
                totals.len() - 1
            });

        totals[position].value += transaction.amount;
    }

    breakdown
}

/// Compute total income, total expenses and the net balance.
///
/// The net balance accumulates the signed amounts in input order, the same
/// way the balance does, so both agree for the same input.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary {
        total_income: 0.0,
        total_expense: 0.0,
        net_balance: 0.0,
    };

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => summary.total_income += transaction.amount,
            TransactionKind::Expense => summary.total_expense += transaction.amount,
        }

        summary.net_balance += transaction.signed_amount();
    }

    summary
}

/// Build the full report for `transactions`.
pub fn build_report(transactions: &[Transaction]) -> Report {
    let CategoryBreakdown { expense, income } = category_breakdown(transactions);

    Report {
        summary: summarize(transactions),
        monthly: monthly_series(transactions),
        expense_categories: expense,
        income_categories: income,
    }
}
