use crate::Transaction;

/// Sum the signed amounts of `transactions`.
///
/// Income adds to the balance and expenses subtract from it. An empty slice
/// has a balance of zero.
pub fn calculate_balance(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(Transaction::signed_amount)
        .fold(0.0, |balance, amount| balance + amount)
}
