use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    OwnerId,
    app_state::LedgerState,
    db::lock_connection,
    transaction::{SortOrder, TransactionQuery, query_transactions},
};

use super::aggregation::build_report;

/// A route handler that responds with the caller's report.
///
/// Transactions are aggregated oldest first so the monthly series is chronological.
pub async fn get_report_endpoint(
    State(state): State<LedgerState>,
    Extension(owner_id): Extension<OwnerId>,
) -> Response {
    let query = TransactionQuery {
        sort_date: Some(SortOrder::Ascending),
        ..Default::default()
    };

    let transactions = match lock_connection(&state.db_connection)
        .and_then(|connection| query_transactions(owner_id, query, &connection))
    {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    Json(build_report(&transactions)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints,
        report::Report,
        test_utils::{get_test_server, sign_up_and_log_in},
    };

    #[tokio::test]
    async fn report_for_recorded_transactions() {
        let server = get_test_server();
        let (_, cookie) = sign_up_and_log_in(&server, "alice@example.com").await;
        for body in [
            json!({"amount": 100, "type": "income", "category": "Salary", "date": "2024-01-15"}),
            json!({"amount": 30, "type": "expense", "category": "Food", "date": "2024-01-20"}),
            json!({"amount": 50, "type": "income", "category": "Gift", "date": "2024-02-01"}),
        ] {
            server
                .post(endpoints::TRANSACTIONS)
                .add_cookie(cookie.clone())
                .json(&body)
                .await
                .assert_status_ok();
        }

        let response = server.get(endpoints::REPORTS).add_cookie(cookie.clone()).await;

        response.assert_status_ok();
        let report = response.json::<Report>();
        let balance = server
            .get(endpoints::BALANCE)
            .add_cookie(cookie)
            .await
            .json::<serde_json::Value>();

        assert_eq!(report.summary.total_income, 150.0);
        assert_eq!(report.summary.total_expense, 30.0);
        assert_eq!(report.summary.net_balance, 120.0);
        assert_eq!(balance["balance"], report.summary.net_balance);

        // The seed transaction from sign up is dated today, after the recorded months.
        let months: Vec<&str> = report.monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(&months[..2], &["1/2024", "2/2024"]);
        assert_eq!(report.monthly[0].income, 100.0);
        assert_eq!(report.monthly[0].expense, 30.0);
        assert_eq!(report.monthly[1].income, 50.0);
        assert_eq!(report.monthly[1].expense, 0.0);

        let expense_categories: Vec<(&str, f64)> = report
            .expense_categories
            .iter()
            .map(|c| (c.name.as_str(), c.value))
            .collect();
        assert_eq!(expense_categories, vec![("Food", 30.0)]);

        let income_categories: Vec<(&str, f64)> = report
            .income_categories
            .iter()
            .map(|c| (c.name.as_str(), c.value))
            .collect();
        assert_eq!(
            income_categories,
            vec![("Salary", 100.0), ("Gift", 50.0), ("Initial Balance", 0.0)]
        );
    }

    #[tokio::test]
    async fn unauthenticated_request_is_rejected() {
        let server = get_test_server();

        server
            .get(endpoints::REPORTS)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
