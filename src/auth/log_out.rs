use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::auth::{cookie::invalidate_auth_cookie, middleware::AuthState};

/// Invalidate the auth cookie, ending the session.
pub async fn get_log_out(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    let jar = invalidate_auth_cookie(jar, state.secure_cookies);

    (jar, Json(json!({ "message": "Logged out" })))
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::StatusCode;
    use time::Duration;

    use crate::{
        auth::cookie::COOKIE_TOKEN,
        endpoints,
        test_utils::{get_test_server, sign_up_and_log_in},
    };

    #[tokio::test]
    async fn log_out_expires_cookie() {
        let server = get_test_server();
        let (_, cookie) = sign_up_and_log_in(&server, "alice@example.com").await;

        let response = server.get(endpoints::LOG_OUT).add_cookie(cookie).await;

        response.assert_status_ok();
        let expired = response.cookie(COOKIE_TOKEN);
        assert_eq!(expired.max_age(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn expired_cookie_no_longer_authorizes() {
        let server = get_test_server();
        sign_up_and_log_in(&server, "alice@example.com").await;

        let log_out = server.get(endpoints::LOG_OUT).await;
        let cookie = log_out.cookie(COOKIE_TOKEN);

        server
            .get(endpoints::BALANCE)
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
