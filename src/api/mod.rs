//! HTTP API
//!
//! Fixture catalog endpoints plus the dashboard session routes.

pub mod catalog;
pub mod dashboard;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;

use crate::dashboard::DashboardSession;
use crate::error::Error;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<DashboardSession>,
}

impl AppState {
    pub fn new(session: Arc<DashboardSession>) -> Self {
        Self { session }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tokens", get(catalog::list_tokens).post(catalog::submit_token))
        .route("/api/graduated", get(catalog::list_graduated))
        .route("/api/sniper", get(catalog::list_snipes).post(catalog::create_snipe))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/dashboard/tab", post(dashboard::set_active_tab))
        .route("/api/dashboard/monitor", post(dashboard::enable_monitoring))
        .route("/api/dashboard/snipe", post(dashboard::set_direct_snipe))
        .route("/api/dashboard/catalog/snipe", post(dashboard::snipe_from_catalog))
        .route("/api/dashboard/snipes/:id", delete(dashboard::cancel_snipe))
        .route("/api/dashboard/positions/:id/sell", post(dashboard::sell_position))
        .route(
            "/api/wallet/sniper",
            get(dashboard::get_sniper_wallet).post(dashboard::generate_sniper_wallet),
        )
        .route("/api/wallet/sniper/deposit", post(dashboard::deposit))
        .route("/api/wallet/sniper/withdraw", post(dashboard::withdraw))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

/// Failure response: `{success: false, message}` with a status derived from the error
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = if error.is_user_error() {
            StatusCode::BAD_REQUEST
        } else if error.is_transaction_error() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "success": false,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

pub type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::from(Error::InvalidAmount).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(Error::NotConnected).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(Error::DepositFailed("timeout".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(Error::Storage("disk full".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_message_is_display() {
        let err = ApiError::from(Error::NotConnected);
        assert_eq!(err.message(), "Please connect your wallet first");
    }
}
