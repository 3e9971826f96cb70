//! Fixture catalog endpoints
//!
//! These return static data and keep no state between calls.

use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::market::catalog::{fixture_snipes, graduated_tokens, token_listings};
use crate::market::{ActiveSnipe, GraduatedToken, TokenListing};

use super::{ApiError, ApiResult};

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub tokens: Vec<TokenListing>,
}

#[derive(Debug, Serialize)]
pub struct GraduatedResponse {
    pub graduated: Vec<GraduatedToken>,
}

#[derive(Debug, Serialize)]
pub struct SnipesResponse {
    pub snipes: Vec<ActiveSnipe>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenSubmission {
    pub ticker: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnipeRequest {
    #[serde(rename = "type")]
    pub snipe_type: Option<String>,
    pub ticker: Option<String>,
    pub account_handle: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnipeResponse {
    pub success: bool,
    pub message: String,
    pub snipe_id: String,
}

pub async fn list_tokens() -> Json<TokensResponse> {
    Json(TokensResponse {
        tokens: token_listings(),
    })
}

pub async fn submit_token(Json(body): Json<TokenSubmission>) -> ApiResult<SubmitResponse> {
    let (Some(ticker), Some(name)) = (present(body.ticker), present(body.name)) else {
        return Err(ApiError::bad_request("Ticker and name are required"));
    };

    info!("Token submitted for tracking: {} ({})", name, ticker);
    Ok(Json(SubmitResponse {
        success: true,
        message: format!("Now tracking {} ({})", name, ticker),
    }))
}

pub async fn list_graduated() -> Json<GraduatedResponse> {
    Json(GraduatedResponse {
        graduated: graduated_tokens(),
    })
}

pub async fn list_snipes() -> Json<SnipesResponse> {
    Json(SnipesResponse {
        snipes: fixture_snipes(),
    })
}

pub async fn create_snipe(Json(body): Json<SnipeRequest>) -> ApiResult<SnipeResponse> {
    let message = match body.snipe_type.as_deref() {
        None | Some("") => return Err(ApiError::bad_request("Snipe type is required")),
        Some("ticker") => match present(body.ticker) {
            Some(ticker) => format!("Snipe set for {}", ticker),
            None => return Err(ApiError::bad_request("Ticker is required for ticker snipes")),
        },
        Some("account") => match present(body.account_handle) {
            Some(handle) => format!(
                "Now monitoring @{} for new token launches",
                handle.trim_start_matches('@')
            ),
            None => {
                return Err(ApiError::bad_request(
                    "Account handle is required for account snipes",
                ))
            }
        },
        Some(other) => {
            return Err(ApiError::bad_request(format!("Unknown snipe type: {}", other)))
        }
    };

    let snipe_id = Uuid::new_v4().to_string();
    info!("{} ({})", message, snipe_id);

    Ok(Json(SnipeResponse {
        success: true,
        message,
        snipe_id,
    }))
}

/// Treat empty strings like missing fields
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
