//! Dashboard session routes

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dashboard::{Accepted, DashboardView};
use crate::market::{ActiveSnipe, DashboardTab, RealizedSale};
use crate::wallet::{SniperWallet, TransferAck};

use super::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct MonitorRequest {
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct DirectSnipeRequest {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogSnipeRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub tab: DashboardTab,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub amount: String,
}

/// `{success, message, data}` for a successful action
#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> From<Accepted<T>> for ActionResponse<T> {
    fn from(accepted: Accepted<T>) -> Self {
        Self {
            success: true,
            message: accepted.message,
            data: accepted.value,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnipeResponse {
    pub ticker_input: Option<String>,
}

/// Removal result; an unknown id is reported with `removed: null`
#[derive(Debug, Serialize)]
pub struct RemovalResponse<T> {
    pub success: bool,
    pub removed: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SniperWalletResponse {
    pub sniper_wallet: Option<SniperWallet>,
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.session.view().await)
}

pub async fn enable_monitoring(
    State(state): State<AppState>,
    Json(body): Json<MonitorRequest>,
) -> ApiResult<ActionResponse<ActiveSnipe>> {
    let accepted = state
        .session
        .enable_monitoring(&body.handle, &body.amount)
        .await?;
    Ok(Json(accepted.into()))
}

pub async fn set_direct_snipe(
    State(state): State<AppState>,
    Json(body): Json<DirectSnipeRequest>,
) -> ApiResult<ActionResponse<ActiveSnipe>> {
    let accepted = state
        .session
        .set_direct_snipe(&body.ticker, &body.amount)
        .await?;
    Ok(Json(accepted.into()))
}

pub async fn snipe_from_catalog(
    State(state): State<AppState>,
    Json(body): Json<CatalogSnipeRequest>,
) -> Json<CatalogSnipeResponse> {
    Json(CatalogSnipeResponse {
        ticker_input: state.session.snipe_from_catalog(&body.name).await,
    })
}

pub async fn set_active_tab(
    State(state): State<AppState>,
    Json(body): Json<TabRequest>,
) -> Json<DashboardView> {
    state.session.set_active_tab(body.tab).await;
    Json(state.session.view().await)
}

pub async fn cancel_snipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<RemovalResponse<ActiveSnipe>> {
    Json(RemovalResponse {
        success: true,
        removed: state.session.cancel_snipe(id).await,
    })
}

pub async fn sell_position(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<RemovalResponse<RealizedSale>> {
    Json(RemovalResponse {
        success: true,
        removed: state.session.sell_position(id).await,
    })
}

pub async fn get_sniper_wallet(State(state): State<AppState>) -> Json<SniperWalletResponse> {
    Json(SniperWalletResponse {
        sniper_wallet: state.session.sniper_wallet().await,
    })
}

pub async fn generate_sniper_wallet(
    State(state): State<AppState>,
) -> ApiResult<ActionResponse<SniperWallet>> {
    let accepted = state.session.generate_sniper_wallet().await?;
    Ok(Json(accepted.into()))
}

pub async fn deposit(
    State(state): State<AppState>,
    Json(body): Json<AmountRequest>,
) -> ApiResult<ActionResponse<TransferAck>> {
    let accepted = state.session.deposit(&body.amount).await?;
    Ok(Json(accepted.into()))
}

pub async fn withdraw(
    State(state): State<AppState>,
    Json(body): Json<AmountRequest>,
) -> ApiResult<ActionResponse<TransferAck>> {
    let accepted = state.session.withdraw(&body.amount).await?;
    Ok(Json(accepted.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AlwaysGrantOracle;
    use crate::config::SnipeDefaultsConfig;
    use crate::dashboard::DashboardSession;
    use crate::market::MarketState;
    use crate::wallet::testing::FakeConnection;
    use crate::wallet::{KeypairWallet, LocalStore, MemoryKeystore, SniperWalletManager};
    use axum::http::StatusCode;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    struct Harness {
        _dir: TempDir,
        wallet: Arc<KeypairWallet>,
        connection: Arc<FakeConnection>,
        state: AppState,
    }

    fn harness() -> Harness {
        let dir = tempdir().unwrap();
        let connection = Arc::new(FakeConnection::new());
        let wallet = Arc::new(KeypairWallet::new(connection.clone()));
        let sniper = Arc::new(SniperWalletManager::new(
            wallet.clone(),
            Arc::new(MemoryKeystore::new()),
            LocalStore::open(dir.path().join("local_storage.json")),
            "sniperWallet",
        ));
        let session = Arc::new(DashboardSession::new(
            wallet.clone(),
            Arc::new(AlwaysGrantOracle),
            sniper,
            MarketState::new(SnipeDefaultsConfig::default()),
            Duration::from_secs(3600),
        ));

        Harness {
            _dir: dir,
            wallet,
            connection,
            state: AppState::new(session),
        }
    }

    async fn connect(h: &Harness, lamports: u64) {
        let keypair = Keypair::new();
        h.connection.set_balance(&keypair.pubkey(), lamports);
        h.wallet.connect(keypair);
        h.state.session.refresh_access().await;
    }

    #[tokio::test]
    async fn test_dashboard_hidden_until_connected() {
        let h = harness();
        let view = get_dashboard(State(h.state.clone())).await.0;
        assert!(!view.data_visible);
        assert_eq!(view.balances.sol, "0");

        connect(&h, 0).await;
        let view = get_dashboard(State(h.state.clone())).await.0;
        assert!(view.data_visible);
        assert_eq!(view.balances.positions.len(), 3);
    }

    #[tokio::test]
    async fn test_monitor_validation_is_bad_request() {
        let h = harness();
        connect(&h, 0).await;

        let err = enable_monitoring(
            State(h.state.clone()),
            Json(MonitorRequest {
                handle: "abc".into(),
                amount: "0".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Please enter a valid amount to snipe");
    }

    #[tokio::test]
    async fn test_monitor_then_cancel_by_id() {
        let h = harness();
        connect(&h, 0).await;

        let created = enable_monitoring(
            State(h.state.clone()),
            Json(MonitorRequest {
                handle: "abc".into(),
                amount: "1".into(),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(created.data.target, "@abc");

        let removed = cancel_snipe(State(h.state.clone()), Path(created.data.id))
            .await
            .0;
        assert_eq!(removed.removed.map(|s| s.id), Some(created.data.id));

        let again = cancel_snipe(State(h.state.clone()), Path(created.data.id))
            .await
            .0;
        assert!(again.removed.is_none());
    }

    #[tokio::test]
    async fn test_sell_position_once() {
        let h = harness();
        connect(&h, 0).await;

        let view = get_dashboard(State(h.state.clone())).await.0;
        let id = view.balances.positions[0].id;

        let sold = sell_position(State(h.state.clone()), Path(id)).await.0;
        assert!(sold.removed.is_some());
        let sold_again = sell_position(State(h.state.clone()), Path(id)).await.0;
        assert!(sold_again.removed.is_none());

        let view = get_dashboard(State(h.state.clone())).await.0;
        assert_eq!(view.balances.positions.len(), 2);
    }

    #[tokio::test]
    async fn test_catalog_snipe_prefills_ticker() {
        let h = harness();
        let response = snipe_from_catalog(
            State(h.state.clone()),
            Json(CatalogSnipeRequest {
                name: "Believe AI".into(),
            }),
        )
        .await
        .0;
        assert_eq!(response.ticker_input.as_deref(), Some("BLVAI"));

        let response = snipe_from_catalog(
            State(h.state.clone()),
            Json(CatalogSnipeRequest {
                name: "Nope".into(),
            }),
        )
        .await
        .0;
        assert!(response.ticker_input.is_none());
    }

    #[tokio::test]
    async fn test_set_active_tab() {
        let h = harness();
        let body: TabRequest = serde_json::from_str(r#"{"tab":"active-snipes"}"#).unwrap();
        let view = set_active_tab(State(h.state.clone()), Json(body)).await.0;
        assert_eq!(view.active_tab, DashboardTab::ActiveSnipes);
    }

    #[tokio::test]
    async fn test_wallet_routes() {
        let h = harness();

        let err = generate_sniper_wallet(State(h.state.clone())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        connect(&h, 2_000_000_000).await;
        let created = generate_sniper_wallet(State(h.state.clone())).await.unwrap().0;
        assert!(created.success);

        let fetched = get_sniper_wallet(State(h.state.clone())).await.0;
        assert_eq!(
            fetched.sniper_wallet.map(|w| w.public_key),
            Some(created.data.public_key.clone())
        );

        let err = deposit(
            State(h.state.clone()),
            Json(AmountRequest {
                amount: "abc".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message(), "Please enter a valid amount");

        let ack = deposit(
            State(h.state.clone()),
            Json(AmountRequest {
                amount: "0.5".into(),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ack.data.new_balance, 0.5);

        let ack = withdraw(
            State(h.state.clone()),
            Json(AmountRequest {
                amount: "0.25".into(),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ack.data.new_balance, 0.25);
    }
}
