use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, Caller};
use crate::api::state::AppState;
use crate::dto::{CreateBusinessWalletRequest, FundCardRequest, FundingResponse, MessageResponse};
use crate::stores::{VirtualAccountOutcome, Wallet, WalletInfo};

pub async fn get_wallet(State(state): State<Arc<AppState>>, caller: Caller) -> Json<WalletInfo> {
    Json(state.engine.lock().wallet_info(caller.user_id))
}

pub async fn fund_card(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<FundCardRequest>,
) -> ApiResult<Json<FundingResponse>> {
    let response = state.engine.lock().fund_wallet(caller.user_id, request)?;
    Ok(Json(response))
}

pub async fn create_business_wallet(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<CreateBusinessWalletRequest>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state
        .engine
        .lock()
        .create_business_wallet(caller.user_id, request)?;
    tracing::info!(business = %caller.business_id, wallet = %wallet.id, "Business wallet created");
    Ok(Json(wallet))
}

pub async fn create_virtual_account(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Json<MessageResponse> {
    let message = match state.engine.lock().create_virtual_account(caller.user_id) {
        VirtualAccountOutcome::Created(_) => "Virtual account created successfully",
        VirtualAccountOutcome::AlreadyExists(_) => "Virtual account already exists",
    };
    Json(MessageResponse::new(message))
}
