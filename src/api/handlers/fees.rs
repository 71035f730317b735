use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiPath, ApiQuery};
use crate::api::state::AppState;
use crate::dto::{FeeQuote, FeeQuoteQuery, SuccessResponse};
use crate::fees::FeeConfig;

pub async fn list_fees(State(state): State<Arc<AppState>>) -> Json<SuccessResponse<Vec<FeeConfig>>> {
    Json(SuccessResponse::data(state.engine.lock().fees().to_vec()))
}

pub async fn quote_fee(
    State(state): State<Arc<AppState>>,
    ApiPath(fee_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<FeeQuoteQuery>,
) -> ApiResult<Json<SuccessResponse<FeeQuote>>> {
    let quote = state.engine.lock().quote_fee(&fee_id, query.amount)?;
    Ok(Json(SuccessResponse::data(quote)))
}
