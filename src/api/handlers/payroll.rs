use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::state::AppState;
use crate::dto::SuccessResponse;
use crate::ids::EmployeeId;
use crate::payroll::{AdjustmentRequest, NewEmployee, PayrollEmployee, PayrollSummary};

pub async fn list_employees(
    State(state): State<Arc<AppState>>,
) -> Json<SuccessResponse<Vec<PayrollEmployee>>> {
    Json(SuccessResponse::data(state.engine.lock().employees()))
}

pub async fn add_employee(
    State(state): State<Arc<AppState>>,
    ApiJson(employee): ApiJson<NewEmployee>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<PayrollEmployee>>)> {
    let employee = state.engine.lock().add_employee(employee)?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::data(employee))))
}

pub async fn remove_employee(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<EmployeeId>,
) -> ApiResult<Json<SuccessResponse>> {
    state.engine.lock().remove_employee(id)?;
    Ok(Json(SuccessResponse::with_message("Employee removed")))
}

pub async fn adjust_employee(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<EmployeeId>,
    ApiJson(adjustment): ApiJson<AdjustmentRequest>,
) -> ApiResult<Json<SuccessResponse<PayrollEmployee>>> {
    let employee = state.engine.lock().adjust_employee(id, adjustment)?;
    Ok(Json(SuccessResponse::data(employee)))
}

pub async fn summary(State(state): State<Arc<AppState>>) -> Json<SuccessResponse<PayrollSummary>> {
    Json(SuccessResponse::data(state.engine.lock().payroll_summary()))
}
