//! Transfer endpoints.
//!
//! A transfer is two requests: `otp/request` issues a code for a source
//! wallet, then `single` or `bulk` confirms with that code.

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::Response;
use axum::Json;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, Caller};
use crate::api::state::AppState;
use crate::banks::Bank;
use crate::csv_utils::read_bulk_items;
use crate::dto::{
    AccountLookup, AccountLookupRequest, BulkTransferRequest, BulkUploadPreview, PageResponse,
    SingleTransferRequest, SuccessResponse, TransferOtpRequest, TransferOtpResponse,
};
use crate::ids::TransferId;
use crate::stores::{Transfer, TransferQuery};

const UPLOAD_FIELD: &str = "file";

fn completed(message: &str, transfer: Transfer) -> Json<SuccessResponse<Transfer>> {
    Json(SuccessResponse {
        success: true,
        message: Some(message.to_string()),
        data: Some(transfer),
    })
}

pub async fn request_otp(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<TransferOtpRequest>,
) -> ApiResult<Json<TransferOtpResponse>> {
    let response = state
        .engine
        .lock()
        .request_transfer_otp(caller.user_id, request.wallet_id)?;
    Ok(Json(response))
}

pub async fn single(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<SingleTransferRequest>,
) -> ApiResult<Json<SuccessResponse<Transfer>>> {
    let transfer = state.engine.lock().confirm_single(caller.user_id, request)?;
    Ok(completed("Transfer successful", transfer))
}

pub async fn bulk(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<BulkTransferRequest>,
) -> ApiResult<Json<SuccessResponse<Transfer>>> {
    let transfer = state.engine.lock().confirm_bulk(caller.user_id, request)?;
    Ok(completed("Bulk transfer successful", transfer))
}

/// Parses an uploaded bulk CSV into items for review. Nothing is debited.
pub async fn bulk_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<SuccessResponse<BulkUploadPreview>>> {
    let mut contents = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            contents = Some(field.bytes().await?);
        }
    }
    let contents =
        contents.ok_or_else(|| ApiError::BadRequest(format!("{} is required", UPLOAD_FIELD)))?;

    let items = read_bulk_items(&contents).await?;
    let preview = state.engine.lock().preview_bulk(items)?;
    Ok(Json(SuccessResponse::data(preview)))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<TransferQuery>,
) -> Json<PageResponse<Transfer>> {
    Json(state.engine.lock().transfers(&query).into())
}

/// Filtered history as a CSV download.
pub async fn export(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<TransferQuery>,
) -> ApiResult<Response> {
    let csv = state.engine.lock().export_transfers(&query)?;
    Response::builder()
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"transfers.csv\"",
        )
        .body(Body::from(csv))
        .map_err(|err| ApiError::Internal(err.to_string()))
}

pub async fn retry(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<TransferId>,
) -> ApiResult<Json<SuccessResponse<Transfer>>> {
    let transfer = state.engine.lock().retry_transfer(id)?;
    Ok(completed("Transfer retried", transfer))
}

pub async fn banks(State(state): State<Arc<AppState>>) -> Json<SuccessResponse<Vec<Bank>>> {
    Json(SuccessResponse::data(state.engine.lock().banks().to_vec()))
}

/// Advisory beneficiary name lookup.
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AccountLookupRequest>,
) -> ApiResult<Json<SuccessResponse<AccountLookup>>> {
    let lookup = state.engine.lock().lookup_account(&request)?;
    Ok(Json(SuccessResponse::data(lookup)))
}
