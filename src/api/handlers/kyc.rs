//! KYC endpoints: BVN/NIN verification, business pre-registration and
//! provider status pushes.

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, Caller};
use crate::api::state::AppState;
use crate::dto::{
    KycInitiateRequest, KycReferenceResponse, MessageResponse, OtpRequest, SuccessResponse,
};
use crate::kyc::{BusinessAddress, BusinessKycSubmission, KycState, KycStatus, KycType, ProofDocument};

const PROOF_FIELD: &str = "proof_of_address";

pub async fn initiate(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<KycInitiateRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let kyc_type = request.kyc_type;
    state.engine.lock().initiate_kyc(caller.user_id, request)?;
    let label = match kyc_type {
        KycType::Bvn => "BVN",
        KycType::Nin => "NIN",
    };
    Ok(Json(MessageResponse::new(format!(
        "OTP sent to the phone number linked to your {}",
        label
    ))))
}

pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<OtpRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let status = state.engine.lock().verify_kyc(caller.user_id, &request.otp)?;
    let message = if status.user_kyc_status == KycState::Verified {
        "KYC verification complete, your wallet is ready"
    } else {
        "Verification successful"
    };
    Ok(Json(SuccessResponse::with_message(message)))
}

pub async fn status(State(state): State<Arc<AppState>>, caller: Caller) -> Json<KycStatus> {
    Json(state.engine.lock().kyc_status(caller.user_id))
}

/// Provider status push, in either the nested or the flat shape.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Json<KycStatus>> {
    let status = state
        .engine
        .lock()
        .apply_kyc_payload(caller.user_id, &payload)?;
    Ok(Json(status))
}

/// Multipart business pre-registration: address fields plus a
/// `proof_of_address` file. The file is measured, not stored.
pub async fn submit_business(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    mut multipart: Multipart,
) -> ApiResult<Json<KycReferenceResponse>> {
    let mut address = BusinessAddress::default();
    let mut document = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PROOF_FIELD {
            let file_name = field.file_name().unwrap_or(PROOF_FIELD).to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let size = field.bytes().await?.len() as u64;
            document = Some(ProofDocument {
                file_name,
                size,
                mime_type,
            });
            continue;
        }

        let value = field.text().await?;
        if !address.set_field(&name, value) {
            tracing::debug!(field = %name, "Ignoring unknown business KYC field");
        }
    }

    let document = document
        .ok_or_else(|| ApiError::BadRequest(format!("{} file is required", PROOF_FIELD)))?;
    let record = state
        .engine
        .lock()
        .submit_business_kyc(caller.user_id, BusinessKycSubmission { address, document })?;
    Ok(Json(KycReferenceResponse {
        success: true,
        kyc_id: record.id,
    }))
}
