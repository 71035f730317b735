use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, Caller};
use crate::api::state::AppState;
use crate::dto::{
    ContactOtpRequest, OtpPreferenceRequest, OtpPreferenceResponse, OtpRequest, SuccessResponse,
};
use crate::settings::{ProfileUpdate, Settings};

pub async fn get_settings(State(state): State<Arc<AppState>>, caller: Caller) -> Json<Settings> {
    Json(state.engine.lock().settings(caller.user_id))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<Settings>> {
    let settings = state.engine.lock().update_settings(caller.user_id, update)?;
    Ok(Json(settings))
}

pub async fn get_otp_preference(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Json<OtpPreferenceResponse> {
    Json(OtpPreferenceResponse {
        success: true,
        preference: state.engine.lock().settings(caller.user_id).otp_preference,
    })
}

pub async fn set_otp_preference(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<OtpPreferenceRequest>,
) -> Json<OtpPreferenceResponse> {
    let preference = state
        .engine
        .lock()
        .set_otp_preference(caller.user_id, request.preference);
    Json(OtpPreferenceResponse {
        success: true,
        preference,
    })
}

pub async fn request_contact_otp(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<ContactOtpRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    state.engine.lock().request_contact_otp(caller.user_id, request)?;
    Ok(Json(SuccessResponse::with_message("OTP sent")))
}

pub async fn verify_contact_otp(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(request): ApiJson<OtpRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .engine
        .lock()
        .verify_contact_otp(caller.user_id, &request.otp)?;
    Ok(Json(SuccessResponse::with_message("Contact details updated")))
}
