//! JSON REST API.
//!
//! ```text
//! <prefix>/
//! ├── /kyc        - BVN/NIN verification, business pre-registration
//! ├── /wallet     - Wallets, card funding, virtual accounts
//! ├── /transfers  - OTP-gated transfers, history, bank lookup
//! ├── /fees       - Fee catalogue and quotes
//! ├── /settings   - Business profile, OTP preference, contact update
//! └── /payroll    - Employees and adjustments
//! /health
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use state::AppState;

/// Multipart uploads carry up to a 5 MiB document plus form fields.
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Creates the router with every API route mounted under `prefix`.
pub fn create_router(state: Arc<AppState>, prefix: &str) -> Router {
    let api = Router::new()
        .nest("/kyc", kyc_routes())
        .nest("/wallet", wallet_routes())
        .nest("/transfers", transfer_routes())
        .nest("/fees", fee_routes())
        .nest("/settings", settings_routes())
        .nest("/payroll", payroll_routes());

    let router = if prefix.is_empty() || prefix == "/" {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    router
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
}

fn kyc_routes() -> Router<Arc<AppState>> {
    use handlers::kyc;
    Router::new()
        .route("/initiate", post(kyc::initiate))
        .route("/verify-otp", post(kyc::verify_otp))
        .route("/status", get(kyc::status))
        .route(
            "/business",
            post(kyc::submit_business).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/webhook", post(kyc::webhook))
}

fn wallet_routes() -> Router<Arc<AppState>> {
    use handlers::wallet;
    Router::new()
        .route("/", get(wallet::get_wallet))
        .route("/fund/card", post(wallet::fund_card))
        .route("/business/create", post(wallet::create_business_wallet))
        .route("/create-virtual-account", post(wallet::create_virtual_account))
}

fn transfer_routes() -> Router<Arc<AppState>> {
    use handlers::transfers;
    Router::new()
        .route("/", get(transfers::list))
        .route("/export", get(transfers::export))
        .route("/banks", get(transfers::banks))
        .route("/lookup", post(transfers::lookup))
        .route("/otp/request", post(transfers::request_otp))
        .route("/single", post(transfers::single))
        .route("/bulk", post(transfers::bulk))
        .route(
            "/bulk/upload",
            post(transfers::bulk_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/:id/retry", post(transfers::retry))
}

fn fee_routes() -> Router<Arc<AppState>> {
    use handlers::fees;
    Router::new()
        .route("/", get(fees::list_fees))
        .route("/:id/quote", get(fees::quote_fee))
}

fn settings_routes() -> Router<Arc<AppState>> {
    use handlers::settings;
    Router::new()
        .route(
            "/",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/otp-preference",
            get(settings::get_otp_preference).put(settings::set_otp_preference),
        )
        .route(
            "/update-contact/request-otp",
            post(settings::request_contact_otp),
        )
        .route(
            "/update-contact/verify-otp",
            post(settings::verify_contact_otp),
        )
}

fn payroll_routes() -> Router<Arc<AppState>> {
    use handlers::payroll;
    Router::new()
        .route(
            "/employees",
            get(payroll::list_employees).post(payroll::add_employee),
        )
        .route("/employees/:id", delete(payroll::remove_employee))
        .route("/employees/:id/adjustments", post(payroll::adjust_employee))
        .route("/summary", get(payroll::summary))
}
