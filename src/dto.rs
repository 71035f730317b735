use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::ids::{KycReferenceId, TransferId, WalletId};
use crate::kyc::KycType;
use crate::settings::{ContactType, OtpPreference};
use crate::stores::{Transfer, TransferKind, TransferStatus, WalletType};

/// Money amounts carry at most two decimal places (kobo); extra precision
/// is truncated, never rounded up.
pub fn deserialize_money<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    <Decimal as Deserialize>::deserialize(deserializer).map(truncate_money)
}

pub fn truncate_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

// Responses

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl SuccessResponse {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T> SuccessResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            success: true,
            data: page.data,
            pagination: page.pagination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingResponse {
    pub payment_url: String,
    pub reference: String,
    pub fee: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferOtpResponse {
    pub message: String,
    pub fee_charged: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct KycReferenceResponse {
    pub success: bool,
    #[serde(rename = "kycId")]
    pub kyc_id: KycReferenceId,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpPreferenceResponse {
    pub success: bool,
    pub preference: OtpPreference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountLookup {
    pub account_name: String,
    pub account_number: String,
    pub bank_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeQuote {
    pub fee_id: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub currency: String,
}

/// One line of the transfer history CSV export.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRow {
    pub id: TransferId,
    pub created_at: DateTime<Utc>,
    pub recipient_name: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransferStatus,
    pub kind: TransferKind,
    pub item_count: u32,
    pub failure_reason: Option<String>,
}

impl From<&Transfer> for TransferRow {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: transfer.id,
            created_at: transfer.created_at,
            recipient_name: transfer.recipient_name.clone(),
            amount: transfer.amount,
            currency: transfer.currency.clone(),
            status: transfer.status,
            kind: transfer.kind,
            item_count: transfer.item_count,
            failure_reason: transfer.failure_reason.clone(),
        }
    }
}

/// One row of an uploaded bulk transfer CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUploadRow {
    pub bank_code: String,
    pub account_number: String,
    pub account_name: String,
    #[serde(deserialize_with = "deserialize_money")]
    pub amount: Decimal,
    #[serde(default)]
    pub remark: Option<String>,
}

impl From<BulkUploadRow> for TransferDetails {
    fn from(row: BulkUploadRow) -> Self {
        Self {
            bank_code: row.bank_code,
            account_number: row.account_number,
            account_name: row.account_name,
            amount: row.amount,
            remark: row.remark.filter(|remark| !remark.is_empty()),
        }
    }
}

// Requests

#[derive(Debug, Clone, Deserialize)]
pub struct KycInitiateRequest {
    #[serde(rename = "type")]
    pub kyc_type: KycType,
    pub number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpRequest {
    pub otp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FundCardRequest {
    #[serde(deserialize_with = "deserialize_money")]
    pub amount: Decimal,
    #[serde(default = "default_wallet_type")]
    pub wallet_type: WalletType,
}

fn default_wallet_type() -> WalletType {
    WalletType::User
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBusinessWalletRequest {
    pub business_name: String,
    pub gtb_account_number: String,
    #[serde(rename = "kycReferenceId")]
    pub kyc_reference_id: KycReferenceId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferOtpRequest {
    pub wallet_id: WalletId,
}

/// Beneficiary and amount of one outgoing transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDetails {
    pub bank_code: String,
    pub account_number: String,
    pub account_name: String,
    #[serde(deserialize_with = "deserialize_money")]
    pub amount: Decimal,
    #[serde(default)]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SingleTransferRequest {
    #[serde(flatten)]
    pub details: TransferDetails,
    pub otp: String,
    pub wallet_id: WalletId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkTransferData {
    pub items: Vec<TransferDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkTransferRequest {
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub wallet_id: Option<WalletId>,
    pub data: BulkTransferData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLookupRequest {
    pub bank_code: String,
    pub account_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpPreferenceRequest {
    pub preference: OtpPreference,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactOtpRequest {
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeeQuoteQuery {
    #[serde(deserialize_with = "deserialize_money")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkUploadPreview {
    pub items: Vec<TransferDetails>,
    pub item_count: usize,
    pub total_amount: Decimal,
}
