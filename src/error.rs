//! Domain-specific errors for the business-operations core.
//!
//! Variants fall into a handful of kinds (see [`ErrorKind`]):
//! - Validation errors (malformed input, bad amounts, unknown banks)
//! - Authorization failures (wrong, expired, locked or missing OTP codes)
//! - Missing records (wallets, transfers, employees, KYC references)
//! - Conflicts with existing state
//! - Upstream provider failures
//!
//! These errors represent business logic failures. The HTTP layer maps
//! them onto status codes in `api::error`.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("Amount must be greater than zero")]
    AmountMustBePositive,
    #[error("Invalid account details")]
    InvalidAccountDetails,
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Malformed KYC status payload: {0}")]
    MalformedKycPayload(String),
    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("OTP has expired")]
    OtpExpired,
    #[error("Too many failed OTP attempts, request a new code")]
    OtpLocked,
    #[error("No pending OTP, request a new code")]
    OtpNotFound,
    #[error("OTP is required")]
    OtpRequired,

    #[error("Wallet not found")]
    WalletNotFound,
    #[error("Transfer not found")]
    TransferNotFound,
    #[error("Employee not found")]
    EmployeeNotFound,
    #[error("Fee configuration not found")]
    FeeNotFound,
    #[error("KYC reference not found")]
    KycReferenceNotFound,
    #[error("Bank not found")]
    BankNotFound,

    #[error("Business wallet already exists")]
    BusinessWalletExists,

    #[error("Upstream provider failure: {0}")]
    Upstream(String),
}

/// Coarse classification of [`Error`] used for HTTP mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    AuthFailure,
    NotFound,
    Conflict,
    Upstream,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::AuthFailure => "auth_failure",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Upstream => "upstream_failure",
        }
    }
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_)
            | Error::AmountMustBePositive
            | Error::InvalidAccountDetails
            | Error::InsufficientFunds
            | Error::MalformedKycPayload(_)
            | Error::Csv(_) => ErrorKind::Validation,
            Error::InvalidOtp
            | Error::OtpExpired
            | Error::OtpLocked
            | Error::OtpNotFound
            | Error::OtpRequired => ErrorKind::AuthFailure,
            Error::WalletNotFound
            | Error::TransferNotFound
            | Error::EmployeeNotFound
            | Error::FeeNotFound
            | Error::KycReferenceNotFound
            | Error::BankNotFound => ErrorKind::NotFound,
            Error::BusinessWalletExists => ErrorKind::Conflict,
            Error::Upstream(_) => ErrorKind::Upstream,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

impl From<csv_async::Error> for Error {
    fn from(err: csv_async::Error) -> Self {
        Error::Csv(err.to_string())
    }
}
