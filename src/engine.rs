use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::banks::{self, Bank};
use crate::csv_utils::write_csv;
use crate::dto::{
    AccountLookup, AccountLookupRequest, BulkTransferRequest, BulkUploadPreview,
    ContactOtpRequest, CreateBusinessWalletRequest, FeeQuote, FundCardRequest, FundingResponse,
    KycInitiateRequest, Page, SingleTransferRequest, TransferDetails, TransferOtpResponse,
    TransferRow,
};
use crate::error::{Error, Result};
use crate::fees::{self, FeeConfig, FeeSchedule};
use crate::ids::{EmployeeId, TransferId, UserId, WalletId};
use crate::kyc::{
    BusinessKycRecord, BusinessKycSubmission, KycRegistry, KycState, KycStatus, KycStatusPayload,
    KycType,
};
use crate::payroll::{AdjustmentRequest, NewEmployee, Payroll, PayrollEmployee, PayrollSummary};
use crate::settings::{ContactChange, OtpPreference, ProfileUpdate, Settings};
use crate::stores::{
    MemoryRepository, OtpLedger, OtpPolicy, Repository, Transfer, TransferKind, TransferQuery,
    TransferStatus, TransferStore, VirtualAccountOutcome, Wallet, WalletInfo, WalletLedger,
    WalletSettings,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub otp: OtpPolicy,
    pub wallet: WalletSettings,
    /// Base of the hosted checkout page card funding redirects to.
    pub checkout_base_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            otp: OtpPolicy::default(),
            wallet: WalletSettings::default(),
            checkout_base_url: "https://checkout.paydesk.test/pay".to_string(),
        }
    }
}

/// All business state of one deployment. Every operation takes the caller's
/// user id and runs to completion against the ledgers; callers serialize
/// access (the HTTP layer holds the engine behind a mutex).
pub struct Engine {
    kyc: KycRegistry,
    kyc_otps: OtpLedger<KycType>,
    contact_otps: OtpLedger<ContactChange>,
    /// Transfer OTPs carry the wallet they authorize a debit from.
    transfer_otps: OtpLedger<WalletId>,
    wallets: WalletLedger,
    transfers: TransferStore,
    fees: FeeSchedule,
    settings: MemoryRepository<UserId, Settings>,
    payroll: Payroll,
    checkout_base_url: String,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let fees = FeeSchedule::standard(&config.wallet.currency);
        Self {
            kyc: KycRegistry::new(),
            kyc_otps: OtpLedger::new(config.otp.clone()),
            contact_otps: OtpLedger::new(config.otp.clone()),
            transfer_otps: OtpLedger::new(config.otp),
            wallets: WalletLedger::new(config.wallet),
            transfers: TransferStore::new(),
            fees,
            settings: MemoryRepository::new(),
            payroll: Payroll::new(),
            checkout_base_url: config.checkout_base_url,
        }
    }

    // KYC

    pub fn kyc_status(&mut self, user: UserId) -> KycStatus {
        self.kyc.status(user)
    }

    /// Starts a BVN or NIN verification and issues the KYC OTP.
    pub fn initiate_kyc(&mut self, user: UserId, request: KycInitiateRequest) -> Result<KycStatus> {
        let status = self.kyc.begin(user, &request.number)?;
        self.kyc_otps.request(user, request.kyc_type, Utc::now());
        tracing::info!(%user, kyc_type = ?request.kyc_type, "KYC OTP issued");
        Ok(status)
    }

    /// Consumes the KYC OTP. The user wallet is provisioned once the status
    /// update making the user verified has been stored.
    pub fn verify_kyc(&mut self, user: UserId, otp: &str) -> Result<KycStatus> {
        let kyc_type = self.kyc_otps.verify(user, otp, Utc::now())?;
        let status = self.kyc.mark_verified(user, kyc_type);
        if status.user_kyc_status == KycState::Verified {
            self.wallets.ensure(user);
        }
        Ok(status)
    }

    /// Applies a status pushed by the KYC provider, in either payload shape.
    pub fn apply_kyc_payload(&mut self, user: UserId, payload: &Value) -> Result<KycStatus> {
        let status = self.kyc.apply(user, KycStatusPayload::classify(payload)?)?;
        tracing::info!(%user, state = ?status.user_kyc_status, "KYC status applied from provider");
        if status.user_kyc_status == KycState::Verified {
            self.wallets.ensure(user);
        }
        Ok(status)
    }

    pub fn submit_business_kyc(
        &mut self,
        user: UserId,
        submission: BusinessKycSubmission,
    ) -> Result<BusinessKycRecord> {
        let record = self.kyc.register_business(user, submission, Utc::now())?;
        tracing::info!(%user, reference = %record.id, "Business KYC submitted");
        Ok(record)
    }

    // Wallets

    pub fn wallet_info(&self, user: UserId) -> WalletInfo {
        self.wallets.info(user)
    }

    /// Credits the target wallet and hands back the checkout redirect.
    /// Repeated calls credit again; the gateway is trusted for dedup.
    pub fn fund_wallet(&mut self, user: UserId, request: FundCardRequest) -> Result<FundingResponse> {
        let fee = self.fees.quote(fees::CARD_FUNDING_FEE, request.amount)?;
        let wallet = self
            .wallets
            .credit(user, request.wallet_type, request.amount)?;
        let reference = format!("FND-{}", uuid::Uuid::new_v4().simple());
        tracing::info!(
            %user,
            wallet = %wallet.id,
            amount = %request.amount,
            %reference,
            "Wallet funded"
        );
        Ok(FundingResponse {
            payment_url: format!(
                "{}/{}?amount={}",
                self.checkout_base_url, reference, request.amount
            ),
            reference,
            fee,
        })
    }

    pub fn create_business_wallet(
        &mut self,
        user: UserId,
        request: CreateBusinessWalletRequest,
    ) -> Result<Wallet> {
        self.kyc.business_reference(user, request.kyc_reference_id)?;
        let business_name = request.business_name.trim();
        if business_name.is_empty() {
            return Err(Error::validation("business_name is required"));
        }
        let account_number = request.gtb_account_number.trim();
        if !banks::is_nuban(account_number) {
            return Err(Error::InvalidAccountDetails);
        }
        let wallet = self
            .wallets
            .attach_business_wallet(user, account_number, business_name)?;
        self.kyc.mark_business_verified(user);
        Ok(wallet)
    }

    pub fn create_virtual_account(&mut self, user: UserId) -> VirtualAccountOutcome {
        self.wallets.assign_virtual_account(user)
    }

    // Transfers

    /// First phase of a transfer: issues the transfer OTP for `wallet_id`.
    /// SMS delivery is quoted as a fee but never charged.
    pub fn request_transfer_otp(
        &mut self,
        user: UserId,
        wallet_id: WalletId,
    ) -> Result<TransferOtpResponse> {
        self.wallets.owned(user, wallet_id)?;
        let preference = self.settings(user).otp_preference;
        let fee_charged = if preference.uses_sms() {
            self.fees.quote(fees::SMS_OTP_FEE, Decimal::ZERO)?
        } else {
            Decimal::ZERO
        };
        self.transfer_otps.request(user, wallet_id, Utc::now());
        tracing::info!(%user, wallet = %wallet_id, ?preference, "Transfer OTP issued");

        let channel = match preference {
            OtpPreference::Email => "email",
            OtpPreference::Sms => "phone",
            OtpPreference::Both => "email and phone",
        };
        Ok(TransferOtpResponse {
            message: format!("OTP sent to your registered {}", channel),
            fee_charged,
        })
    }

    pub fn confirm_single(&mut self, user: UserId, request: SingleTransferRequest) -> Result<Transfer> {
        let SingleTransferRequest {
            details,
            otp,
            wallet_id,
        } = request;
        validate_details(&details)?;
        self.authorize_debit(user, wallet_id, details.amount, &otp)?;

        let transfer = Transfer {
            id: TransferId::new(),
            amount: details.amount,
            currency: self.wallets.settings().currency.clone(),
            status: TransferStatus::Success,
            recipient_name: details.account_name.trim().to_string(),
            failure_reason: None,
            created_at: Utc::now(),
            kind: TransferKind::Single,
            bank_code: Some(details.bank_code),
            account_number: Some(details.account_number),
            remark: details.remark,
            wallet_id: Some(wallet_id),
            item_count: 1,
        };
        Ok(self.record(user, transfer))
    }

    /// Confirms a bulk transfer as one record carrying the summed amount.
    /// The source wallet defaults to the one the outstanding OTP was issued for.
    pub fn confirm_bulk(&mut self, user: UserId, request: BulkTransferRequest) -> Result<Transfer> {
        let otp = request.otp.ok_or(Error::OtpRequired)?;
        let items = request.data.items;
        let total = validate_bulk(&items)?;
        let wallet_id = request
            .wallet_id
            .or_else(|| self.transfer_otps.pending_payload(user))
            .ok_or(Error::OtpNotFound)?;
        self.authorize_debit(user, wallet_id, total, &otp)?;

        let transfer = Transfer {
            id: TransferId::new(),
            amount: total,
            currency: self.wallets.settings().currency.clone(),
            status: TransferStatus::Success,
            recipient_name: format!("Bulk transfer ({} recipients)", items.len()),
            failure_reason: None,
            created_at: Utc::now(),
            kind: TransferKind::Bulk,
            bank_code: None,
            account_number: None,
            remark: None,
            wallet_id: Some(wallet_id),
            item_count: items.len() as u32,
        };
        Ok(self.record(user, transfer))
    }

    /// Checks the debit can go through, then consumes the OTP and debits.
    /// A rejected OTP leaves balances and history as they were.
    fn authorize_debit(
        &mut self,
        user: UserId,
        wallet_id: WalletId,
        amount: Decimal,
        otp: &str,
    ) -> Result<()> {
        if let Some(authorized) = self.transfer_otps.pending_payload(user) {
            if authorized != wallet_id {
                return Err(Error::validation("OTP was issued for a different wallet"));
            }
        }
        self.wallets.check_debit(user, wallet_id, amount)?;
        self.transfer_otps.verify(user, otp, Utc::now())?;
        self.wallets.debit(user, wallet_id, amount)?;
        Ok(())
    }

    fn record(&mut self, user: UserId, transfer: Transfer) -> Transfer {
        tracing::info!(
            %user,
            transfer = %transfer.id,
            kind = ?transfer.kind,
            amount = %transfer.amount,
            "Transfer completed"
        );
        self.transfers.insert(transfer.clone());
        transfer
    }

    /// Stores an already-settled transfer as-is, e.g. imported history.
    pub fn import_transfer(&mut self, transfer: Transfer) {
        self.transfers.insert(transfer);
    }

    pub fn retry_transfer(&mut self, id: TransferId) -> Result<Transfer> {
        let previous = self.transfers.get(id)?.status;
        let transfer = self.transfers.mark_success(id)?;
        tracing::info!(transfer = %id, ?previous, "Transfer retried");
        Ok(transfer)
    }

    pub fn transfers(&self, query: &TransferQuery) -> Page<Transfer> {
        self.transfers.query(query)
    }

    /// Filtered transfer history as CSV, newest first.
    pub fn export_transfers(&self, query: &TransferQuery) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let rows = self.transfers.matching(query);
        write_csv(&mut output, rows.iter().map(TransferRow::from))?;
        Ok(output)
    }

    /// Validates parsed bulk upload rows for review before confirming.
    pub fn preview_bulk(&self, items: Vec<TransferDetails>) -> Result<BulkUploadPreview> {
        let total_amount = validate_bulk(&items)?;
        Ok(BulkUploadPreview {
            item_count: items.len(),
            items,
            total_amount,
        })
    }

    pub fn banks(&self) -> &'static [Bank] {
        banks::BANKS
    }

    pub fn lookup_account(&self, request: &AccountLookupRequest) -> Result<AccountLookup> {
        banks::resolve_account_name(&request.bank_code, &request.account_number)
    }

    // Fees

    pub fn fees(&self) -> &[FeeConfig] {
        self.fees.entries()
    }

    pub fn quote_fee(&self, fee_id: &str, amount: Decimal) -> Result<FeeQuote> {
        let fee = self.fees.quote(fee_id, amount)?;
        let entry = self.fees.get(fee_id)?;
        Ok(FeeQuote {
            fee_id: entry.id.clone(),
            amount,
            fee,
            currency: entry.currency.clone(),
        })
    }

    // Settings

    pub fn settings(&self, user: UserId) -> Settings {
        self.settings.get(&user).unwrap_or_default()
    }

    pub fn update_settings(&mut self, user: UserId, update: ProfileUpdate) -> Result<Settings> {
        let mut settings = self.settings(user);
        settings.apply(update)?;
        self.settings.put(user, settings.clone());
        Ok(settings)
    }

    pub fn set_otp_preference(&mut self, user: UserId, preference: OtpPreference) -> OtpPreference {
        let mut settings = self.settings(user);
        settings.otp_preference = preference;
        self.settings.put(user, settings);
        preference
    }

    /// Issues an OTP carrying the new email/phone; the profile is untouched
    /// until [`Engine::verify_contact_otp`] succeeds.
    pub fn request_contact_otp(&mut self, user: UserId, request: ContactOtpRequest) -> Result<()> {
        let change = ContactChange::new(request.contact_type, &request.value)?;
        let contact_type = change.contact_type;
        self.contact_otps.request(user, change, Utc::now());
        tracing::info!(%user, ?contact_type, "Contact update OTP issued");
        Ok(())
    }

    pub fn verify_contact_otp(&mut self, user: UserId, otp: &str) -> Result<Settings> {
        let change = self.contact_otps.verify(user, otp, Utc::now())?;
        let mut settings = self.settings(user);
        settings.apply_contact(change);
        self.settings.put(user, settings.clone());
        Ok(settings)
    }

    // Payroll

    pub fn employees(&self) -> Vec<PayrollEmployee> {
        self.payroll.list()
    }

    pub fn add_employee(&mut self, employee: NewEmployee) -> Result<PayrollEmployee> {
        self.payroll.add(employee)
    }

    pub fn remove_employee(&mut self, id: EmployeeId) -> Result<PayrollEmployee> {
        self.payroll.remove(id)
    }

    pub fn adjust_employee(
        &mut self,
        id: EmployeeId,
        adjustment: AdjustmentRequest,
    ) -> Result<PayrollEmployee> {
        self.payroll.adjust(id, adjustment, Utc::now())
    }

    pub fn payroll_summary(&self) -> PayrollSummary {
        self.payroll.summary()
    }
}

fn validate_details(details: &TransferDetails) -> Result<()> {
    if banks::find(&details.bank_code).is_err() || !banks::is_nuban(&details.account_number) {
        return Err(Error::InvalidAccountDetails);
    }
    if details.account_name.trim().is_empty() {
        return Err(Error::validation("accountName is required"));
    }
    if details.amount <= Decimal::ZERO {
        return Err(Error::AmountMustBePositive);
    }
    Ok(())
}

/// Validates every item and returns their total.
fn validate_bulk(items: &[TransferDetails]) -> Result<Decimal> {
    if items.is_empty() {
        return Err(Error::validation("Bulk transfer has no items"));
    }
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        validate_details(item)?;
        Ok(total + item.amount)
    })
}
