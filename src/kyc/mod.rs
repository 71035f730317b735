//! KYC verification state per user.
//!
//! A user is verified once both their BVN and NIN have been confirmed by
//! OTP. The OTP itself lives in the engine's KYC ledger; this module only
//! tracks the resulting status and the business pre-registration records.

mod business;
mod normalizer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{KycReferenceId, UserId};
use crate::stores::{MemoryRepository, Repository};

pub use business::{BusinessAddress, BusinessKycRecord, BusinessKycSubmission, ProofDocument};
pub use normalizer::{normalize_status, KycStatusPayload};

const IDENTITY_NUMBER_LENGTH: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycType {
    Bvn,
    Nin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycState {
    #[default]
    None,
    Pending,
    Verified,
    Rejected,
}

/// Canonical KYC status. `user_kyc_status` is `Verified` exactly when both
/// identity numbers are verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycStatus {
    pub user_kyc_status: KycState,
    pub business_kyc_status: KycState,
    pub bvn_verified: bool,
    pub nin_verified: bool,
}

impl KycStatus {
    pub fn is_consistent(&self) -> bool {
        (self.user_kyc_status == KycState::Verified) == (self.bvn_verified && self.nin_verified)
    }

    fn is_fully_verified(&self) -> bool {
        self.bvn_verified && self.nin_verified
    }
}

pub fn validate_identity_number(number: &str) -> Result<()> {
    let number = number.trim();
    if number.len() != IDENTITY_NUMBER_LENGTH || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::validation(format!(
            "Identity number must be {} digits",
            IDENTITY_NUMBER_LENGTH
        )));
    }
    Ok(())
}

pub struct KycRegistry<
    S = MemoryRepository<UserId, KycStatus>,
    B = MemoryRepository<KycReferenceId, BusinessKycRecord>,
> {
    statuses: S,
    business: B,
}

impl KycRegistry {
    pub fn new() -> Self {
        Self::with_repositories(MemoryRepository::new(), MemoryRepository::new())
    }
}

impl Default for KycRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> KycRegistry<S, B>
where
    S: Repository<UserId, KycStatus>,
    B: Repository<KycReferenceId, BusinessKycRecord>,
{
    pub fn with_repositories(statuses: S, business: B) -> Self {
        Self { statuses, business }
    }

    /// Current status, created on first access.
    pub fn status(&mut self, user: UserId) -> KycStatus {
        if let Some(status) = self.statuses.get(&user) {
            return status;
        }
        let status = KycStatus::default();
        self.statuses.put(user, status);
        status
    }

    /// Records the start of a BVN/NIN verification.
    pub fn begin(&mut self, user: UserId, number: &str) -> Result<KycStatus> {
        validate_identity_number(number)?;
        let mut status = self.status(user);
        if status.user_kyc_status != KycState::Verified {
            status.user_kyc_status = KycState::Pending;
        }
        self.statuses.put(user, status);
        Ok(status)
    }

    /// Marks one identity number as verified. Both verified makes the user
    /// verified; anything less leaves them pending.
    pub fn mark_verified(&mut self, user: UserId, kyc_type: KycType) -> KycStatus {
        let mut status = self.status(user);
        match kyc_type {
            KycType::Bvn => status.bvn_verified = true,
            KycType::Nin => status.nin_verified = true,
        }
        status.user_kyc_status = if status.is_fully_verified() {
            KycState::Verified
        } else {
            KycState::Pending
        };
        self.statuses.put(user, status);
        tracing::info!(%user, ?kyc_type, state = ?status.user_kyc_status, "KYC number verified");
        status
    }

    /// Stores the status reported by the KYC provider. A payload without a
    /// business section leaves the stored business state untouched.
    pub fn apply(&mut self, user: UserId, payload: KycStatusPayload) -> Result<KycStatus> {
        let reports_business = payload.reports_business();
        let mut status = payload.into_canonical()?;
        if !reports_business {
            status.business_kyc_status = self.status(user).business_kyc_status;
        }
        if !status.is_consistent() {
            return Err(Error::MalformedKycPayload(
                "verified status requires both BVN and NIN".to_string(),
            ));
        }
        self.statuses.put(user, status);
        Ok(status)
    }

    pub fn register_business(
        &mut self,
        user: UserId,
        submission: BusinessKycSubmission,
        now: DateTime<Utc>,
    ) -> Result<BusinessKycRecord> {
        submission.validate()?;
        let record = BusinessKycRecord {
            id: KycReferenceId::new(),
            user,
            submission,
            submitted_at: now,
        };
        self.business.put(record.id, record.clone());

        let mut status = self.status(user);
        if status.business_kyc_status != KycState::Verified {
            status.business_kyc_status = KycState::Pending;
        }
        self.statuses.put(user, status);
        Ok(record)
    }

    /// Looks up a business KYC reference, which must belong to `user`.
    pub fn business_reference(
        &self,
        user: UserId,
        reference: KycReferenceId,
    ) -> Result<BusinessKycRecord> {
        self.business
            .get(&reference)
            .filter(|record| record.user == user)
            .ok_or(Error::KycReferenceNotFound)
    }

    pub fn mark_business_verified(&mut self, user: UserId) -> KycStatus {
        let mut status = self.status(user);
        status.business_kyc_status = KycState::Verified;
        self.statuses.put(user, status);
        status
    }
}
