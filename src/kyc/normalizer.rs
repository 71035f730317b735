//! Converts KYC status payloads from the verification provider into the
//! canonical [`KycStatus`].
//!
//! Two shapes are accepted:
//! - nested: `{"user": {"bvnStatus", "ninStatus"}, "business": {"status"}}`
//! - flat: already canonical (`user_kyc_status`, `bvn_verified`, ...)
//!
//! The shape is decided once at the boundary; anything else is rejected.

use serde::Deserialize;
use serde_json::Value;

use super::{KycState, KycStatus};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedUserStatus {
    pub bvn_status: Option<KycState>,
    #[serde(default)]
    pub nin_status: Option<KycState>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NestedBusinessStatus {
    #[serde(default)]
    pub status: Option<KycState>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NestedKycStatus {
    pub user: NestedUserStatus,
    #[serde(default)]
    pub business: Option<NestedBusinessStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KycStatusPayload {
    Nested(NestedKycStatus),
    Flat(KycStatus),
}

impl KycStatusPayload {
    pub fn classify(value: &Value) -> Result<Self> {
        let is_nested = value
            .get("user")
            .and_then(Value::as_object)
            .is_some_and(|user| user.contains_key("bvnStatus"));
        if is_nested {
            return serde_json::from_value(value.clone())
                .map(KycStatusPayload::Nested)
                .map_err(|err| Error::MalformedKycPayload(err.to_string()));
        }
        if value.get("user_kyc_status").is_some() {
            return serde_json::from_value(value.clone())
                .map(KycStatusPayload::Flat)
                .map_err(|err| Error::MalformedKycPayload(err.to_string()));
        }
        Err(Error::MalformedKycPayload(
            "unrecognised status shape".to_string(),
        ))
    }

    /// Whether the payload carries a business KYC state. Nested payloads
    /// may omit it; flat payloads always state one.
    pub fn reports_business(&self) -> bool {
        match self {
            KycStatusPayload::Nested(nested) => nested
                .business
                .as_ref()
                .is_some_and(|business| business.status.is_some()),
            KycStatusPayload::Flat(_) => true,
        }
    }

    pub fn into_canonical(self) -> Result<KycStatus> {
        match self {
            KycStatusPayload::Nested(nested) => Ok(nested.into()),
            KycStatusPayload::Flat(status) if status.is_consistent() => Ok(status),
            KycStatusPayload::Flat(_) => Err(Error::MalformedKycPayload(
                "verified status requires both BVN and NIN".to_string(),
            )),
        }
    }
}

impl From<NestedKycStatus> for KycStatus {
    fn from(nested: NestedKycStatus) -> Self {
        // "none" from the provider means the check hasn't started
        let reported = |state: Option<KycState>| state.filter(|s| *s != KycState::None);
        let bvn = reported(nested.user.bvn_status);
        let nin = reported(nested.user.nin_status);

        let bvn_verified = bvn == Some(KycState::Verified);
        let nin_verified = nin == Some(KycState::Verified);
        let user_kyc_status = if bvn_verified && nin_verified {
            KycState::Verified
        } else if bvn == Some(KycState::Rejected) || nin == Some(KycState::Rejected) {
            KycState::Rejected
        } else if bvn.is_none() && nin.is_none() {
            KycState::None
        } else {
            KycState::Pending
        };

        KycStatus {
            user_kyc_status,
            business_kyc_status: nested
                .business
                .and_then(|business| business.status)
                .unwrap_or_default(),
            bvn_verified,
            nin_verified,
        }
    }
}

pub fn normalize_status(value: &Value) -> Result<KycStatus> {
    KycStatusPayload::classify(value)?.into_canonical()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_partial_verification() {
        let status =
            normalize_status(&json!({ "user": { "bvnStatus": "verified", "ninStatus": "pending" } }))
                .unwrap();
        assert_eq!(
            status,
            KycStatus {
                user_kyc_status: KycState::Pending,
                business_kyc_status: KycState::None,
                bvn_verified: true,
                nin_verified: false,
            }
        );
    }

    #[test]
    fn test_nested_fully_verified_with_business() {
        let status = normalize_status(&json!({
            "user": { "bvnStatus": "verified", "ninStatus": "verified" },
            "business": { "status": "pending" }
        }))
        .unwrap();
        assert_eq!(status.user_kyc_status, KycState::Verified);
        assert_eq!(status.business_kyc_status, KycState::Pending);
    }

    #[test]
    fn test_nested_rejection_wins_over_pending() {
        let status = normalize_status(
            &json!({ "user": { "bvnStatus": "verified", "ninStatus": "rejected" } }),
        )
        .unwrap();
        assert_eq!(status.user_kyc_status, KycState::Rejected);
        assert!(status.bvn_verified);
        assert!(!status.nin_verified);
    }

    #[test]
    fn test_nested_nothing_reported() {
        let status = normalize_status(&json!({ "user": { "bvnStatus": null } })).unwrap();
        assert_eq!(status, KycStatus::default());
    }

    #[test]
    fn test_flat_shape_passes_through() {
        let flat = json!({
            "user_kyc_status": "verified",
            "business_kyc_status": "none",
            "bvn_verified": true,
            "nin_verified": true
        });
        let status = normalize_status(&flat).unwrap();
        assert_eq!(status.user_kyc_status, KycState::Verified);
    }

    #[test]
    fn test_flat_shape_violating_invariant() {
        let flat = json!({
            "user_kyc_status": "verified",
            "business_kyc_status": "none",
            "bvn_verified": true,
            "nin_verified": false
        });
        assert!(matches!(
            normalize_status(&flat),
            Err(Error::MalformedKycPayload(_))
        ));
    }

    #[test]
    fn test_unknown_shapes_fail_closed() {
        for payload in [
            json!({}),
            json!({ "user": { "status": "verified" } }),
            json!({ "user": "verified" }),
            json!({ "user": { "bvnStatus": "in_review" } }),
            json!({ "user_kyc_status": "verified" }),
            json!([1, 2, 3]),
        ] {
            assert!(
                matches!(normalize_status(&payload), Err(Error::MalformedKycPayload(_))),
                "accepted {}",
                payload
            );
        }
    }
}
