use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{KycReferenceId, UserId};

const MAX_DOCUMENT_BYTES: u64 = 5 * 1024 * 1024;
const ACCEPTED_MIME_TYPES: [&str; 3] = ["application/pdf", "image/png", "image/jpeg"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl BusinessAddress {
    /// Sets the address field named by a form key. Returns false for keys
    /// that aren't address fields.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "street" => self.street = value,
            "city" => self.city = value,
            "state" => self.state = value,
            "country" => self.country = value,
            "postal_code" | "postalCode" => {
                self.postal_code = Some(value).filter(|code| !code.trim().is_empty())
            }
            _ => return false,
        }
        true
    }
}

/// What we keep of an uploaded proof-of-address file. The bytes themselves
/// are measured and dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofDocument {
    pub file_name: String,
    pub size: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessKycSubmission {
    pub address: BusinessAddress,
    pub document: ProofDocument,
}

impl BusinessKycSubmission {
    pub fn validate(&self) -> Result<()> {
        let address = &self.address;
        for (field, value) in [
            ("street", &address.street),
            ("city", &address.city),
            ("state", &address.state),
            ("country", &address.country),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("{} is required", field)));
            }
        }

        let document = &self.document;
        if document.size == 0 {
            return Err(Error::validation("proof_of_address is empty"));
        }
        if document.size > MAX_DOCUMENT_BYTES {
            return Err(Error::validation("proof_of_address exceeds 5 MB"));
        }
        if !ACCEPTED_MIME_TYPES.contains(&document.mime_type.as_str()) {
            return Err(Error::validation(format!(
                "proof_of_address must be a PDF, PNG or JPEG, got {}",
                document.mime_type
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessKycRecord {
    pub id: KycReferenceId,
    pub user: UserId,
    pub submission: BusinessKycSubmission,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn submission() -> BusinessKycSubmission {
        BusinessKycSubmission {
            address: BusinessAddress {
                street: "12 Admiralty Way".to_string(),
                city: "Lekki".to_string(),
                state: "Lagos".to_string(),
                country: "Nigeria".to_string(),
                postal_code: Some("106104".to_string()),
            },
            document: ProofDocument {
                file_name: "utility-bill.pdf".to_string(),
                size: 48_213,
                mime_type: "application/pdf".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_submission() {
        assert_eq!(submission().validate(), Ok(()));
    }

    #[test]
    fn test_missing_address_field() {
        let mut submission = submission();
        submission.address.city = "  ".to_string();
        assert_eq!(
            submission.validate(),
            Err(Error::validation("city is required"))
        );
    }

    #[test]
    fn test_address_form_fields() {
        let mut address = BusinessAddress::default();
        assert!(address.set_field("street", "12 Admiralty Way".to_string()));
        assert!(address.set_field("postalCode", "106104".to_string()));
        assert_eq!(address.postal_code.as_deref(), Some("106104"));

        assert!(address.set_field("postal_code", " ".to_string()));
        assert_eq!(address.postal_code, None);

        assert!(!address.set_field("proof_of_address", "x".to_string()));
        assert_eq!(address.street, "12 Admiralty Way");
    }

    #[test]
    fn test_document_limits() {
        let mut oversized = submission();
        oversized.document.size = MAX_DOCUMENT_BYTES + 1;
        assert!(oversized.validate().is_err());

        let mut wrong_type = submission();
        wrong_type.document.mime_type = "application/zip".to_string();
        assert!(wrong_type.validate().is_err());

        let mut empty = submission();
        empty.document.size = 0;
        assert!(empty.validate().is_err());
    }
}
