//! Business profile and notification settings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPreference {
    #[default]
    Email,
    Sms,
    Both,
}

impl OtpPreference {
    pub fn uses_sms(self) -> bool {
        matches!(self, OtpPreference::Sms | OtpPreference::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub industry: String,
    pub rc_number: String,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            business_name: "Acme Ventures Ltd".to_string(),
            email: "finance@acmeventures.ng".to_string(),
            phone: "08031234567".to_string(),
            address: "12 Admiralty Way, Lekki, Lagos".to_string(),
            industry: "Retail".to_string(),
            rc_number: "RC1234567".to_string(),
        }
    }
}

/// Partial profile update; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub business_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub rc_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Email,
    Phone,
}

/// A requested email or phone change waiting for OTP confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactChange {
    pub contact_type: ContactType,
    pub value: String,
}

impl ContactChange {
    pub fn new(contact_type: ContactType, value: &str) -> Result<Self> {
        let value = value.trim();
        let valid = match contact_type {
            ContactType::Email => is_email(value),
            ContactType::Phone => is_phone(value),
        };
        if !valid {
            return Err(Error::validation(match contact_type {
                ContactType::Email => "Invalid email address",
                ContactType::Phone => "Invalid phone number",
            }));
        }
        Ok(Self {
            contact_type,
            value: value.to_string(),
        })
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Local (`0803...`, 11 digits) or international (`+234803...`) format.
fn is_phone(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    let all_digits = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    if value.starts_with('+') {
        all_digits && digits.starts_with("234") && digits.len() == 13
    } else {
        all_digits && digits.len() == 11
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub profile: BusinessProfile,
    pub otp_preference: OtpPreference,
}

impl Settings {
    pub fn apply(&mut self, update: ProfileUpdate) -> Result<()> {
        if let Some(email) = &update.email {
            if !is_email(email.trim()) {
                return Err(Error::validation("Invalid email address"));
            }
        }
        if let Some(phone) = &update.phone {
            if !is_phone(phone.trim()) {
                return Err(Error::validation("Invalid phone number"));
            }
        }

        let profile = &mut self.profile;
        let fields = [
            (&mut profile.business_name, update.business_name),
            (&mut profile.email, update.email),
            (&mut profile.phone, update.phone),
            (&mut profile.address, update.address),
            (&mut profile.industry, update.industry),
            (&mut profile.rc_number, update.rc_number),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value.trim().to_string();
            }
        }
        Ok(())
    }

    pub fn apply_contact(&mut self, change: ContactChange) {
        match change.contact_type {
            ContactType::Email => self.profile.email = change.value,
            ContactType::Phone => self.profile.phone = change.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut settings = Settings::default();
        settings
            .apply(ProfileUpdate {
                business_name: Some("Zenith Foods".to_string()),
                ..ProfileUpdate::default()
            })
            .unwrap();
        assert_eq!(settings.profile.business_name, "Zenith Foods");
        assert_eq!(settings.profile.email, BusinessProfile::default().email);
    }

    #[test]
    fn test_update_rejects_bad_contact_fields() {
        let mut settings = Settings::default();
        let result = settings.apply(ProfileUpdate {
            business_name: Some("Changed".to_string()),
            email: Some("not-an-email".to_string()),
            ..ProfileUpdate::default()
        });
        assert!(result.is_err());
        // Nothing applied on failure
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_contact_validation() {
        assert!(ContactChange::new(ContactType::Email, "ops@example.com").is_ok());
        assert!(ContactChange::new(ContactType::Email, "ops@example").is_err());
        assert!(ContactChange::new(ContactType::Email, "@example.com").is_err());
        assert!(ContactChange::new(ContactType::Phone, "08031234567").is_ok());
        assert!(ContactChange::new(ContactType::Phone, "+2348031234567").is_ok());
        assert!(ContactChange::new(ContactType::Phone, "0803123").is_err());
        assert!(ContactChange::new(ContactType::Phone, "+4478031234567").is_err());
    }

    #[test]
    fn test_apply_contact() {
        let mut settings = Settings::default();
        settings.apply_contact(ContactChange::new(ContactType::Phone, "+2348090000000").unwrap());
        assert_eq!(settings.profile.phone, "+2348090000000");
    }

    #[test]
    fn test_sms_preferences() {
        assert!(!OtpPreference::Email.uses_sms());
        assert!(OtpPreference::Sms.uses_sms());
        assert!(OtpPreference::Both.uses_sms());
    }
}
