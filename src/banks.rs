//! Bank catalogue and beneficiary account-name resolution.
//!
//! Resolution is a mock: any well-formed NUBAN at a known bank resolves to a
//! deterministic name. The result is advisory and the transfer workflow
//! does not check it again.

use serde::Serialize;

use crate::dto::AccountLookup;
use crate::error::{Error, Result};

const NUBAN_LENGTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bank {
    pub code: &'static str,
    pub name: &'static str,
}

pub const BANKS: &[Bank] = &[
    Bank { code: "044", name: "Access Bank" },
    Bank { code: "023", name: "Citibank Nigeria" },
    Bank { code: "050", name: "Ecobank Nigeria" },
    Bank { code: "070", name: "Fidelity Bank" },
    Bank { code: "011", name: "First Bank of Nigeria" },
    Bank { code: "214", name: "First City Monument Bank" },
    Bank { code: "058", name: "Guaranty Trust Bank" },
    Bank { code: "50211", name: "Kuda Microfinance Bank" },
    Bank { code: "999992", name: "OPay" },
    Bank { code: "232", name: "Sterling Bank" },
    Bank { code: "033", name: "United Bank for Africa" },
    Bank { code: "035", name: "Wema Bank" },
    Bank { code: "057", name: "Zenith Bank" },
];

const MOCK_ACCOUNT_NAMES: &[&str] = &[
    "ADAEZE OKONKWO",
    "BABATUNDE ADEYEMI",
    "CHINEDU EZE",
    "FATIMA BELLO",
    "IFEOMA NWOSU",
    "MUSA ABUBAKAR",
    "NGOZI OKAFOR",
    "OLUWASEUN BALOGUN",
    "TEMITOPE ADEBAYO",
    "YUSUF IBRAHIM",
];

pub fn find(code: &str) -> Result<Bank> {
    BANKS
        .iter()
        .copied()
        .find(|bank| bank.code == code)
        .ok_or(Error::BankNotFound)
}

/// A NUBAN is exactly ten ASCII digits.
pub fn is_nuban(account_number: &str) -> bool {
    account_number.len() == NUBAN_LENGTH && account_number.chars().all(|c| c.is_ascii_digit())
}

pub fn resolve_account_name(bank_code: &str, account_number: &str) -> Result<AccountLookup> {
    let account_number = account_number.trim();
    if !is_nuban(account_number) || find(bank_code).is_err() {
        return Err(Error::InvalidAccountDetails);
    }
    let digit_sum: usize = account_number
        .bytes()
        .map(|digit| usize::from(digit - b'0'))
        .sum();
    Ok(AccountLookup {
        account_name: MOCK_ACCOUNT_NAMES[digit_sum % MOCK_ACCOUNT_NAMES.len()].to_string(),
        account_number: account_number.to_string(),
        bank_code: bank_code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_bank() {
        assert_eq!(find("058").unwrap().name, "Guaranty Trust Bank");
        assert_eq!(find("000"), Err(Error::BankNotFound));
    }

    #[test]
    fn test_resolves_ten_digit_accounts() {
        let lookup = resolve_account_name("058", "0123456789").unwrap();
        assert_eq!(lookup.account_number, "0123456789");
        assert!(!lookup.account_name.is_empty());

        // Same input, same name
        assert_eq!(resolve_account_name("058", "0123456789").unwrap(), lookup);
    }

    #[test]
    fn test_rejects_other_lengths() {
        for number in ["012345678", "01234567890", "", "01234abcde"] {
            assert_eq!(
                resolve_account_name("058", number),
                Err(Error::InvalidAccountDetails)
            );
        }
    }

    #[test]
    fn test_rejects_unknown_bank() {
        assert_eq!(
            resolve_account_name("999", "0123456789"),
            Err(Error::InvalidAccountDetails)
        );
    }
}
