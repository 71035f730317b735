use rand::Rng;
use rust_decimal::Decimal;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::{MemoryRepository, Repository};
use crate::error::{Error, Result};
use crate::ids::{UserId, WalletId};

const NOT_CREATED: &str = "Not Created";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    User,
    Business,
}

/// Virtual account number of a wallet. Serialized as the number itself or
/// the `"Not Created"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountNumber {
    NotCreated,
    Assigned(String),
}

impl AccountNumber {
    pub fn is_assigned(&self) -> bool {
        matches!(self, AccountNumber::Assigned(_))
    }
}

impl Serialize for AccountNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AccountNumber::NotCreated => serializer.serialize_str(NOT_CREATED),
            AccountNumber::Assigned(number) => serializer.serialize_str(number),
        }
    }
}

impl<'de> Deserialize<'de> for AccountNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == NOT_CREATED {
            AccountNumber::NotCreated
        } else {
            AccountNumber::Assigned(raw)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub balance: Decimal,
    pub currency: String,
    pub account_number: AccountNumber,
    pub bank_name: String,
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

/// All wallets of one user: at most one personal and one business wallet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub user_wallet: Option<Wallet>,
    pub business_wallet: Option<Wallet>,
}

impl WalletInfo {
    pub fn wallet(&self, wallet_type: WalletType) -> Option<&Wallet> {
        match wallet_type {
            WalletType::User => self.user_wallet.as_ref(),
            WalletType::Business => self.business_wallet.as_ref(),
        }
    }

    fn wallet_mut(&mut self, wallet_type: WalletType) -> Option<&mut Wallet> {
        match wallet_type {
            WalletType::User => self.user_wallet.as_mut(),
            WalletType::Business => self.business_wallet.as_mut(),
        }
    }

    pub fn find(&self, id: WalletId) -> Option<&Wallet> {
        self.user_wallet
            .iter()
            .chain(self.business_wallet.iter())
            .find(|wallet| wallet.id == id)
    }

    fn find_mut(&mut self, id: WalletId) -> Option<&mut Wallet> {
        self.user_wallet
            .iter_mut()
            .chain(self.business_wallet.iter_mut())
            .find(|wallet| wallet.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct WalletSettings {
    pub currency: String,
    pub bank_name: String,
    pub business_bank_name: String,
    /// Assign a virtual account number when a wallet is provisioned. When
    /// off, wallets start with the "Not Created" sentinel until the user
    /// asks for a virtual account.
    pub auto_assign_virtual_account: bool,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            currency: "NGN".to_string(),
            bank_name: "Wema Bank".to_string(),
            business_bank_name: "Guaranty Trust Bank".to_string(),
            auto_assign_virtual_account: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VirtualAccountOutcome {
    Created(Wallet),
    AlreadyExists(Wallet),
}

pub struct WalletLedger<R = MemoryRepository<UserId, WalletInfo>> {
    wallets: R,
    settings: WalletSettings,
}

impl WalletLedger {
    pub fn new(settings: WalletSettings) -> Self {
        Self::with_repository(settings, MemoryRepository::new())
    }
}

impl<R: Repository<UserId, WalletInfo>> WalletLedger<R> {
    pub fn with_repository(settings: WalletSettings, wallets: R) -> Self {
        Self { wallets, settings }
    }

    pub fn settings(&self) -> &WalletSettings {
        &self.settings
    }

    pub fn info(&self, user: UserId) -> WalletInfo {
        self.wallets.get(&user).unwrap_or_default()
    }

    /// Creates the user's personal wallet if it doesn't exist yet.
    /// An existing wallet is returned untouched.
    pub fn ensure(&mut self, user: UserId) -> Wallet {
        let mut info = self.info(user);
        if let Some(wallet) = &info.user_wallet {
            return wallet.clone();
        }

        let account_number = if self.settings.auto_assign_virtual_account {
            AccountNumber::Assigned(self.fresh_account_number())
        } else {
            AccountNumber::NotCreated
        };
        let wallet = Wallet {
            id: WalletId::new(),
            balance: Decimal::ZERO,
            currency: self.settings.currency.clone(),
            account_number,
            bank_name: self.settings.bank_name.clone(),
            wallet_type: WalletType::User,
            business_name: None,
        };
        info.user_wallet = Some(wallet.clone());
        self.wallets.put(user, info);
        tracing::info!(%user, wallet = %wallet.id, "User wallet provisioned");
        wallet
    }

    /// Adds `amount` to the user's wallet of the given type.
    pub fn credit(
        &mut self,
        user: UserId,
        wallet_type: WalletType,
        amount: Decimal,
    ) -> Result<Wallet> {
        if amount <= Decimal::ZERO {
            return Err(Error::AmountMustBePositive);
        }
        let mut info = self.info(user);
        let wallet = info.wallet_mut(wallet_type).ok_or(Error::WalletNotFound)?;
        wallet.balance += amount;
        let updated = wallet.clone();
        self.wallets.put(user, info);
        Ok(updated)
    }

    /// Returns the wallet with `id` if it belongs to `user`.
    pub fn owned(&self, user: UserId, id: WalletId) -> Result<Wallet> {
        self.info(user).find(id).cloned().ok_or(Error::WalletNotFound)
    }

    /// Checks that a debit of `amount` from wallet `id` would succeed.
    pub fn check_debit(&self, user: UserId, id: WalletId, amount: Decimal) -> Result<Wallet> {
        if amount <= Decimal::ZERO {
            return Err(Error::AmountMustBePositive);
        }
        let wallet = self.owned(user, id)?;
        if wallet.balance < amount {
            return Err(Error::InsufficientFunds);
        }
        Ok(wallet)
    }

    pub fn debit(&mut self, user: UserId, id: WalletId, amount: Decimal) -> Result<Wallet> {
        self.check_debit(user, id, amount)?;
        let mut info = self.info(user);
        let wallet = info.find_mut(id).ok_or(Error::WalletNotFound)?;
        wallet.balance -= amount;
        let updated = wallet.clone();
        self.wallets.put(user, info);
        Ok(updated)
    }

    /// Attaches a business wallet backed by an existing business bank account.
    pub fn attach_business_wallet(
        &mut self,
        user: UserId,
        account_number: &str,
        business_name: &str,
    ) -> Result<Wallet> {
        let mut info = self.info(user);
        if info.business_wallet.is_some() {
            return Err(Error::BusinessWalletExists);
        }
        let wallet = Wallet {
            id: WalletId::new(),
            balance: Decimal::ZERO,
            currency: self.settings.currency.clone(),
            account_number: AccountNumber::Assigned(account_number.to_string()),
            bank_name: self.settings.business_bank_name.clone(),
            wallet_type: WalletType::Business,
            business_name: Some(business_name.to_string()),
        };
        info.business_wallet = Some(wallet.clone());
        self.wallets.put(user, info);
        tracing::info!(%user, wallet = %wallet.id, "Business wallet attached");
        Ok(wallet)
    }

    /// Assigns a virtual account number to the user wallet if it still has
    /// the "Not Created" sentinel. The wallet is provisioned first if absent.
    pub fn assign_virtual_account(&mut self, user: UserId) -> VirtualAccountOutcome {
        let existing = self.ensure(user);
        if existing.account_number.is_assigned() {
            return VirtualAccountOutcome::AlreadyExists(existing);
        }

        let number = self.fresh_account_number();
        let mut info = self.info(user);
        let Some(wallet) = info.user_wallet.as_mut() else {
            return VirtualAccountOutcome::AlreadyExists(existing);
        };
        wallet.account_number = AccountNumber::Assigned(number);
        let updated = wallet.clone();
        self.wallets.put(user, info);
        VirtualAccountOutcome::Created(updated)
    }

    fn fresh_account_number(&self) -> String {
        let taken: Vec<String> = self
            .wallets
            .values()
            .into_iter()
            .flat_map(|info| [info.user_wallet, info.business_wallet])
            .flatten()
            .filter_map(|wallet| match wallet.account_number {
                AccountNumber::Assigned(number) => Some(number),
                AccountNumber::NotCreated => None,
            })
            .collect();
        let mut rng = rand::thread_rng();
        loop {
            let candidate = format!("{}", rng.gen_range(1_000_000_000u64..10_000_000_000));
            if !taken.contains(&candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ledger() -> WalletLedger {
        WalletLedger::new(WalletSettings::default())
    }

    #[test]
    fn test_ensure_creates_zero_balance_wallet_once() {
        let mut ledger = ledger();
        let user = UserId::new();

        let first = ledger.ensure(user);
        assert_eq!(first.balance, Decimal::ZERO);
        assert_eq!(first.wallet_type, WalletType::User);
        match &first.account_number {
            AccountNumber::Assigned(number) => assert_eq!(number.len(), 10),
            AccountNumber::NotCreated => panic!("expected an assigned account number"),
        }

        ledger.credit(user, WalletType::User, dec!(100)).unwrap();
        let second = ledger.ensure(user);
        assert_eq!(second.id, first.id);
        assert_eq!(second.balance, dec!(100));
    }

    #[test]
    fn test_credit_is_not_deduplicated() {
        let mut ledger = ledger();
        let user = UserId::new();
        ledger.ensure(user);

        ledger.credit(user, WalletType::User, dec!(5000)).unwrap();
        let wallet = ledger.credit(user, WalletType::User, dec!(5000)).unwrap();
        assert_eq!(wallet.balance, dec!(10000));
    }

    #[test]
    fn test_credit_missing_wallet() {
        let mut ledger = ledger();
        let user = UserId::new();
        assert_eq!(
            ledger.credit(user, WalletType::Business, dec!(10)),
            Err(Error::WalletNotFound)
        );
    }

    #[test]
    fn test_credit_rejects_non_positive_amount() {
        let mut ledger = ledger();
        let user = UserId::new();
        ledger.ensure(user);
        assert_eq!(
            ledger.credit(user, WalletType::User, Decimal::ZERO),
            Err(Error::AmountMustBePositive)
        );
    }

    #[test]
    fn test_debit_checks_balance_and_owner() {
        let mut ledger = ledger();
        let user = UserId::new();
        let stranger = UserId::new();
        let wallet = ledger.ensure(user);
        ledger.credit(user, WalletType::User, dec!(50)).unwrap();

        assert_eq!(
            ledger.debit(user, wallet.id, dec!(50.01)),
            Err(Error::InsufficientFunds)
        );
        assert_eq!(
            ledger.debit(stranger, wallet.id, dec!(1)),
            Err(Error::WalletNotFound)
        );
        let debited = ledger.debit(user, wallet.id, dec!(20)).unwrap();
        assert_eq!(debited.balance, dec!(30));
    }

    #[test]
    fn test_business_wallet_attached_once() {
        let mut ledger = ledger();
        let user = UserId::new();

        let wallet = ledger
            .attach_business_wallet(user, "0123456789", "Acme Ltd")
            .unwrap();
        assert_eq!(wallet.wallet_type, WalletType::Business);
        assert_eq!(wallet.business_name.as_deref(), Some("Acme Ltd"));
        assert_eq!(
            ledger.attach_business_wallet(user, "0123456789", "Acme Ltd"),
            Err(Error::BusinessWalletExists)
        );
        // The personal wallet is not created as a side effect
        assert!(ledger.info(user).user_wallet.is_none());
    }

    #[test]
    fn test_virtual_account_assigned_only_from_sentinel() {
        let mut ledger = WalletLedger::new(WalletSettings {
            auto_assign_virtual_account: false,
            ..WalletSettings::default()
        });
        let user = UserId::new();

        let wallet = ledger.ensure(user);
        assert_eq!(wallet.account_number, AccountNumber::NotCreated);

        let created = match ledger.assign_virtual_account(user) {
            VirtualAccountOutcome::Created(wallet) => wallet,
            other => panic!("expected creation, got {:?}", other),
        };
        assert!(created.account_number.is_assigned());

        match ledger.assign_virtual_account(user) {
            VirtualAccountOutcome::AlreadyExists(wallet) => {
                assert_eq!(wallet.account_number, created.account_number)
            }
            other => panic!("expected no-op, got {:?}", other),
        }
    }

    #[test]
    fn test_account_number_serialization() {
        assert_eq!(
            serde_json::to_string(&AccountNumber::NotCreated).unwrap(),
            "\"Not Created\""
        );
        let parsed: AccountNumber = serde_json::from_str("\"0123456789\"").unwrap();
        assert_eq!(parsed, AccountNumber::Assigned("0123456789".to_string()));
    }
}
