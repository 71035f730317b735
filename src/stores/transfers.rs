//! Transfer history storage.
//!
//! Keeps every transfer the workflow has produced for:
//! - Listing with search, status and date filters
//! - Retrying a transfer by id
//! - Exporting history

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MemoryRepository, Repository};
use crate::dto::{Page, Pagination};
use crate::error::{Error, Result};
use crate::ids::{TransferId, WalletId};

const DEFAULT_PAGE_LIMIT: u32 = 10;
const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Single,
    Bulk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransferStatus,
    pub recipient_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub kind: TransferKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<WalletId>,
    pub item_count: u32,
}

/// Filters and pagination for listing transfers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferQuery {
    pub search: Option<String>,
    pub status: Option<TransferStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TransferQuery {
    fn matches(&self, transfer: &Transfer) -> bool {
        if let Some(status) = self.status {
            if transfer.status != status {
                return false;
            }
        }
        let day = transfer.created_at.date_naive();
        if self.start_date.is_some_and(|start| day < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| day > end) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                transfer.recipient_name.to_lowercase().contains(&term)
                    || transfer.id.to_string().contains(&term)
            }
            _ => true,
        }
    }

    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }
}

#[derive(Default)]
pub struct TransferStore<R = MemoryRepository<TransferId, Transfer>> {
    transfers: R,
}

impl TransferStore {
    pub fn new() -> Self {
        Self::with_repository(MemoryRepository::new())
    }
}

impl<R: Repository<TransferId, Transfer>> TransferStore<R> {
    pub fn with_repository(transfers: R) -> Self {
        Self { transfers }
    }

    pub fn insert(&mut self, transfer: Transfer) {
        self.transfers.put(transfer.id, transfer);
    }

    pub fn get(&self, id: TransferId) -> Result<Transfer> {
        self.transfers.get(&id).ok_or(Error::TransferNotFound)
    }

    /// Forces a transfer to `success`, whatever its current status.
    pub fn mark_success(&mut self, id: TransferId) -> Result<Transfer> {
        let mut transfer = self.get(id)?;
        transfer.status = TransferStatus::Success;
        transfer.failure_reason = None;
        self.transfers.put(id, transfer.clone());
        Ok(transfer)
    }

    /// All transfers matching the query's filters, newest first.
    pub fn matching(&self, query: &TransferQuery) -> Vec<Transfer> {
        let mut matching: Vec<Transfer> = self
            .transfers
            .values()
            .into_iter()
            .filter(|transfer| query.matches(transfer))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        matching
    }

    pub fn query(&self, query: &TransferQuery) -> Page<Transfer> {
        let matching = self.matching(query);
        let page = query.page();
        let limit = query.limit();
        let total = matching.len() as u64;
        let skip = (page as usize - 1) * limit as usize;
        let data = matching.into_iter().skip(skip).take(limit as usize).collect();
        Page {
            data,
            pagination: Pagination::new(page, limit, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn transfer(name: &str, status: TransferStatus, day: u32) -> Transfer {
        Transfer {
            id: TransferId::new(),
            amount: dec!(1000),
            currency: "NGN".to_string(),
            status,
            recipient_name: name.to_string(),
            failure_reason: (status == TransferStatus::Failed)
                .then(|| "Beneficiary bank unavailable".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 0).unwrap(),
            kind: TransferKind::Single,
            bank_code: Some("058".to_string()),
            account_number: Some("0123456789".to_string()),
            remark: None,
            wallet_id: None,
            item_count: 1,
        }
    }

    fn store() -> TransferStore {
        let mut store = TransferStore::new();
        store.insert(transfer("Ada Obi", TransferStatus::Success, 1));
        store.insert(transfer("Tunde Bakare", TransferStatus::Failed, 5));
        store.insert(transfer("Ada Lovelace", TransferStatus::Pending, 10));
        store
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = TransferStore::new();
        assert_eq!(store.query(&TransferQuery::default()).pagination.total, 0);
        assert_eq!(store.get(TransferId::new()), Err(Error::TransferNotFound));
    }

    #[test]
    fn test_query_orders_newest_first() {
        let page = store().query(&TransferQuery::default());
        let names: Vec<_> = page.data.iter().map(|t| t.recipient_name.as_str()).collect();
        assert_eq!(names, vec!["Ada Lovelace", "Tunde Bakare", "Ada Obi"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = TransferQuery {
            search: Some("ada".to_string()),
            ..TransferQuery::default()
        };
        assert_eq!(store().query(&query).pagination.total, 2);
    }

    #[test]
    fn test_status_and_date_filters() {
        let store = store();
        let failed = TransferQuery {
            status: Some(TransferStatus::Failed),
            ..TransferQuery::default()
        };
        assert_eq!(store.query(&failed).data[0].recipient_name, "Tunde Bakare");

        // Both bounds are inclusive
        let window = TransferQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            ..TransferQuery::default()
        };
        assert_eq!(store.query(&window).pagination.total, 2);
    }

    #[test]
    fn test_pagination() {
        let query = TransferQuery {
            page: Some(2),
            limit: Some(2),
            ..TransferQuery::default()
        };
        let page = store().query(&query);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.data[0].recipient_name, "Ada Obi");
    }

    #[test]
    fn test_mark_success_clears_failure_reason() {
        let mut store = store();
        let failed = store.matching(&TransferQuery {
            status: Some(TransferStatus::Failed),
            ..TransferQuery::default()
        })[0]
            .clone();

        let retried = store.mark_success(failed.id).unwrap();
        assert_eq!(retried.status, TransferStatus::Success);
        assert_eq!(retried.failure_reason, None);
        assert_eq!(store.get(failed.id).unwrap(), retried);
    }

    #[test]
    fn test_mark_success_unknown_id() {
        let mut store = store();
        assert_eq!(
            store.mark_success(TransferId::new()),
            Err(Error::TransferNotFound)
        );
    }
}
