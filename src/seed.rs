//! Demo records loaded at startup when `seed_demo_data` is on, so the
//! dashboard has history to show before any real activity.

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use crate::engine::Engine;
use crate::error::Result;
use crate::ids::TransferId;
use crate::payroll::NewEmployee;
use crate::stores::{Transfer, TransferKind, TransferStatus};

pub fn seed_demo_data(engine: &mut Engine) -> Result<()> {
    let now = Utc::now();
    let history = [
        ("Adaeze Okonkwo", dec!(45000), TransferStatus::Success, None, 1),
        ("Babatunde Adeyemi", dec!(12500), TransferStatus::Success, None, 2),
        (
            "Fatima Bello",
            dec!(3200),
            TransferStatus::Failed,
            Some("Beneficiary bank unavailable"),
            3,
        ),
        ("Yusuf Ibrahim", dec!(78000), TransferStatus::Processing, None, 4),
        ("Ngozi Okafor", dec!(9000), TransferStatus::Pending, None, 6),
    ];
    for (recipient, amount, status, failure_reason, days_ago) in history {
        engine.import_transfer(Transfer {
            id: TransferId::new(),
            amount,
            currency: "NGN".to_string(),
            status,
            recipient_name: recipient.to_string(),
            failure_reason: failure_reason.map(str::to_string),
            created_at: now - Duration::days(days_ago),
            kind: TransferKind::Single,
            bank_code: Some("058".to_string()),
            account_number: Some("0123456789".to_string()),
            remark: None,
            wallet_id: None,
            item_count: 1,
        });
    }

    let staff = [
        ("Chinedu Eze", "Engineering Lead", dec!(850000), "057", "2034567811"),
        ("Ifeoma Nwosu", "Operations", dec!(420000), "044", "0691234578"),
        ("Musa Abubakar", "Sales", dec!(380000), "033", "2145678902"),
    ];
    for (name, role, salary, bank_code, account_number) in staff {
        engine.add_employee(NewEmployee {
            name: name.to_string(),
            email: format!("{}@acmeventures.ng", name.to_lowercase().replace(' ', ".")),
            role: role.to_string(),
            salary,
            bank_code: bank_code.to_string(),
            account_number: account_number.to_string(),
        })?;
    }

    tracing::info!(
        transfers = history.len(),
        employees = staff.len(),
        "Demo data seeded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::TransferQuery;

    #[test]
    fn test_seed_includes_failed_transfer() {
        let mut engine = Engine::default();
        seed_demo_data(&mut engine).unwrap();

        let failed = engine.transfers(&TransferQuery {
            status: Some(TransferStatus::Failed),
            ..TransferQuery::default()
        });
        assert_eq!(failed.data.len(), 1);
        assert!(failed.data[0].failure_reason.is_some());
        assert_eq!(engine.employees().len(), 3);
    }
}
