//! Payroll roster with bonus/deduction adjustments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::banks;
use crate::dto::deserialize_money;
use crate::error::{Error, Result};
use crate::ids::EmployeeId;
use crate::stores::{MemoryRepository, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Bonus,
    Deduction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub amount: Decimal,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollEmployee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub salary: Decimal,
    pub bonuses_total: Decimal,
    pub deductions_total: Decimal,
    pub net_salary: Decimal,
    pub bank_code: String,
    pub account_number: String,
    pub adjustments: Vec<Adjustment>,
}

impl PayrollEmployee {
    fn recompute(&mut self) {
        let total = |kind: AdjustmentKind| -> Decimal {
            self.adjustments
                .iter()
                .filter(|adjustment| adjustment.kind == kind)
                .map(|adjustment| adjustment.amount)
                .sum()
        };
        self.bonuses_total = total(AdjustmentKind::Bonus);
        self.deductions_total = total(AdjustmentKind::Deduction);
        self.net_salary = self.salary + self.bonuses_total - self.deductions_total;
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(deserialize_with = "deserialize_money")]
    pub salary: Decimal,
    pub bank_code: String,
    pub account_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustmentRequest {
    pub kind: AdjustmentKind,
    #[serde(deserialize_with = "deserialize_money")]
    pub amount: Decimal,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayrollSummary {
    pub employee_count: usize,
    pub total_salary: Decimal,
    pub total_bonuses: Decimal,
    pub total_deductions: Decimal,
    pub total_net: Decimal,
}

#[derive(Default)]
pub struct Payroll<R = MemoryRepository<EmployeeId, PayrollEmployee>> {
    employees: R,
}

impl Payroll {
    pub fn new() -> Self {
        Self::with_repository(MemoryRepository::new())
    }
}

impl<R: Repository<EmployeeId, PayrollEmployee>> Payroll<R> {
    pub fn with_repository(employees: R) -> Self {
        Self { employees }
    }

    /// Employees sorted by name.
    pub fn list(&self) -> Vec<PayrollEmployee> {
        let mut employees = self.employees.values();
        employees.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        employees
    }

    pub fn get(&self, id: EmployeeId) -> Result<PayrollEmployee> {
        self.employees.get(&id).ok_or(Error::EmployeeNotFound)
    }

    pub fn add(&mut self, new: NewEmployee) -> Result<PayrollEmployee> {
        if new.name.trim().is_empty() {
            return Err(Error::validation("name is required"));
        }
        if new.salary < Decimal::ZERO {
            return Err(Error::validation("salary cannot be negative"));
        }
        banks::find(&new.bank_code)?;
        if !banks::is_nuban(&new.account_number) {
            return Err(Error::InvalidAccountDetails);
        }

        let employee = PayrollEmployee {
            id: EmployeeId::new(),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            role: new.role.trim().to_string(),
            salary: new.salary,
            bonuses_total: Decimal::ZERO,
            deductions_total: Decimal::ZERO,
            net_salary: new.salary,
            bank_code: new.bank_code,
            account_number: new.account_number,
            adjustments: Vec::new(),
        };
        self.employees.put(employee.id, employee.clone());
        Ok(employee)
    }

    pub fn remove(&mut self, id: EmployeeId) -> Result<PayrollEmployee> {
        self.employees.delete(&id).ok_or(Error::EmployeeNotFound)
    }

    pub fn adjust(
        &mut self,
        id: EmployeeId,
        request: AdjustmentRequest,
        now: DateTime<Utc>,
    ) -> Result<PayrollEmployee> {
        if request.amount <= Decimal::ZERO {
            return Err(Error::AmountMustBePositive);
        }
        let mut employee = self.get(id)?;
        employee.adjustments.push(Adjustment {
            kind: request.kind,
            amount: request.amount,
            reason: request.reason,
            created_at: now,
        });
        employee.recompute();
        self.employees.put(id, employee.clone());
        Ok(employee)
    }

    pub fn summary(&self) -> PayrollSummary {
        self.employees
            .values()
            .into_iter()
            .fold(PayrollSummary::default(), |mut summary, employee| {
                summary.employee_count += 1;
                summary.total_salary += employee.salary;
                summary.total_bonuses += employee.bonuses_total;
                summary.total_deductions += employee.deductions_total;
                summary.total_net += employee.net_salary;
                summary
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_employee(name: &str, salary: Decimal) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            email: format!("{}@acme.ng", name.to_lowercase()),
            role: "Engineer".to_string(),
            salary,
            bank_code: "058".to_string(),
            account_number: "0123456789".to_string(),
        }
    }

    fn adjustment(kind: AdjustmentKind, amount: Decimal) -> AdjustmentRequest {
        AdjustmentRequest {
            kind,
            amount,
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_net_salary_recomputed_on_adjustment() {
        let mut payroll = Payroll::new();
        let employee = payroll.add(new_employee("Ada", dec!(300000))).unwrap();
        assert_eq!(employee.net_salary, dec!(300000));

        let now = Utc::now();
        payroll
            .adjust(employee.id, adjustment(AdjustmentKind::Bonus, dec!(50000)), now)
            .unwrap();
        let updated = payroll
            .adjust(employee.id, adjustment(AdjustmentKind::Deduction, dec!(20000)), now)
            .unwrap();

        assert_eq!(updated.bonuses_total, dec!(50000));
        assert_eq!(updated.deductions_total, dec!(20000));
        assert_eq!(updated.net_salary, dec!(330000));
        assert_eq!(updated.adjustments.len(), 2);
    }

    #[test]
    fn test_add_validates_input() {
        let mut payroll = Payroll::new();
        assert!(payroll.add(new_employee(" ", dec!(1))).is_err());
        assert!(payroll.add(new_employee("Ada", dec!(-1))).is_err());

        let mut bad_account = new_employee("Ada", dec!(1));
        bad_account.account_number = "123".to_string();
        assert_eq!(payroll.add(bad_account), Err(Error::InvalidAccountDetails));

        let mut bad_bank = new_employee("Ada", dec!(1));
        bad_bank.bank_code = "000".to_string();
        assert_eq!(payroll.add(bad_bank), Err(Error::BankNotFound));
    }

    #[test]
    fn test_unknown_employee() {
        let mut payroll = Payroll::new();
        let missing = EmployeeId::new();
        assert_eq!(payroll.get(missing), Err(Error::EmployeeNotFound));
        assert_eq!(payroll.remove(missing), Err(Error::EmployeeNotFound));
        assert_eq!(
            payroll.adjust(
                missing,
                adjustment(AdjustmentKind::Bonus, dec!(1)),
                Utc::now()
            ),
            Err(Error::EmployeeNotFound)
        );
    }

    #[test]
    fn test_summary_totals() {
        let mut payroll = Payroll::new();
        let ada = payroll.add(new_employee("Ada", dec!(100000))).unwrap();
        payroll.add(new_employee("Bola", dec!(200000))).unwrap();
        payroll
            .adjust(ada.id, adjustment(AdjustmentKind::Deduction, dec!(5000)), Utc::now())
            .unwrap();

        let summary = payroll.summary();
        assert_eq!(summary.employee_count, 2);
        assert_eq!(summary.total_salary, dec!(300000));
        assert_eq!(summary.total_deductions, dec!(5000));
        assert_eq!(summary.total_net, dec!(295000));

        let names: Vec<_> = payroll.list().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Ada", "Bola"]);
    }
}
