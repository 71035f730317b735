pub mod fees;
pub mod health;
pub mod kyc;
pub mod payroll;
pub mod settings;
pub mod transfers;
pub mod wallet;
