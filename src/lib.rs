pub mod api;
pub mod banks;
pub mod config;
pub mod csv_utils;
pub mod dto;
pub mod engine;
pub mod error;
pub mod fees;
pub mod ids;
pub mod kyc;
pub mod payroll;
pub mod seed;
pub mod settings;
pub mod stores;

pub use engine::{Engine, EngineConfig};
pub use error::{Error, Result};
