pub mod balance_calculator;
pub mod settlement_engine;
pub mod split_policy;

pub use balance_calculator::{BalanceCalculator, SettlementError};
pub use settlement_engine::SettlementEngine;
pub use split_policy::SplitPolicy;
