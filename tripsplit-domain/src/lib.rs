#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    Allocations, Expense, ExpenseError, ExpenseId, MemberBalances, Money, Participant,
    ParticipantId, Roster, SettlementTransaction, Transfer,
};
pub use services::{BalanceCalculator, SettlementEngine, SettlementError, SplitPolicy};
