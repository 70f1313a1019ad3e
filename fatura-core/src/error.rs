//! Errors raised by the billing engine.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Closing or due day outside 1..=31. Callers must reject the card
    /// configuration before it reaches the engine.
    #[error("invalid cycle config: closing day {closing_day}, due day {due_day} (both must be 1..=31)")]
    InvalidCycleConfig { closing_day: u32, due_day: u32 },

    /// A credit purchase with no card assigned cannot be billed.
    #[error("credit transaction {transaction_id} has no card assigned")]
    MissingCardAssignment { transaction_id: String },

    #[error("adding {months} month(s) to {date} leaves the supported calendar range")]
    DateOutOfRange { date: NaiveDate, months: u32 },
}

pub type Result<T> = std::result::Result<T, BillingError>;
