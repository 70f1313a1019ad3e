//! fatura-core: billing-cycle engine for credit card bills and monthly views
//!
//! Everything here is a pure function over in-memory records. Loading the
//! records and presenting the results belong to the callers.

pub mod aggregate;
pub mod calendar;
pub mod cards;
pub mod cycle;
pub mod error;
pub mod installments;
pub mod ledger;
pub mod periods;

pub use aggregate::{
    card_bill, due_in_month, due_in_month_where, monthly_balance, statement, sum_by_category,
    sum_by_key, sum_by_macro_category, BillFilter, CardBill, MonthlyBalance, Statement,
};
pub use calendar::Period;
pub use cards::{card_exposure, BillSummary, CardExposure};
pub use cycle::{first_due_date, legacy_first_due_date, CardCycle, CycleConfig, LegacyCycle};
pub use error::{BillingError, Result};
pub use installments::{allocate, allocate_with, InstallmentAllocation, Installments};
pub use ledger::{
    AssignedCard, CategoryResolver, CreditCard, Income, MacroCategory, PaymentMethod, Transaction,
};
pub use periods::{discover, AvailablePeriods, YearMonths};
