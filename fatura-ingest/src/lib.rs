//! fatura-ingest: loads a user's ledger (cards, categories, purchases,
//! incomes) from CSV files into the records the billing engine works on.

pub mod loader;
pub mod parsers;
pub mod types;

pub use loader::{load_ledger, CARDS_FILE, CATEGORIES_FILE, INCOMES_FILE, TRANSACTIONS_FILE};
pub use types::{CategoryBook, Ledger};
