//! Reads a ledger directory.
//!
//! Layout:
//!   <dir>/cards.csv
//!   <dir>/categories.csv
//!   <dir>/transactions.csv
//!   <dir>/incomes.csv
//!
//! A missing file reads as empty; a missing directory is an error.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::parsers::{
    cards::parse_cards, categories::parse_categories, incomes::parse_incomes,
    transactions::parse_transactions,
};
use crate::types::{CategoryBook, Ledger};

pub const CARDS_FILE: &str = "cards.csv";
pub const CATEGORIES_FILE: &str = "categories.csv";
pub const TRANSACTIONS_FILE: &str = "transactions.csv";
pub const INCOMES_FILE: &str = "incomes.csv";

fn open_optional(dir: &Path, name: &str) -> Result<Option<File>> {
    let path = dir.join(name);
    if !path.exists() {
        debug!(path = %path.display(), "ledger file missing, treating as empty");
        return Ok(None);
    }
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    Ok(Some(file))
}

pub fn load_ledger(dir: impl AsRef<Path>) -> Result<Ledger> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        bail!("ledger directory not found: {}", dir.display());
    }

    let cards = match open_optional(dir, CARDS_FILE)? {
        Some(f) => parse_cards(f)?,
        None => Vec::new(),
    };
    let categories = match open_optional(dir, CATEGORIES_FILE)? {
        Some(f) => parse_categories(f)?,
        None => CategoryBook::new(),
    };
    let transactions = match open_optional(dir, TRANSACTIONS_FILE)? {
        Some(f) => parse_transactions(f, &cards)?,
        None => Vec::new(),
    };
    let incomes = match open_optional(dir, INCOMES_FILE)? {
        Some(f) => parse_incomes(f)?,
        None => Vec::new(),
    };

    info!(
        dir = %dir.display(),
        cards = cards.len(),
        categories = categories.len(),
        transactions = transactions.len(),
        incomes = incomes.len(),
        "ledger loaded"
    );

    Ok(Ledger {
        cards,
        categories,
        transactions,
        incomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_ledger(tmp.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("ledger directory not found"));
    }

    #[test]
    fn test_missing_files_read_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(INCOMES_FILE),
            "id,description,amount,date\ni1,Salário,100,2024-01-05\n",
        )
        .unwrap();
        let ledger = load_ledger(tmp.path()).unwrap();
        assert!(ledger.cards.is_empty());
        assert!(ledger.transactions.is_empty());
        assert!(ledger.categories.is_empty());
        assert_eq!(ledger.incomes.len(), 1);
    }
}
