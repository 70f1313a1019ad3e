use fatura_core::{CategoryResolver, CreditCard, Income, MacroCategory, Transaction};
use serde::Serialize;
use std::collections::HashMap;

/// Category name to macro-category lookup.
///
/// Categories missing from the book resolve to the default macro-category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryBook {
    macros: HashMap<String, MacroCategory>,
}

impl CategoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, macro_category: MacroCategory) {
        self.macros.insert(name.into(), macro_category);
    }

    pub fn get(&self, name: &str) -> Option<MacroCategory> {
        self.macros.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Category names sorted by macro-category, then name.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<(&MacroCategory, &String)> = self.macros.iter().map(|(n, m)| (m, n)).collect();
        names.sort();
        names.into_iter().map(|(_, n)| n.as_str()).collect()
    }
}

impl FromIterator<(String, MacroCategory)> for CategoryBook {
    fn from_iter<T: IntoIterator<Item = (String, MacroCategory)>>(iter: T) -> Self {
        Self {
            macros: iter.into_iter().collect(),
        }
    }
}

impl CategoryResolver for CategoryBook {
    fn macro_category(&self, tx: &Transaction) -> MacroCategory {
        self.get(&tx.category).unwrap_or_default()
    }
}

/// Everything known about one user, as loaded from disk.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    pub cards: Vec<CreditCard>,
    pub categories: CategoryBook,
    pub transactions: Vec<Transaction>,
    pub incomes: Vec<Income>,
}

impl Ledger {
    pub fn card(&self, id: &str) -> Option<&CreditCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// The card shown when none is requested: the first by name.
    pub fn default_card(&self) -> Option<&CreditCard> {
        self.cards.iter().min_by(|a, b| a.name.cmp(&b.name))
    }
}
