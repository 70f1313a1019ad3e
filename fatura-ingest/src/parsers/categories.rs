//! `categories.csv`: `name,macro_category`

use anyhow::{Context, Result};
use fatura_core::MacroCategory;
use serde::Deserialize;
use std::io::Read;
use tracing::warn;

use crate::types::CategoryBook;

#[derive(Debug, Deserialize)]
struct CategoryRow {
    name: String,
    #[serde(default)]
    macro_category: String,
}

pub fn parse_categories<R: Read>(input: R) -> Result<CategoryBook> {
    let mut rdr = super::reader(input);
    let mut book = CategoryBook::new();

    for (i, row) in rdr.deserialize::<CategoryRow>().enumerate() {
        let line = i + 2;
        let row = row.with_context(|| format!("categories.csv line {line}"))?;
        let macro_category = if row.macro_category.is_empty() {
            MacroCategory::default()
        } else {
            MacroCategory::from_name(&row.macro_category).unwrap_or_else(|| {
                warn!(line, category = %row.name, value = %row.macro_category, "unknown macro category, using default");
                MacroCategory::default()
            })
        };
        book.insert(row.name, macro_category);
    }

    Ok(book)
}
