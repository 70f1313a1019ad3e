//! Field-level parsing shared by the CSV readers.
//!
//! Dates: `2024-01-15` or `15/01/2024`.
//! Amounts: `1234.56`, `1.234,56`, `1234,56`, optionally prefixed by `R$`.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

static PLAIN_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").expect("valid amount regex"));

// Comma decimals, dots as optional thousands separators.
static COMMA_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d{1,3}(?:\.\d{3})+|\d+),\d+$").expect("valid amount regex")
});

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|e| anyhow!("invalid date '{s}': {e}"))
}

pub fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned: String = s
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let normalized = if PLAIN_AMOUNT.is_match(&cleaned) {
        cleaned
    } else if COMMA_AMOUNT.is_match(&cleaned) {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        return Err(anyhow!("invalid amount '{}'", s.trim()));
    };

    normalized
        .parse::<Decimal>()
        .with_context(|| format!("invalid amount '{}'", s.trim()))
}

/// Parse a day-of-month column. Range checks belong to the billing engine.
pub fn parse_day(s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .with_context(|| format!("invalid day '{}'", s.trim()))
}

/// Empty cells read as `None`.
pub fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}
