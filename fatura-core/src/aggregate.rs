//! Monthly views over a set of purchases.
//!
//! Credit purchases count in the month an installment falls due; everything
//! else counts in the month it was purchased. Credit purchases without a card
//! are left out of every bill.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

use crate::calendar::Period;
use crate::error::Result;
use crate::installments::{allocate, InstallmentAllocation};
use crate::ledger::{CategoryResolver, Income, MacroCategory, PaymentMethod, Transaction};

/// Optional narrowing applied to purchases before they are matched.
///
/// Text filters are case-insensitive substring matches; `category` and
/// `card_id` must match exactly. `methods: None` admits every method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillFilter {
    pub store: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub card_id: Option<String>,
    pub methods: Option<Vec<PaymentMethod>>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl BillFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(store) = self.store.as_deref().filter(|s| !s.is_empty()) {
            if !contains_ci(&tx.store, store) {
                return false;
            }
        }
        if let Some(text) = self.description.as_deref().filter(|s| !s.is_empty()) {
            if !contains_ci(tx.description.as_deref().unwrap_or(""), text) {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref() {
            if tx.category != category {
                return false;
            }
        }
        if let Some(card_id) = self.card_id.as_deref() {
            if tx.card_id() != Some(card_id) {
                return false;
            }
        }
        if let Some(methods) = &self.methods {
            if !methods.contains(&tx.payment_method) {
                return false;
            }
        }
        true
    }
}

/// First installment due in `period`.
///
/// Installments come in strictly increasing months, so the scan stops at the
/// first match and also as soon as an installment lands after `period`.
pub fn first_due_in_period<'a, I>(installments: I, period: Period) -> Option<InstallmentAllocation<'a>>
where
    I: IntoIterator<Item = InstallmentAllocation<'a>>,
{
    for installment in installments {
        match installment.period().cmp(&period) {
            Ordering::Less => continue,
            Ordering::Equal => return Some(installment),
            Ordering::Greater => return None,
        }
    }
    None
}

/// The part of `tx` owed in `period`, if any.
pub fn installment_due_in(tx: &Transaction, period: Period) -> Result<Option<InstallmentAllocation<'_>>> {
    if tx.is_credit() && tx.card.is_none() {
        debug!(transaction = %tx.id, "credit purchase without card left out of billing");
        return Ok(None);
    }
    Ok(first_due_in_period(allocate(tx)?, period))
}

/// Everything owed in `period`, sorted by purchase date.
pub fn due_in_month<'a, I>(transactions: I, period: Period) -> Result<Vec<InstallmentAllocation<'a>>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    due_in_month_where(transactions, period, |_| true)
}

/// Like `due_in_month`, keeping only purchases accepted by `predicate`.
pub fn due_in_month_where<'a, I, P>(
    transactions: I,
    period: Period,
    predicate: P,
) -> Result<Vec<InstallmentAllocation<'a>>>
where
    I: IntoIterator<Item = &'a Transaction>,
    P: Fn(&Transaction) -> bool,
{
    let mut out = Vec::new();
    for tx in transactions {
        if !predicate(tx) {
            continue;
        }
        if let Some(installment) = installment_due_in(tx, period)? {
            out.push(installment);
        }
    }
    out.sort_by_key(|a| a.transaction.purchase_date);
    Ok(out)
}

/// Sum of amounts owed in `period`, grouped by `key_fn`.
pub fn sum_by_key<'a, I, K, F>(transactions: I, period: Period, key_fn: F) -> Result<HashMap<K, Decimal>>
where
    I: IntoIterator<Item = &'a Transaction>,
    K: Eq + Hash,
    F: Fn(&'a Transaction) -> K,
{
    let mut totals: HashMap<K, Decimal> = HashMap::new();
    for tx in transactions {
        if let Some(installment) = installment_due_in(tx, period)? {
            *totals.entry(key_fn(tx)).or_insert(Decimal::ZERO) += installment.amount;
        }
    }
    Ok(totals)
}

/// Amounts owed in `period` per category name.
pub fn sum_by_category<'a, I, R>(transactions: I, period: Period, resolver: &R) -> Result<HashMap<String, Decimal>>
where
    I: IntoIterator<Item = &'a Transaction>,
    R: CategoryResolver + ?Sized,
{
    sum_by_key(transactions, period, |tx| resolver.category_name(tx).to_string())
}

/// Amounts owed in `period` per macro-category.
pub fn sum_by_macro_category<'a, I, R>(
    transactions: I,
    period: Period,
    resolver: &R,
) -> Result<HashMap<MacroCategory, Decimal>>
where
    I: IntoIterator<Item = &'a Transaction>,
    R: CategoryResolver + ?Sized,
{
    sum_by_key(transactions, period, |tx| resolver.macro_category(tx))
}

/// One card's bill for a month.
#[derive(Debug, Clone, Serialize)]
pub struct CardBill<'a> {
    pub card_id: String,
    pub period: Period,
    pub lines: Vec<InstallmentAllocation<'a>>,
    pub total: Decimal,
}

/// The bill of `card_id` due in `period`, narrowed by `filter`.
pub fn card_bill<'a, I>(transactions: I, card_id: &str, period: Period, filter: &BillFilter) -> Result<CardBill<'a>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let lines = due_in_month_where(transactions, period, |tx| {
        tx.card_id() == Some(card_id) && filter.matches(tx)
    })?;
    let total = lines.iter().map(|l| l.amount).sum();
    Ok(CardBill {
        card_id: card_id.to_string(),
        period,
        lines,
        total,
    })
}

/// Purchases made in a month, whatever the payment method.
#[derive(Debug, Clone, Serialize)]
pub struct Statement<'a> {
    pub period: Period,
    pub transactions: Vec<&'a Transaction>,
    /// Full purchase values, installments not split
    pub total: Decimal,
}

pub fn statement<'a, I>(transactions: I, period: Period, filter: &BillFilter) -> Statement<'a>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut selected: Vec<&Transaction> = transactions
        .into_iter()
        .filter(|tx| period.contains(tx.purchase_date) && filter.matches(tx))
        .collect();
    selected.sort_by_key(|tx| tx.purchase_date);
    let total = selected.iter().map(|tx| tx.total_amount).sum();
    Statement {
        period,
        transactions: selected,
        total,
    }
}

/// Income against spending for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBalance {
    pub period: Period,
    pub income: Decimal,
    /// Card installments due this month, across all cards
    pub card_bills: Decimal,
    /// Non-credit purchases made this month
    pub direct_spending: Decimal,
    pub spending: Decimal,
    pub balance: Decimal,
}

pub fn monthly_balance<'a, T, N>(transactions: T, incomes: N, period: Period) -> Result<MonthlyBalance>
where
    T: IntoIterator<Item = &'a Transaction>,
    N: IntoIterator<Item = &'a Income>,
{
    let income: Decimal = incomes
        .into_iter()
        .filter(|i| period.contains(i.received_on))
        .map(|i| i.amount)
        .sum();

    let mut card_bills = Decimal::ZERO;
    let mut direct_spending = Decimal::ZERO;
    for tx in transactions {
        if tx.is_credit() {
            if let Some(installment) = installment_due_in(tx, period)? {
                card_bills += installment.amount;
            }
        } else if period.contains(tx.purchase_date) {
            direct_spending += tx.total_amount;
        }
    }

    let spending = card_bills + direct_spending;
    Ok(MonthlyBalance {
        period,
        income,
        card_bills,
        direct_spending,
        spending,
        balance: income - spending,
    })
}
