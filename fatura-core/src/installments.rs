//! Installment allocation: spreads a purchase over the months it is billed in.
//!
//! Installment `i` (0-based) is due `first_due + i` months. Each offset is
//! taken from the first due date, so a due day of 31 comes back to the 31st
//! after passing through a shorter month.
//!
//! Every installment carries the same amount: the total divided by the count,
//! truncated to cents. Uneven totals therefore lose the remainder cents
//! (100.00 / 3 = 3 x 33.33); nothing rebalances the last installment.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::calendar::{add_months, Period};
use crate::cycle::CycleConfig;
use crate::error::{BillingError, Result};
use crate::ledger::Transaction;

/// Decimal places kept on installment amounts.
pub const MONEY_SCALE: u32 = 2;

/// One monthly slice of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallmentAllocation<'a> {
    pub transaction: &'a Transaction,
    /// 1-based
    pub index: u32,
    pub total: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

impl InstallmentAllocation<'_> {
    pub fn period(&self) -> Period {
        Period::of(self.due_date)
    }

    /// "2/10" style label.
    pub fn label(&self) -> String {
        format!("{}/{}", self.index, self.total)
    }
}

/// Per-installment share of `total`.
pub fn installment_amount(total: Decimal, count: u32) -> Decimal {
    let count = count.max(1);
    let scale = total.scale().max(MONEY_SCALE);
    (total / Decimal::from(count)).round_dp_with_strategy(scale, RoundingStrategy::ToZero)
}

/// Lazy, ordered installments of one purchase.
#[derive(Debug, Clone)]
pub struct Installments<'a> {
    transaction: &'a Transaction,
    first_due: NaiveDate,
    amount: Decimal,
    total: u32,
    next: u32,
}

impl<'a> Installments<'a> {
    fn new(transaction: &'a Transaction, first_due: NaiveDate) -> Result<Self> {
        let total = transaction.effective_installments();
        // The last due date bounds all the others.
        add_months(first_due, total - 1)?;
        Ok(Self {
            transaction,
            first_due,
            amount: installment_amount(transaction.total_amount, total),
            total,
            next: 0,
        })
    }

    pub fn first_due(&self) -> NaiveDate {
        self.first_due
    }
}

impl<'a> Iterator for Installments<'a> {
    type Item = InstallmentAllocation<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let due_date = add_months(self.first_due, self.next).ok()?;
        self.next += 1;
        Some(InstallmentAllocation {
            transaction: self.transaction,
            index: self.next,
            total: self.total,
            amount: self.amount,
            due_date,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Installments<'_> {}

/// Allocate a purchase using its own card.
///
/// Non-credit purchases yield a single installment due on the purchase date.
/// Credit purchases without a card fail with `MissingCardAssignment`; callers
/// exclude those from billing.
pub fn allocate(tx: &Transaction) -> Result<Installments<'_>> {
    if !tx.is_credit() {
        return Installments::new(tx, tx.purchase_date);
    }
    match &tx.card {
        Some(card) => allocate_with(tx, &card.cycle),
        None => Err(BillingError::MissingCardAssignment {
            transaction_id: tx.id.clone(),
        }),
    }
}

/// Allocate a purchase against an explicit cycle, ignoring any assigned card.
/// Non-credit purchases still fall due on their purchase date.
pub fn allocate_with<'a, C: CycleConfig + ?Sized>(tx: &'a Transaction, cycle: &C) -> Result<Installments<'a>> {
    if !tx.is_credit() {
        return Installments::new(tx, tx.purchase_date);
    }
    let first_due = cycle.first_due_date(tx.purchase_date)?;
    Installments::new(tx, first_due)
}
