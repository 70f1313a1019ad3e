//! Per-card exposure: what is still owed on a card and how much limit is left.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::calendar::{add_months, with_day_clamped, Period};
use crate::cycle::CardCycle;
use crate::error::Result;
use crate::installments::allocate_with;
use crate::ledger::{CreditCard, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillSummary {
    pub period: Period,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardExposure {
    pub card_id: String,
    pub name: String,
    pub limit: Decimal,
    /// Earliest due date still counted as open
    pub reference_date: NaiveDate,
    pub outstanding: Decimal,
    pub available: Decimal,
    /// Open bills in chronological order
    pub upcoming_bills: Vec<BillSummary>,
}

/// The next due date of the card as seen on `today`: this month's due date,
/// or next month's once it has passed.
pub fn reference_due_date(cycle: &CardCycle, today: NaiveDate) -> Result<NaiveDate> {
    let this_month = with_day_clamped(today, cycle.due_day);
    if today.day() > cycle.due_day {
        add_months(this_month, 1)
    } else {
        Ok(this_month)
    }
}

/// Sum every installment charged to `card` that is due on or after the
/// reference date.
pub fn card_exposure<'a, I>(card: &CreditCard, transactions: I, today: NaiveDate) -> Result<CardExposure>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let cycle = CardCycle::new(card.cycle.closing_day, card.cycle.due_day)?;
    let reference_date = reference_due_date(&cycle, today)?;

    let mut outstanding = Decimal::ZERO;
    let mut bills: BTreeMap<Period, Decimal> = BTreeMap::new();

    for tx in transactions {
        if tx.card_id() != Some(card.id.as_str()) {
            continue;
        }
        for installment in allocate_with(tx, &cycle)? {
            if installment.due_date < reference_date {
                continue;
            }
            outstanding += installment.amount;
            *bills.entry(installment.period()).or_insert(Decimal::ZERO) += installment.amount;
        }
    }

    Ok(CardExposure {
        card_id: card.id.clone(),
        name: card.name.clone(),
        limit: card.limit,
        reference_date,
        outstanding,
        available: card.limit - outstanding,
        upcoming_bills: bills
            .into_iter()
            .map(|(period, total)| BillSummary { period, total })
            .collect(),
    })
}
