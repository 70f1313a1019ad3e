//! Discovery of the months that have any financial activity.
//!
//! A month is active when a non-credit purchase was made in it, an income was
//! received in it, or any installment of a credit purchase falls due in it.
//! Credit purchases without a card are placed with the legacy 3/10 cycle here,
//! so old records still show up in the period list even though they are never
//! billed.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::calendar::Period;
use crate::cycle::{LegacyCycle, LEGACY_CLOSING_DAY};
use crate::error::Result;
use crate::installments::allocate_with;
use crate::ledger::{Income, Transaction};

/// Up to this day of the month the current month is the default selection;
/// afterwards the next month is.
pub const DEFAULT_PERIOD_CUTOFF_DAY: u32 = LEGACY_CLOSING_DAY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearMonths {
    pub year: i32,
    /// Ascending, no duplicates
    pub months: Vec<u32>,
}

/// Active periods grouped by year, plus the period to show by default.
///
/// `years` starts with the default year; the remaining years follow in
/// descending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailablePeriods {
    pub years: Vec<YearMonths>,
    pub default: Period,
}

impl AvailablePeriods {
    pub fn months_of(&self, year: i32) -> Option<&[u32]> {
        self.years
            .iter()
            .find(|y| y.year == year)
            .map(|y| y.months.as_slice())
    }

    pub fn contains(&self, period: Period) -> bool {
        self.months_of(period.year())
            .is_some_and(|months| months.contains(&period.month()))
    }

    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.years
            .iter()
            .flat_map(|y| y.months.iter().filter_map(move |m| Period::new(y.year, *m)))
    }

    /// Turn a possibly partial or stale selection into a listed period.
    ///
    /// An unknown year falls back to the default period. A known year with an
    /// unlisted month falls back to that year's first listed month.
    pub fn resolve(&self, year: Option<i32>, month: Option<u32>) -> Period {
        let year = year.unwrap_or(self.default.year());
        let Some(months) = self.months_of(year) else {
            return self.default;
        };
        let month = month.unwrap_or(self.default.month());
        if months.contains(&month) {
            if let Some(period) = Period::new(year, month) {
                return period;
            }
        }
        months
            .first()
            .and_then(|m| Period::new(year, *m))
            .unwrap_or(self.default)
    }
}

/// The period selected when the caller has no preference.
pub fn default_period(today: NaiveDate) -> Period {
    let current = Period::of(today);
    if today.day() <= DEFAULT_PERIOD_CUTOFF_DAY {
        current
    } else {
        current.next()
    }
}

/// Collect every active period of a user's ledger.
pub fn discover<'a, T, N>(transactions: T, incomes: N, today: NaiveDate) -> Result<AvailablePeriods>
where
    T: IntoIterator<Item = &'a Transaction>,
    N: IntoIterator<Item = &'a Income>,
{
    let mut active: BTreeSet<Period> = BTreeSet::new();

    for tx in transactions {
        if !tx.is_credit() {
            active.insert(Period::of(tx.purchase_date));
            continue;
        }
        let installments = match &tx.card {
            Some(card) => allocate_with(tx, &card.cycle)?,
            None => allocate_with(tx, &LegacyCycle)?,
        };
        active.extend(installments.map(|a| a.period()));
    }

    active.extend(incomes.into_iter().map(|i| Period::of(i.received_on)));

    let default = default_period(today);
    active.insert(default);

    let mut by_year: BTreeMap<i32, Vec<u32>> = BTreeMap::new();
    for period in &active {
        by_year.entry(period.year()).or_default().push(period.month());
    }

    let mut years = Vec::with_capacity(by_year.len());
    if let Some(months) = by_year.remove(&default.year()) {
        years.push(YearMonths {
            year: default.year(),
            months,
        });
    }
    years.extend(
        by_year
            .into_iter()
            .rev()
            .map(|(year, months)| YearMonths { year, months }),
    );

    Ok(AvailablePeriods { years, default })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CardCycle;
    use crate::ledger::PaymentMethod;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn p(y: i32, m: u32) -> Period {
        Period::new(y, m).unwrap()
    }

    const NO_TRANSACTIONS: &[Transaction] = &[];
    const NO_INCOMES: &[Income] = &[];

    fn year_list(ap: &AvailablePeriods) -> Vec<i32> {
        ap.years.iter().map(|y| y.year).collect()
    }

    #[test]
    fn test_empty_ledger_yields_default_only() {
        let ap = discover(NO_TRANSACTIONS, NO_INCOMES, d(2024, 1, 2)).unwrap();
        assert_eq!(ap.default, p(2024, 1));
        assert_eq!(
            ap.years,
            vec![YearMonths {
                year: 2024,
                months: vec![1]
            }]
        );
    }

    #[test]
    fn test_default_period_cutoff() {
        assert_eq!(default_period(d(2024, 5, 3)), p(2024, 5));
        assert_eq!(default_period(d(2024, 5, 4)), p(2024, 6));
        assert_eq!(default_period(d(2024, 12, 15)), p(2025, 1));
    }

    #[test]
    fn test_collects_purchases_incomes_and_installments() {
        let txs = vec![
            Transaction::new("a", "Padaria", d(2024, 1, 5), dec!(10), PaymentMethod::Cash, "Mercado"),
            Transaction::new("b", "Loja", d(2024, 1, 15), dec!(300), PaymentMethod::Credit, "Casa")
                .with_installments(3)
                .with_card("nu", CardCycle::new(3, 10).unwrap()),
            Transaction::new("c", "Loja", d(2024, 1, 6), dec!(300), PaymentMethod::Debit, "Casa"),
        ];
        let incomes = vec![Income::new("i", "Salário", dec!(5000), d(2024, 6, 5))];

        let ap = discover(&txs, &incomes, d(2024, 1, 2)).unwrap();
        assert_eq!(ap.default, p(2024, 1));
        assert_eq!(ap.months_of(2024), Some(&[1, 2, 3, 4, 6][..]));
        assert!(ap.contains(p(2024, 4)));
        assert!(!ap.contains(p(2024, 5)));
    }

    #[test]
    fn test_unassigned_credit_uses_legacy_cycle() {
        let txs = vec![
            Transaction::new("old", "Loja", d(2022, 12, 20), dec!(40), PaymentMethod::Credit, "Casa")
                .with_installments(2),
        ];
        let ap = discover(&txs, NO_INCOMES, d(2024, 1, 2)).unwrap();
        // Legacy 3/10 cycle: first due 2023-01-10, then 2023-02-10.
        assert_eq!(ap.months_of(2023), Some(&[1, 2][..]));
        assert_eq!(ap.months_of(2022), None);
    }

    #[test]
    fn test_years_start_with_default_then_descend() {
        let txs = vec![
            Transaction::new("a", "X", d(2023, 3, 5), dec!(1), PaymentMethod::Cash, "Outros"),
            Transaction::new("b", "X", d(2025, 7, 5), dec!(1), PaymentMethod::Cash, "Outros"),
            Transaction::new("c", "X", d(2022, 3, 5), dec!(1), PaymentMethod::Cash, "Outros"),
        ];
        let ap = discover(&txs, NO_INCOMES, d(2024, 2, 20)).unwrap();
        assert_eq!(ap.default, p(2024, 3));
        assert_eq!(year_list(&ap), vec![2024, 2025, 2023, 2022]);
        assert_eq!(ap.months_of(2024), Some(&[3][..]));
    }

    #[test]
    fn test_default_month_merges_with_existing_year() {
        let txs = vec![
            Transaction::new("a", "X", d(2024, 11, 5), dec!(1), PaymentMethod::Cash, "Outros"),
            Transaction::new("b", "X", d(2024, 2, 5), dec!(1), PaymentMethod::Cash, "Outros"),
            Transaction::new("c", "X", d(2024, 2, 9), dec!(1), PaymentMethod::Debit, "Outros"),
        ];
        let ap = discover(&txs, NO_INCOMES, d(2024, 6, 10)).unwrap();
        assert_eq!(ap.months_of(2024), Some(&[2, 7, 11][..]));
        let all: Vec<_> = ap.periods().collect();
        assert_eq!(all, vec![p(2024, 2), p(2024, 7), p(2024, 11)]);
    }

    #[test]
    fn test_invalid_card_cycle_fails_discovery() {
        let mut tx = Transaction::new("bad", "X", d(2024, 1, 5), dec!(1), PaymentMethod::Credit, "Outros")
            .with_card("broken", CardCycle::new(3, 10).unwrap());
        if let Some(card) = tx.card.as_mut() {
            card.cycle.due_day = 0;
        }
        assert!(discover(&[tx], NO_INCOMES, d(2024, 1, 2)).is_err());
    }

    #[test]
    fn test_resolve_selection() {
        let txs = vec![
            Transaction::new("a", "X", d(2023, 3, 5), dec!(1), PaymentMethod::Cash, "Outros"),
            Transaction::new("b", "X", d(2023, 8, 5), dec!(1), PaymentMethod::Cash, "Outros"),
        ];
        let ap = discover(&txs, NO_INCOMES, d(2024, 2, 1)).unwrap();

        assert_eq!(ap.resolve(None, None), p(2024, 2));
        assert_eq!(ap.resolve(Some(2023), Some(8)), p(2023, 8));
        // Known year, unlisted month: first month of that year
        assert_eq!(ap.resolve(Some(2023), Some(5)), p(2023, 3));
        assert_eq!(ap.resolve(Some(2023), None), p(2023, 3));
        // Unknown year: the default
        assert_eq!(ap.resolve(Some(2019), Some(8)), p(2024, 2));
        assert_eq!(ap.resolve(Some(2023), Some(13)), p(2023, 3));
    }
}
