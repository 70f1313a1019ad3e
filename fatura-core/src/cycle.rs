//! Billing cycles and the first-due-date rule.
//!
//! A purchase made on or before the closing day belongs to the current cycle;
//! anything after it rolls into the next one. The bill of a cycle is due on
//! the due day, which lands one month later when the due day is numerically
//! before the closing day.
//!
//! Two cycle sources exist:
//! - `CardCycle`: the closing/due days configured on a credit card.
//! - `LegacyCycle`: the fixed 3/10 cycle used for purchases recorded before
//!   cards were tracked. Only period discovery falls back to it.
//!
//! Both go through the same `first_due_date` implementation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{add_months, with_day_clamped};
use crate::error::{BillingError, Result};

/// Closing day of the legacy card-less cycle.
pub const LEGACY_CLOSING_DAY: u32 = 3;
/// Due day of the legacy card-less cycle.
pub const LEGACY_DUE_DAY: u32 = 10;

/// Anything that can place a purchase into a billing cycle.
pub trait CycleConfig {
    fn closing_day(&self) -> u32;
    fn due_day(&self) -> u32;

    fn first_due_date(&self, purchase_date: NaiveDate) -> Result<NaiveDate> {
        first_due_date(purchase_date, self.closing_day(), self.due_day())
    }
}

/// A credit card's billing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardCycle {
    pub closing_day: u32,
    pub due_day: u32,
}

impl CardCycle {
    pub fn new(closing_day: u32, due_day: u32) -> Result<Self> {
        validate_days(closing_day, due_day)?;
        Ok(Self {
            closing_day,
            due_day,
        })
    }
}

impl CycleConfig for CardCycle {
    fn closing_day(&self) -> u32 {
        self.closing_day
    }

    fn due_day(&self) -> u32 {
        self.due_day
    }
}

/// The fixed cycle (close on the 3rd, due on the 10th) applied to credit
/// purchases that predate card assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyCycle;

impl CycleConfig for LegacyCycle {
    fn closing_day(&self) -> u32 {
        LEGACY_CLOSING_DAY
    }

    fn due_day(&self) -> u32 {
        LEGACY_DUE_DAY
    }
}

fn validate_days(closing_day: u32, due_day: u32) -> Result<()> {
    if !(1..=31).contains(&closing_day) || !(1..=31).contains(&due_day) {
        return Err(BillingError::InvalidCycleConfig {
            closing_day,
            due_day,
        });
    }
    Ok(())
}

/// First due date of a purchase under the given closing/due days.
///
/// The purchase day equal to the closing day still belongs to the current
/// cycle. A due day past the end of the target month is clamped to its last
/// day.
pub fn first_due_date(purchase_date: NaiveDate, closing_day: u32, due_day: u32) -> Result<NaiveDate> {
    validate_days(closing_day, due_day)?;

    let same_cycle = purchase_date.day() <= closing_day;
    let months = match (due_day < closing_day, same_cycle) {
        (true, false) => 2,
        (true, true) | (false, false) => 1,
        (false, true) => 0,
    };

    let base = add_months(purchase_date, months)?;
    Ok(with_day_clamped(base, due_day))
}

/// First due date under the legacy 3/10 cycle.
pub fn legacy_first_due_date(purchase_date: NaiveDate) -> Result<NaiveDate> {
    LegacyCycle.first_due_date(purchase_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::days_in_month;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_purchase_after_closing_moves_to_next_month() {
        assert_eq!(first_due_date(d(2024, 1, 15), 3, 10).unwrap(), d(2024, 2, 10));
    }

    #[test]
    fn test_purchase_before_closing_due_same_month() {
        assert_eq!(first_due_date(d(2024, 1, 2), 3, 10).unwrap(), d(2024, 1, 10));
    }

    #[test]
    fn test_closing_day_is_inclusive() {
        assert_eq!(first_due_date(d(2024, 1, 3), 3, 10).unwrap(), d(2024, 1, 10));
        assert_eq!(first_due_date(d(2024, 1, 4), 3, 10).unwrap(), d(2024, 2, 10));
    }

    #[test]
    fn test_due_before_closing_adds_two_months_after_close() {
        assert_eq!(first_due_date(d(2024, 1, 31), 5, 1).unwrap(), d(2024, 3, 1));
        assert_eq!(first_due_date(d(2024, 1, 5), 5, 1).unwrap(), d(2024, 2, 1));
    }

    #[test]
    fn test_due_day_clamped_to_short_month() {
        // Closes on the 1st, due on the 31st: a purchase on Mar 20 lands in April.
        assert_eq!(first_due_date(d(2024, 3, 20), 1, 31).unwrap(), d(2024, 4, 30));
        assert_eq!(first_due_date(d(2023, 1, 20), 1, 31).unwrap(), d(2023, 2, 28));
        assert_eq!(first_due_date(d(2024, 1, 20), 1, 31).unwrap(), d(2024, 2, 29));
    }

    #[test]
    fn test_year_rolls_over() {
        assert_eq!(first_due_date(d(2024, 12, 20), 10, 5).unwrap(), d(2025, 2, 5));
        assert_eq!(first_due_date(d(2024, 12, 20), 10, 15).unwrap(), d(2025, 1, 15));
    }

    #[test]
    fn test_invalid_cycle_config() {
        for (closing, due) in [(0, 10), (3, 0), (32, 10), (3, 32)] {
            let err = first_due_date(d(2024, 1, 1), closing, due).unwrap_err();
            assert_eq!(
                err,
                BillingError::InvalidCycleConfig {
                    closing_day: closing,
                    due_day: due
                }
            );
        }
        assert!(CardCycle::new(0, 10).is_err());
        assert!(CardCycle::new(31, 31).is_ok());
    }

    #[test]
    fn test_legacy_cycle_matches_card_with_same_days() {
        let card = CardCycle::new(LEGACY_CLOSING_DAY, LEGACY_DUE_DAY).unwrap();
        let mut day = d(2023, 11, 1);
        while day < d(2024, 3, 1) {
            assert_eq!(legacy_first_due_date(day).unwrap(), card.first_due_date(day).unwrap());
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_due_day_and_ordering_hold_for_every_cycle() {
        let start = d(2024, 1, 1);
        let end = d(2025, 1, 1);
        for closing in 1..=31 {
            for due in 1..=31 {
                let mut purchase = start;
                while purchase < end {
                    let got = first_due_date(purchase, closing, due).unwrap();
                    let expected_day = due.min(days_in_month(got.year(), got.month()));
                    assert_eq!(got.day(), expected_day, "{purchase} {closing}/{due}");

                    let same_cycle = purchase.day() <= closing;
                    if !same_cycle || due < closing {
                        assert!(got > purchase, "{purchase} {closing}/{due} -> {got}");
                    } else {
                        assert!(got >= purchase, "{purchase} {closing}/{due} -> {got}");
                    }
                    purchase = purchase.succ_opt().unwrap();
                }
            }
        }
    }
}
