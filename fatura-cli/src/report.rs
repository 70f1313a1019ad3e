//! Plain-text rendering for the terminal. `--json` bypasses all of this.

use fatura_core::{
    AvailablePeriods, CardBill, CardExposure, InstallmentAllocation, MonthlyBalance, Period,
    Statement, Transaction,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::Write;

/// Format an amount as Brazilian reais: `R$ 1.234,56`.
pub fn brl(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs().round_dp(2));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac_part}")
}

fn describe(tx: &Transaction) -> String {
    match &tx.description {
        Some(d) => format!("{} ({d})", tx.store),
        None => tx.store.clone(),
    }
}

pub fn periods(ap: &AvailablePeriods, selected: Period) -> String {
    let mut out = String::new();
    for ym in &ap.years {
        let months: Vec<String> = ym
            .months
            .iter()
            .map(|m| {
                let mark = if ym.year == selected.year() && *m == selected.month() { "*" } else { "" };
                format!("{m:02}{mark}")
            })
            .collect();
        let _ = writeln!(out, "{}: {}", ym.year, months.join(" "));
    }
    let _ = writeln!(out, "\nDefault: {}  Selected: {selected}", ap.default);
    out
}

pub fn installments(lines: &[InstallmentAllocation<'_>]) -> String {
    let mut out = String::new();
    for line in lines {
        let _ = writeln!(
            out,
            "{}  {:<32} {:>5}  {:<16} {:>14}  due {}",
            line.transaction.purchase_date,
            describe(line.transaction),
            line.label(),
            line.transaction.category,
            brl(line.amount),
            line.due_date,
        );
    }
    out
}

pub fn card_bill(bill: &CardBill<'_>, card_name: &str) -> String {
    let mut out = format!("# {card_name} bill for {}\n\n", bill.period);
    if bill.lines.is_empty() {
        out.push_str("(nothing due)\n");
    } else {
        out.push_str(&installments(&bill.lines));
    }
    let _ = writeln!(out, "\nTotal: {}", brl(bill.total));
    out
}

pub fn statement(st: &Statement<'_>) -> String {
    let mut out = format!("# Purchases in {}\n\n", st.period);
    for tx in &st.transactions {
        let card = tx.card_id().map(|c| format!(" [{c}]")).unwrap_or_default();
        let _ = writeln!(
            out,
            "{}  {:<32} {:<16} {:<17} {:>14}",
            tx.purchase_date,
            describe(tx),
            tx.category,
            format!("{}{card}", tx.payment_method),
            brl(tx.total_amount),
        );
    }
    let _ = writeln!(out, "\n{} purchases, total {}", st.transactions.len(), brl(st.total));
    out
}

/// Breakdown lines, largest first, with each share of the total.
pub fn breakdown<K: ToString>(period: Period, totals: HashMap<K, Decimal>) -> String {
    let mut rows: Vec<(String, Decimal)> = totals.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let total: Decimal = rows.iter().map(|(_, v)| *v).sum();

    let mut out = format!("# Spending in {period}\n\n");
    for (name, amount) in &rows {
        let share = if total.is_zero() {
            Decimal::ZERO
        } else {
            (*amount * Decimal::ONE_HUNDRED / total).round_dp(1)
        };
        let _ = writeln!(out, "{name:<20} {:>14} {share:>6.1}%", brl(*amount));
    }
    let _ = writeln!(out, "\n{:<20} {:>14}", "Total", brl(total));
    out
}

pub fn details(period: Period, heading: &str, lines: &[InstallmentAllocation<'_>]) -> String {
    let total: Decimal = lines.iter().map(|l| l.amount).sum();
    let mut out = format!("# {heading} in {period}\n\n");
    out.push_str(&installments(lines));
    let _ = writeln!(out, "\nTotal: {}", brl(total));
    out
}

pub fn balance(b: &MonthlyBalance) -> String {
    let mut out = format!("# Balance for {}\n\n", b.period);
    let _ = writeln!(out, "{:<16} {:>14}", "Income", brl(b.income));
    let _ = writeln!(out, "{:<16} {:>14}", "Card bills", brl(b.card_bills));
    let _ = writeln!(out, "{:<16} {:>14}", "Direct spending", brl(b.direct_spending));
    let _ = writeln!(out, "{:<16} {:>14}", "Balance", brl(b.balance));
    out
}

pub fn exposures(cards: &[CardExposure]) -> String {
    let mut out = String::new();
    for card in cards {
        let _ = writeln!(
            out,
            "{} ({})  limit {}  owed {}  available {}  (from {})",
            card.name,
            card.card_id,
            brl(card.limit),
            brl(card.outstanding),
            brl(card.available),
            card.reference_date,
        );
        for bill in &card.upcoming_bills {
            let _ = writeln!(out, "  {}  {:>14}", bill.period, brl(bill.total));
        }
    }
    if out.is_empty() {
        out.push_str("(no cards)\n");
    }
    out
}
