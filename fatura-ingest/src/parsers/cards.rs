//! `cards.csv`: `id,name,limit,closing_day,due_day`

use anyhow::{Context, Result};
use fatura_core::{CardCycle, CreditCard};
use serde::Deserialize;
use std::io::Read;

use super::values::{parse_amount, parse_day};

#[derive(Debug, Deserialize)]
struct CardRow {
    id: String,
    name: String,
    limit: String,
    closing_day: String,
    due_day: String,
}

pub fn parse_cards<R: Read>(input: R) -> Result<Vec<CreditCard>> {
    let mut rdr = super::reader(input);
    let mut cards = Vec::new();

    for (i, row) in rdr.deserialize::<CardRow>().enumerate() {
        let line = i + 2;
        let row = row.with_context(|| format!("cards.csv line {line}"))?;
        let closing_day = parse_day(&row.closing_day).with_context(|| format!("cards.csv line {line}"))?;
        let due_day = parse_day(&row.due_day).with_context(|| format!("cards.csv line {line}"))?;
        let cycle = CardCycle::new(closing_day, due_day)
            .with_context(|| format!("cards.csv line {line}: card {}", row.id))?;

        cards.push(CreditCard {
            limit: parse_amount(&row.limit).with_context(|| format!("cards.csv line {line}"))?,
            id: row.id,
            name: row.name,
            cycle,
        });
    }

    Ok(cards)
}
