//! `transactions.csv`:
//! `id,store,description,date,amount,method,installments,card,category`
//!
//! Rows are normalized the way purchases are stored:
//! - non-credit purchases always have one installment and no card;
//! - a blank or zero installment count means one;
//! - a credit purchase with a blank card stays unassigned (legacy).
//!
//! A card id that is not in `cards.csv` is an integrity error.

use anyhow::{anyhow, bail, Context, Result};
use fatura_core::{AssignedCard, CreditCard, PaymentMethod, Transaction};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, warn};

use super::values::{non_empty, parse_amount, parse_date};

#[derive(Debug, Deserialize)]
struct TransactionRow {
    id: String,
    store: String,
    #[serde(default)]
    description: String,
    date: String,
    amount: String,
    method: String,
    #[serde(default)]
    installments: String,
    #[serde(default)]
    card: String,
    category: String,
}

fn parse_installments(s: &str) -> Result<u32> {
    match non_empty(s) {
        None => Ok(1),
        Some(v) => v
            .parse::<u32>()
            .map(|n| n.max(1))
            .with_context(|| format!("invalid installment count '{v}'")),
    }
}

pub fn parse_transactions<R: Read>(input: R, cards: &[CreditCard]) -> Result<Vec<Transaction>> {
    let by_id: HashMap<&str, &CreditCard> = cards.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut rdr = super::reader(input);
    let mut txns = Vec::new();

    for (i, row) in rdr.deserialize::<TransactionRow>().enumerate() {
        let line = i + 2;
        let row = row.with_context(|| format!("transactions.csv line {line}"))?;
        let tx = to_transaction(row, &by_id).with_context(|| format!("transactions.csv line {line}"))?;
        txns.push(tx);
    }

    Ok(txns)
}

fn to_transaction(row: TransactionRow, cards: &HashMap<&str, &CreditCard>) -> Result<Transaction> {
    if row.id.is_empty() {
        bail!("missing transaction id");
    }
    let category = non_empty(&row.category).ok_or_else(|| anyhow!("transaction {} has no category", row.id))?;
    let payment_method: PaymentMethod = row.method.parse()?;
    let mut installment_count = parse_installments(&row.installments)?;
    let mut card_ref = non_empty(&row.card);

    if !payment_method.is_credit() {
        if installment_count > 1 {
            warn!(transaction = %row.id, method = %payment_method, installment_count, "installments on a non-credit purchase, using 1");
            installment_count = 1;
        }
        if let Some(card_id) = card_ref.take() {
            warn!(transaction = %row.id, method = %payment_method, card = %card_id, "card on a non-credit purchase ignored");
        }
    }

    let card = match card_ref {
        Some(card_id) => {
            let card = cards
                .get(card_id.as_str())
                .ok_or_else(|| anyhow!("transaction {} references unknown card {card_id}", row.id))?;
            Some(AssignedCard {
                card_id,
                cycle: card.cycle,
            })
        }
        None => {
            if payment_method.is_credit() {
                debug!(transaction = %row.id, "credit purchase without card");
            }
            None
        }
    };

    Ok(Transaction {
        purchase_date: parse_date(&row.date)?,
        total_amount: parse_amount(&row.amount)?,
        description: non_empty(&row.description),
        id: row.id,
        store: row.store,
        installment_count,
        payment_method,
        card,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fatura_core::CardCycle;
    use rust_decimal_macros::dec;

    const HEADER: &str = "id,store,description,date,amount,method,installments,card,category\n";

    fn cards() -> Vec<CreditCard> {
        vec![CreditCard {
            id: "nu".into(),
            name: "Nubank".into(),
            limit: dec!(5000),
            cycle: CardCycle::new(3, 10).unwrap(),
        }]
    }

    fn parse(rows: &str) -> Result<Vec<Transaction>> {
        parse_transactions(format!("{HEADER}{rows}").as_bytes(), &cards())
    }

    #[test]
    fn test_credit_row_resolves_card_cycle() {
        let txns = parse("t1,Loja,Sofá novo,15/01/2024,\"1.200,00\",Crédito,3,nu,Casa\n").unwrap();
        let tx = &txns[0];
        assert_eq!(tx.purchase_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(tx.total_amount, dec!(1200.00));
        assert_eq!(tx.payment_method, PaymentMethod::Credit);
        assert_eq!(tx.installment_count, 3);
        assert_eq!(tx.description.as_deref(), Some("Sofá novo"));
        let card = tx.card.as_ref().unwrap();
        assert_eq!(card.card_id, "nu");
        assert_eq!(card.cycle, CardCycle::new(3, 10).unwrap());
    }

    #[test]
    fn test_non_credit_rows_are_normalized() {
        let txns = parse("t2,Padaria,,2024-02-01,12.50,pix,4,nu,Mercado\n").unwrap();
        let tx = &txns[0];
        assert_eq!(tx.payment_method, PaymentMethod::InstantTransfer);
        assert_eq!(tx.installment_count, 1);
        assert!(tx.card.is_none());
        assert!(tx.description.is_none());
    }

    #[test]
    fn test_blank_installments_and_card() {
        let txns = parse("t3,Loja,,2023-05-01,10,credit,,,Casa\nt4,Loja,,2023-05-01,10,credit,0,nu,Casa\n").unwrap();
        assert_eq!(txns[0].installment_count, 1);
        assert!(txns[0].card.is_none());
        assert_eq!(txns[1].installment_count, 1);
        assert!(txns[1].card.is_some());
    }

    #[test]
    fn test_unknown_card_is_an_error() {
        let err = parse("t5,Loja,,2024-01-01,10,credit,1,ghost,Casa\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("unknown card ghost"), "{msg}");
        assert!(msg.contains("line 2"), "{msg}");
    }

    #[test]
    fn test_bad_method_and_missing_category() {
        assert!(parse("t6,Loja,,2024-01-01,10,cheque,1,,Casa\n").is_err());
        assert!(parse("t7,Loja,,2024-01-01,10,cash,1,,\n").is_err());
        assert!(parse("t8,Loja,,2024-01-01,10,credit,x,nu,Casa\n").is_err());
    }
}
