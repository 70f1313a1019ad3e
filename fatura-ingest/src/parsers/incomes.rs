//! `incomes.csv`: `id,description,amount,date`

use anyhow::{Context, Result};
use fatura_core::Income;
use serde::Deserialize;
use std::io::Read;

use super::values::{parse_amount, parse_date};

#[derive(Debug, Deserialize)]
struct IncomeRow {
    id: String,
    description: String,
    amount: String,
    date: String,
}

pub fn parse_incomes<R: Read>(input: R) -> Result<Vec<Income>> {
    let mut rdr = super::reader(input);
    let mut incomes = Vec::new();

    for (i, row) in rdr.deserialize::<IncomeRow>().enumerate() {
        let line = i + 2;
        let row = row.with_context(|| format!("incomes.csv line {line}"))?;
        incomes.push(Income {
            amount: parse_amount(&row.amount).with_context(|| format!("incomes.csv line {line}"))?,
            received_on: parse_date(&row.date).with_context(|| format!("incomes.csv line {line}"))?,
            id: row.id,
            description: row.description,
        });
    }

    Ok(incomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_incomes() {
        let csv = "id,description,amount,date\ns1,Salário,\"5.000,00\",05/02/2024\ns2,Freela,700,2024-01-28\n";
        let incomes = parse_incomes(csv.as_bytes()).unwrap();
        assert_eq!(incomes.len(), 2);
        assert_eq!(incomes[0].amount, dec!(5000.00));
        assert_eq!(incomes[0].received_on, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
        assert_eq!(incomes[1].description, "Freela");
    }

    #[test]
    fn test_bad_date_reports_line() {
        let csv = "id,description,amount,date\ns1,Salário,10,2024-13-01\n";
        let err = parse_incomes(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("incomes.csv line 2"), "{err:#}");
    }
}
