//! Ledger record types: purchases, incomes, cards and categories.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cycle::CardCycle;

/// How a purchase was paid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "debit")]
    Debit,
    #[serde(rename = "instant-transfer")]
    InstantTransfer,
    #[serde(rename = "cash")]
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Credit,
        PaymentMethod::Debit,
        PaymentMethod::InstantTransfer,
        PaymentMethod::Cash,
    ];

    pub fn is_credit(&self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Credit => "credit",
            PaymentMethod::Debit => "debit",
            PaymentMethod::InstantTransfer => "instant-transfer",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPaymentMethod(pub String);

impl fmt::Display for UnknownPaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown payment method: {}", self.0)
    }
}

impl std::error::Error for UnknownPaymentMethod {}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    /// Accepts the English names as well as the labels used by existing
    /// Brazilian exports (Crédito, Débito, PIX, Dinheiro).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit" | "crédito" | "credito" => Ok(PaymentMethod::Credit),
            "debit" | "débito" | "debito" => Ok(PaymentMethod::Debit),
            "instant-transfer" | "instant_transfer" | "pix" => Ok(PaymentMethod::InstantTransfer),
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            _ => Err(UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Top-level spending groups.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MacroCategory {
    #[serde(rename = "Essenciais")]
    Essentials,
    #[serde(rename = "Estilo de Vida")]
    Lifestyle,
    #[serde(rename = "Prioridades")]
    Priorities,
    #[default]
    #[serde(rename = "Outras")]
    Other,
}

impl MacroCategory {
    pub const ALL: [MacroCategory; 4] = [
        MacroCategory::Essentials,
        MacroCategory::Lifestyle,
        MacroCategory::Priorities,
        MacroCategory::Other,
    ];

    /// The stored name of the group.
    pub fn name(&self) -> &'static str {
        match self {
            MacroCategory::Essentials => "Essenciais",
            MacroCategory::Lifestyle => "Estilo de Vida",
            MacroCategory::Priorities => "Prioridades",
            MacroCategory::Other => "Outras",
        }
    }

    /// Parse a stored name; matching ignores case and surrounding blanks.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for MacroCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The card a credit purchase was charged to, with its cycle resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedCard {
    pub card_id: String,
    pub cycle: CardCycle,
}

/// A purchase as handed over by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Where the purchase was made
    pub store: String,
    pub description: Option<String>,
    pub purchase_date: NaiveDate,
    pub total_amount: Decimal,
    /// Number of monthly installments (credit only; 1 otherwise)
    pub installment_count: u32,
    pub payment_method: PaymentMethod,
    /// Present only for credit purchases charged to a known card
    pub card: Option<AssignedCard>,
    /// Category name, resolved to a macro-category by a `CategoryResolver`
    pub category: String,
}

impl Transaction {
    /// A single-payment purchase with no card attached.
    pub fn new(
        id: impl Into<String>,
        store: impl Into<String>,
        purchase_date: NaiveDate,
        total_amount: Decimal,
        payment_method: PaymentMethod,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            store: store.into(),
            description: None,
            purchase_date,
            total_amount,
            installment_count: 1,
            payment_method,
            card: None,
            category: category.into(),
        }
    }

    pub fn with_card(mut self, card_id: impl Into<String>, cycle: CardCycle) -> Self {
        self.card = Some(AssignedCard {
            card_id: card_id.into(),
            cycle,
        });
        self
    }

    pub fn with_installments(mut self, count: u32) -> Self {
        self.installment_count = count;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_credit(&self) -> bool {
        self.payment_method.is_credit()
    }

    /// Installments actually billed; a stored count of 0 counts as 1.
    pub fn effective_installments(&self) -> u32 {
        if self.is_credit() {
            self.installment_count.max(1)
        } else {
            1
        }
    }

    pub fn card_id(&self) -> Option<&str> {
        self.card.as_ref().map(|c| c.card_id.as_str())
    }
}

/// Money received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub received_on: NaiveDate,
}

impl Income {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        received_on: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            received_on,
        }
    }
}

/// A credit card with its limit and billing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: String,
    pub name: String,
    pub limit: Decimal,
    pub cycle: CardCycle,
}

/// Maps purchases to their category and macro-category names.
pub trait CategoryResolver {
    fn category_name<'a>(&'a self, tx: &'a Transaction) -> &'a str {
        &tx.category
    }

    fn macro_category(&self, tx: &Transaction) -> MacroCategory;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("Crédito".parse::<PaymentMethod>().unwrap(), PaymentMethod::Credit);
        assert_eq!("PIX".parse::<PaymentMethod>().unwrap(), PaymentMethod::InstantTransfer);
        assert_eq!("dinheiro".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!(" debit ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Debit);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_macro_category_names() {
        assert_eq!(MacroCategory::from_name("estilo de vida"), Some(MacroCategory::Lifestyle));
        assert_eq!(MacroCategory::from_name("Nope"), None);
        assert_eq!(MacroCategory::default(), MacroCategory::Other);
        let json = serde_json::to_string(&MacroCategory::Essentials).unwrap();
        assert_eq!(json, "\"Essenciais\"");
    }

    #[test]
    fn test_effective_installments() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let debit = Transaction::new("t1", "Bakery", date, dec!(10), PaymentMethod::Debit, "Food")
            .with_installments(3);
        assert_eq!(debit.effective_installments(), 1);

        let credit = Transaction::new("t2", "Store", date, dec!(90), PaymentMethod::Credit, "Home")
            .with_installments(0);
        assert_eq!(credit.effective_installments(), 1);
        assert_eq!(credit.with_installments(3).effective_installments(), 3);
    }
}
