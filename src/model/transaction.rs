use crate::model::Amount;
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The date format used by Mint exports, e.g. `3/15/2022`.
const MINT_DATE_FORMAT: &str = "%m/%d/%Y";

/// The same date format, but without zero-padding, for display.
const DISPLAY_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Whether money left the account (debit) or came into it (credit).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The currencies that Mint accounts can be held in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "CAD")]
    Cad,
}

serde_plain::derive_display_from_serialize!(Currency);
serde_plain::derive_fromstr_from_deserialize!(Currency);

/// Classifies accounts by currency. Accounts named in the Canadian list are in CAD, everything
/// else is in USD.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct AccountCurrencies {
    canadian_accounts: BTreeSet<String>,
}

impl AccountCurrencies {
    pub fn new<S, I>(canadian_accounts: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self {
            canadian_accounts: canadian_accounts.into_iter().map(|s| s.into()).collect(),
        }
    }

    pub fn currency_of(&self, account: &str) -> Currency {
        if self.canadian_accounts.contains(account) {
            Currency::Cad
        } else {
            Currency::Usd
        }
    }
}

/// A single transaction, normalized from either a Mint CSV export or a remote Mint query.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub(crate) date: NaiveDate,
    pub(crate) amount: Amount,
    #[serde(rename = "type")]
    pub(crate) transaction_type: TransactionType,
    pub(crate) category: String,
    pub(crate) description: String,
    pub(crate) notes: String,
    pub(crate) account: String,
    pub(crate) currency: Currency,
}

impl Transaction {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The date as Mint shows it, e.g. `3/15/2022`.
    pub fn display_date(&self) -> String {
        self.date.format(DISPLAY_DATE_FORMAT).to_string()
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn is_credit(&self) -> bool {
        self.transaction_type == TransactionType::Credit
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} '{}'",
            self.display_date(),
            self.transaction_type,
            self.currency,
            self.amount,
            self.description
        )
    }
}

/// One row of a Mint CSV export.
// "Date","Description","Original Description","Amount","Transaction Type","Category","Account Name","Labels","Notes"
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CsvRecord {
    pub(crate) date: String,
    pub(crate) notes: String,
    pub(crate) description: String,
    pub(crate) amount: String,
    #[serde(rename = "Transaction Type")]
    pub(crate) transaction_type: TransactionType,
    pub(crate) category: String,
    #[serde(rename = "Account Name")]
    pub(crate) account_name: String,
}

impl CsvRecord {
    pub(crate) fn into_transaction(self, currencies: &AccountCurrencies) -> Result<Transaction> {
        let date = NaiveDate::parse_from_str(self.date.trim(), MINT_DATE_FORMAT)
            .with_context(|| format!("Unable to parse the date '{}'", self.date))?;
        let amount = Amount::from_str(&self.amount)?;
        let currency = currencies.currency_of(&self.account_name);
        Ok(Transaction {
            date,
            amount,
            transaction_type: self.transaction_type,
            category: self.category,
            description: self.description,
            notes: self.notes,
            account: self.account_name,
            currency,
        })
    }
}

/// Parses the text of a Mint CSV export into transactions, in file order.
pub fn parse_mint_export(csv_text: &str, currencies: &AccountCurrencies) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_reader(csv_text.as_bytes());
    let mut transactions = Vec::new();
    for (ix, result) in rdr.deserialize().enumerate() {
        // The header is line 1, so the first record is on line 2.
        let line = ix + 2;
        let record: CsvRecord =
            result.with_context(|| format!("Unable to read the export at line {line}"))?;
        let transaction = record
            .into_transaction(currencies)
            .with_context(|| format!("Invalid transaction at line {line}"))?;
        transactions.push(transaction);
    }
    Ok(transactions)
}
