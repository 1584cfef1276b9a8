//! Produces the session's transactions, either from a Mint CSV export or by paging through the
//! Mint transactions query.

use crate::api::{Mint, MintQuery, MintRecord, Mode, MINT_PAGE_SIZE};
use crate::model::{parse_mint_export, AccountCurrencies, Amount, Transaction, TransactionType};
use crate::{api, utils, Config, Result};
use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, trace};

/// Full dates that Mint may send. Only the month and day are kept.
const FULL_DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Month and day only, as Mint sends dates within the current year.
const MONTH_DAY_FORMATS: [&str; 5] = ["%m-%d", "%m/%d", "%b %d", "%B %d", "%d %b"];

/// A leap year, so that February 29th parses before the real year is applied.
const PARSE_YEAR: i32 = 2000;

/// Where the transactions come from.
pub enum Origin {
    /// A Mint CSV export.
    File(PathBuf),
    /// The Mint transactions query, between two dates.
    Remote {
        mint: Box<dyn Mint>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

impl Origin {
    /// Decides where transactions come from. An export file always wins. Without one, transactions
    /// are fetched from Mint, which needs the network and a complete date range.
    pub fn choose(file: Option<&Path>, offline: bool, config: &Config, mode: Mode) -> Result<Self> {
        if let Some(file) = file {
            return Ok(Origin::File(file.to_path_buf()));
        }
        if offline {
            bail!("Cannot fetch transactions from Mint while offline, provide an export with --file");
        }
        let Some((start_date, end_date)) = config.date_range() else {
            bail!(
                "Either an export file (--file) or both startDate and endDate in the config file \
                must be provided to fetch transactions"
            );
        };
        Ok(Origin::Remote {
            mint: api::mint(config, mode)?,
            start_date,
            end_date,
        })
    }
}

/// Fetches the transactions once and hands out the same list for the rest of the session.
pub struct TransactionSource {
    origin: Origin,
    currencies: AccountCurrencies,
    transactions: Option<Vec<Transaction>>,
}

impl TransactionSource {
    pub fn new(origin: Origin, currencies: AccountCurrencies) -> Self {
        Self {
            origin,
            currencies,
            transactions: None,
        }
    }

    /// Returns the transactions in source order, fetching them on the first call.
    pub async fn fetch(&mut self) -> Result<&[Transaction]> {
        if self.transactions.is_none() {
            let transactions = match &mut self.origin {
                Origin::File(path) => read_export(path, &self.currencies).await?,
                Origin::Remote {
                    mint,
                    start_date,
                    end_date,
                } => {
                    fetch_between(mint.as_mut(), *start_date, *end_date, &self.currencies).await?
                }
            };
            debug!("Fetched {} transactions", transactions.len());
            self.transactions = Some(transactions);
        }
        Ok(self.transactions.as_deref().unwrap_or_default())
    }
}

async fn read_export(path: &Path, currencies: &AccountCurrencies) -> Result<Vec<Transaction>> {
    let text = utils::read(path).await?;
    parse_mint_export(&text, currencies)
        .with_context(|| format!("Unable to parse the Mint export at {}", path.display()))
}

/// Pages through the Mint query until a page comes back short.
async fn fetch_between(
    mint: &mut dyn Mint,
    start_date: NaiveDate,
    end_date: NaiveDate,
    currencies: &AccountCurrencies,
) -> Result<Vec<Transaction>> {
    // Mint only sends the month and day. Ranges that cross a new year get the wrong year for the
    // later part of the range.
    let year = start_date.year();
    let mut transactions = Vec::new();
    let mut offset = 0;
    loop {
        let query = MintQuery {
            start_date,
            end_date,
            offset,
        };
        let page = mint.transactions(&query).await?;
        let page_len = page.len();
        trace!("Received {page_len} records at offset {offset}");
        for record in page {
            trace!("{record:?}");
            let transaction = hydrate(&record, year, currencies)
                .with_context(|| format!("Invalid Mint record {record:?}"))?;
            transactions.push(transaction);
        }
        if page_len != MINT_PAGE_SIZE {
            break;
        }
        offset += MINT_PAGE_SIZE;
    }
    Ok(transactions)
}

/// Turns a Mint record into a `Transaction`, dated in `year`.
pub(crate) fn hydrate(
    record: &MintRecord,
    year: i32,
    currencies: &AccountCurrencies,
) -> Result<Transaction> {
    let (month, day) = month_day(&record.date)
        .with_context(|| format!("Unable to parse the date '{}'", record.date))?;
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("'{}' is not a valid date in {year}", record.date))?;
    let amount = Amount::from_str(&record.amount)?;
    let notes = if record.note.is_empty() {
        record.omerchant.clone()
    } else {
        format!("{}\n\n{}", record.note, record.omerchant)
    };
    let transaction_type = if record.is_debit {
        TransactionType::Debit
    } else {
        TransactionType::Credit
    };
    Ok(Transaction {
        date,
        amount,
        transaction_type,
        category: record.category.clone(),
        description: record.merchant.clone(),
        notes,
        account: record.account.clone(),
        currency: currencies.currency_of(&record.account),
    })
}

fn month_day(raw: &str) -> Option<(u32, u32)> {
    let raw = raw.trim();
    let full = FULL_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok());
    let date = full.or_else(|| {
        let with_year = format!("{raw} {PARSE_YEAR}");
        MONTH_DAY_FORMATS.iter().find_map(|format| {
            NaiveDate::parse_from_str(&with_year, &format!("{format} %Y")).ok()
        })
    })?;
    Some((date.month(), date.day()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestMint;
    use crate::model::Currency;
    use crate::test::TestEnv;

    fn record(date: &str, amount: &str) -> MintRecord {
        MintRecord {
            date: date.to_string(),
            amount: amount.to_string(),
            omerchant: "SQ *CORNER BAKERY".to_string(),
            merchant: "Corner Bakery".to_string(),
            is_debit: true,
            category: "Food".to_string(),
            account: "Visa".to_string(),
            ..MintRecord::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_hydrate_uses_start_year() {
        let currencies = AccountCurrencies::default();
        let transaction = hydrate(&record("03-15", "$12.00"), 2022, &currencies).unwrap();
        assert_eq!("3/15/2022", transaction.display_date());
        assert_eq!("12.00", transaction.amount().to_string());
        assert_eq!(TransactionType::Debit, transaction.transaction_type());
        assert_eq!("Corner Bakery", transaction.description());
        assert_eq!("SQ *CORNER BAKERY", transaction.notes());
    }

    #[test]
    fn test_hydrate_date_formats() {
        let currencies = AccountCurrencies::default();
        for raw in ["Mar 15", "03/15", "3/15/2019", "2019-03-15", "March 15"] {
            let transaction = hydrate(&record(raw, "1.00"), 2022, &currencies).unwrap();
            assert_eq!(date(2022, 3, 15), transaction.date(), "{raw}");
        }
    }

    #[test]
    fn test_hydrate_leap_day_outside_leap_year_fails() {
        let currencies = AccountCurrencies::default();
        assert!(hydrate(&record("02-29", "1.00"), 2024, &currencies).is_ok());
        assert!(hydrate(&record("02-29", "1.00"), 2022, &currencies).is_err());
    }

    #[test]
    fn test_hydrate_notes_and_credit() {
        let currencies = AccountCurrencies::new(["Chequing"]);
        let mut raw = record("Jan 2", "$1,204.50");
        raw.note = "split with Sam".to_string();
        raw.is_debit = false;
        raw.account = "Chequing".to_string();
        let transaction = hydrate(&raw, 2021, &currencies).unwrap();
        assert_eq!("split with Sam\n\nSQ *CORNER BAKERY", transaction.notes());
        assert!(transaction.is_credit());
        assert_eq!(Currency::Cad, transaction.currency());
        assert_eq!("1204.50", transaction.amount().to_string());
    }

    #[test]
    fn test_hydrate_bad_amount_fails() {
        let currencies = AccountCurrencies::default();
        let err = hydrate(&record("03-15", "twelve"), 2022, &currencies).unwrap_err();
        assert!(format!("{err:#}").contains("twelve"));
    }

    #[tokio::test]
    async fn test_remote_pages_until_short_page() {
        let records = (0..237).map(|_| record("03-15", "$1.00")).collect();
        let mint = TestMint::new(records);
        let origin = Origin::Remote {
            mint: Box::new(mint.clone()),
            start_date: date(2022, 3, 1),
            end_date: date(2022, 3, 31),
        };
        let mut source = TransactionSource::new(origin, AccountCurrencies::default());
        assert_eq!(237, source.fetch().await.unwrap().len());

        let requests = mint.requests().unwrap();
        assert_eq!(3, requests.len());
        assert_eq!(
            vec![0, 100, 200],
            requests.iter().map(|q| q.offset).collect::<Vec<_>>()
        );

        // The second fetch is served from memory.
        assert_eq!(237, source.fetch().await.unwrap().len());
        assert_eq!(3, mint.requests().unwrap().len());
    }

    #[tokio::test]
    async fn test_remote_full_last_page_asks_once_more() {
        let records = (0..200).map(|_| record("03-15", "$1.00")).collect();
        let mint = TestMint::new(records);
        let origin = Origin::Remote {
            mint: Box::new(mint.clone()),
            start_date: date(2022, 3, 1),
            end_date: date(2022, 3, 31),
        };
        let mut source = TransactionSource::new(origin, AccountCurrencies::default());
        assert_eq!(200, source.fetch().await.unwrap().len());
        assert_eq!(3, mint.requests().unwrap().len());
    }

    #[tokio::test]
    async fn test_file_origin() {
        let env = TestEnv::new();
        let path = env.dir().join("export.csv");
        std::fs::write(
            &path,
            "Date,Description,Original Description,Amount,Transaction Type,Category,Account Name,Labels,Notes\n\
             3/15/2022,Whole Foods,WHOLE FOODS MKT,87.43,debit,Groceries,Visa,,weekly shop\n",
        )
        .unwrap();
        let config = env.config().await;
        let origin = Origin::choose(Some(path.as_path()), true, &config, Mode::Test).unwrap();
        let mut source = TransactionSource::new(origin, config.account_currencies());
        let transactions = source.fetch().await.unwrap();
        assert_eq!(1, transactions.len());
        assert_eq!("Whole Foods", transactions[0].description());
    }

    #[tokio::test]
    async fn test_offline_without_file_fails() {
        let env = TestEnv::new();
        let config = env.config().await;
        assert!(Origin::choose(None, true, &config, Mode::Test).is_err());
    }

    #[tokio::test]
    async fn test_no_file_and_no_range_fails() {
        let env = TestEnv::new();
        let config = env.config_with_range(None).await;
        let err = Origin::choose(None, false, &config, Mode::Test).err().unwrap();
        assert!(err.to_string().contains("startDate and endDate"));
    }

    #[tokio::test]
    async fn test_range_without_file_is_remote() {
        let env = TestEnv::new();
        let config = env.config().await;
        let origin = Origin::choose(None, false, &config, Mode::Test).unwrap();
        assert!(matches!(origin, Origin::Remote { .. }));
    }
}
