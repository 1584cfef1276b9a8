//! Clients for the two remote services: Splitwise, where expenses are created, and Mint, where
//! transactions come from.
//!
//! Each service is behind a trait so that the whole program can run against in-memory test
//! implementations. See `Mode`.

mod mint;
mod splitwise;
mod test_client;

use crate::model::{Expense, Taxonomy};
use crate::{Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use tracing::debug;

pub use mint::MintRecord;
pub use test_client::{TestMint, TestSplitwise};

/// The number of records that Mint returns in a full page of transactions.
pub const MINT_PAGE_SIZE: usize = 100;

/// The environment variable that, when set and non-empty, puts the program into `Mode::Test`.
const TEST_MODE_ENV: &str = "MINTWISE_IN_TEST_MODE";

/// Whether to talk to the real services or to in-memory test data.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Use the real Splitwise and Mint services.
    #[default]
    Live,
    /// Use seeded, in-memory implementations of Splitwise and Mint.
    Test,
}

impl Mode {
    /// Returns `Mode::Test` when `MINTWISE_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Live`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// The operations we need from Splitwise.
#[async_trait::async_trait]
pub trait Splitwise: Send + Sync {
    /// Fetches the full two-level category tree.
    async fn categories(&self) -> Result<Taxonomy>;

    /// Creates `expense` and returns the raw response from Splitwise.
    async fn create_expense(&self, expense: &Expense) -> Result<serde_json::Value>;
}

/// A request for one page of Mint transactions.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MintQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub offset: usize,
}

/// The operations we need from Mint.
#[async_trait::async_trait]
pub trait Mint: Send {
    /// Fetches up to `MINT_PAGE_SIZE` transactions, starting at `query.offset`.
    async fn transactions(&mut self, query: &MintQuery) -> Result<Vec<MintRecord>>;
}

/// Creates the Splitwise client for `mode`. The live client does not touch the network until it
/// is first used.
pub fn splitwise(config: &Config, mode: Mode) -> Result<Box<dyn Splitwise>> {
    debug!("Creating Splitwise client in {mode:?} mode");
    Ok(match mode {
        Mode::Live => Box::new(
            splitwise::SplitwiseClient::new(
                config.splitwise_base_url(),
                config.splitwise_consumer_key(),
                config.splitwise_consumer_secret(),
            )
            .context("Unable to create the Splitwise client")?,
        ),
        Mode::Test => Box::new(TestSplitwise::default()),
    })
}

/// Creates the Mint client for `mode`. Fails in `Mode::Live` when the Mint credentials are missing
/// from the configuration.
pub fn mint(config: &Config, mode: Mode) -> Result<Box<dyn Mint>> {
    debug!("Creating Mint client in {mode:?} mode");
    Ok(match mode {
        Mode::Live => {
            let username = config
                .mint_username()
                .context("mintUsername is required to fetch transactions from Mint")?;
            let password = config
                .mint_password()
                .context("mintPassword is required to fetch transactions from Mint")?;
            Box::new(
                mint::MintClient::new(config.mint_base_url(), username, password)
                    .context("Unable to create the Mint client")?,
            )
        }
        Mode::Test => Box::new(TestMint::default()),
    })
}

/// Checks the status of a response and, when it is not a success, turns it into an error that
/// includes the response body.
pub(crate) async fn check_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    anyhow::bail!("{what} failed with status {status}: {body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_default_is_live() {
        assert_eq!(Mode::Live, Mode::default());
    }
}
