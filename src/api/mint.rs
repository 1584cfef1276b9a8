//! Implements the `Mint` trait by querying the Mint transactions endpoint.

use crate::api::{check_status, Mint, MintQuery, MINT_PAGE_SIZE};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::trace;
use url::Url;

const TRANSACTIONS_PATH: &str = "transactions";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A transaction as Mint returns it. The date carries only a month and a day, and the amount is
/// formatted text such as `$1,234.56`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRecord {
    pub date: String,
    pub amount: String,
    #[serde(default)]
    pub note: String,
    /// The original merchant text from the bank.
    #[serde(default)]
    pub omerchant: String,
    /// The merchant name as cleaned up by Mint.
    #[serde(default)]
    pub merchant: String,
    pub is_debit: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub account: String,
}

/// Talks to Mint over HTTPS using the account's username and password.
pub(super) struct MintClient {
    client: reqwest::Client,
    transactions_url: Url,
    username: String,
    password: String,
}

impl MintClient {
    pub(super) fn new(
        base_url: &Url,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            transactions_url: base_url.join(TRANSACTIONS_PATH)?,
            username: username.into(),
            password: password.into(),
        })
    }

    fn url(&self, query: &MintQuery) -> Url {
        let mut url = self.transactions_url.clone();
        url.query_pairs_mut()
            .append_pair("startDate", &query.start_date.format(DATE_FORMAT).to_string())
            .append_pair("endDate", &query.end_date.format(DATE_FORMAT).to_string())
            .append_pair("offset", &query.offset.to_string())
            .append_pair("limit", &MINT_PAGE_SIZE.to_string());
        url
    }
}

#[async_trait::async_trait]
impl Mint for MintClient {
    async fn transactions(&mut self, query: &MintQuery) -> Result<Vec<MintRecord>> {
        let url = self.url(query);
        trace!("GET {url}");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .context("Failed to send the Mint transactions request")?;
        let response = check_status(response, "Fetching Mint transactions").await?;
        response
            .json()
            .await
            .context("Failed to parse the Mint transactions response")
    }
}
