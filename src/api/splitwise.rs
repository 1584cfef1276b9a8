//! Implements the `Splitwise` trait using the Splitwise REST API.
//!
//! Authentication uses the OAuth 2.0 client credentials grant with the consumer key and secret of
//! a registered Splitwise app. The token is requested on first use and reused afterwards.

use crate::api::{check_status, Splitwise};
use crate::model::{Expense, Taxonomy};
use crate::Result;
use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::trace;
use url::Url;

const TOKEN_PATH: &str = "oauth/token";
const GET_CATEGORIES_PATH: &str = "api/v3.0/get_categories";
const CREATE_EXPENSE_PATH: &str = "api/v3.0/create_expense";

/// Talks to Splitwise over HTTPS.
pub(super) struct SplitwiseClient {
    client: reqwest::Client,
    token_url: Url,
    categories_url: Url,
    create_expense_url: Url,
    consumer_key: String,
    consumer_secret: String,
    token: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    categories: Taxonomy,
}

impl SplitwiseClient {
    pub(super) fn new(
        base_url: &Url,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            token_url: base_url.join(TOKEN_PATH)?,
            categories_url: base_url.join(GET_CATEGORIES_PATH)?,
            create_expense_url: base_url.join(CREATE_EXPENSE_PATH)?,
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: OnceCell::new(),
        })
    }

    /// Returns the access token, requesting one the first time this is called.
    async fn token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                trace!("Requesting a Splitwise access token");
                let response = self
                    .client
                    .post(self.token_url.clone())
                    .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
                    .form(&[("grant_type", "client_credentials")])
                    .send()
                    .await
                    .context("Failed to send the Splitwise token request")?;
                let response = check_status(response, "Splitwise authentication").await?;
                let token: TokenResponse = response
                    .json()
                    .await
                    .context("Failed to parse the Splitwise token response")?;
                Ok::<String, anyhow::Error>(token.access_token)
            })
            .await?;
        Ok(token.as_str())
    }
}

#[async_trait::async_trait]
impl Splitwise for SplitwiseClient {
    async fn categories(&self) -> Result<Taxonomy> {
        let token = self.token().await?;
        let response = self
            .client
            .get(self.categories_url.clone())
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send the Splitwise categories request")?;
        let response = check_status(response, "Fetching Splitwise categories").await?;
        let body: CategoriesResponse = response
            .json()
            .await
            .context("Failed to parse the Splitwise categories response")?;
        Ok(body.categories)
    }

    async fn create_expense(&self, expense: &Expense) -> Result<Value> {
        let token = self.token().await?;
        let body = request_body(expense)?;
        trace!("create_expense {body}");
        let response = self
            .client
            .post(self.create_expense_url.clone())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("Failed to send the Splitwise create_expense request")?;
        let response = check_status(response, "Creating the Splitwise expense").await?;
        let body: Value = response
            .json()
            .await
            .context("Failed to parse the Splitwise create_expense response")?;
        if has_errors(&body) {
            bail!("Splitwise rejected the expense: {}", body["errors"]);
        }
        Ok(body)
    }
}

/// Splitwise expects the participants flattened into `users__{index}__{field}` keys rather than a
/// nested list.
fn request_body(expense: &Expense) -> Result<Value> {
    let Value::Object(mut fields) =
        serde_json::to_value(expense).context("Unable to serialize the expense")?
    else {
        bail!("An expense must serialize to a JSON object");
    };
    let users = fields.remove("users").unwrap_or(Value::Null);
    let mut flat = Map::new();
    if let Value::Array(users) = users {
        for (ix, user) in users.into_iter().enumerate() {
            if let Value::Object(user) = user {
                for (key, value) in user {
                    flat.insert(format!("users__{ix}__{key}"), value);
                }
            }
        }
    }
    flat.extend(fields);
    Ok(Value::Object(flat))
}

/// Splitwise answers rejected expenses with a successful status and a non-empty `errors` field.
fn has_errors(body: &Value) -> bool {
    match body.get("errors") {
        None | Some(Value::Null) => false,
        Some(Value::Object(errors)) => !errors.is_empty(),
        Some(Value::Array(errors)) => !errors.is_empty(),
        Some(_) => true,
    }
}
