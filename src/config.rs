//! Configuration file handling for mintwise.
//!
//! The configuration file defaults to `config.json` in the working directory and holds the
//! Splitwise and Mint credentials, the people and group that expenses are split between, the date
//! range to fetch from Mint, and the locations of the files mintwise keeps between runs.

use crate::model::{AccountCurrencies, GroupId, UserId};
use crate::{utils, Result};
use anyhow::{ensure, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const CATEGORY_MAP_JSON: &str = "data/mintAndSplitwiseCategories.json";
const CATEGORIES_CACHE_JSON: &str = "data/splitwiseCategories.json";
const LOG_FILE: &str = "log/log.log";
const SPLITWISE_BASE_URL: &str = "https://secure.splitwise.com/";
const MINT_BASE_URL: &str = "https://mint.intuit.com/";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to the configuration file. Relative paths inside the file are resolved against the
/// directory that holds it.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    splitwise_base_url: Url,
    mint_base_url: Url,
}

/// The identities that every expense is split between.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Participants {
    pub payer_id: UserId,
    pub borrower_id: UserId,
    pub group_id: GroupId,
}

impl Config {
    /// This will
    /// - load and parse the config file at `path`
    /// - validate the Splitwise identifiers and the date range
    /// - return the loaded configuration object
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = path.into();
        let config_file = ConfigFile::load(&config_path).await?;
        let root = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let splitwise_base_url = parse_url(
            config_file.splitwise_base_url.as_deref(),
            SPLITWISE_BASE_URL,
            "splitwiseBaseUrl",
        )?;
        let mint_base_url =
            parse_url(config_file.mint_base_url.as_deref(), MINT_BASE_URL, "mintBaseUrl")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            splitwise_base_url,
            mint_base_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn splitwise_consumer_key(&self) -> &str {
        &self.config_file.splitwise_consumer_key
    }

    pub fn splitwise_consumer_secret(&self) -> &str {
        &self.config_file.splitwise_consumer_secret
    }

    pub fn splitwise_base_url(&self) -> &Url {
        &self.splitwise_base_url
    }

    pub fn mint_username(&self) -> Option<&str> {
        self.config_file.mint_username.as_deref()
    }

    pub fn mint_password(&self) -> Option<&str> {
        self.config_file.mint_password.as_deref()
    }

    pub fn mint_base_url(&self) -> &Url {
        &self.mint_base_url
    }

    pub fn participants(&self) -> Participants {
        Participants {
            payer_id: self.config_file.splitwise_payer_id,
            borrower_id: self.config_file.splitwise_borrower_id,
            group_id: self.config_file.splitwise_group_id,
        }
    }

    /// The range of dates to fetch from Mint. Only present when both ends are configured.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.config_file.start_date, self.config_file.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn account_currencies(&self) -> AccountCurrencies {
        AccountCurrencies::new(self.config_file.canadian_accounts.iter().map(String::as_str))
    }

    /// Where the Mint to Splitwise category mappings are stored.
    pub fn category_map_path(&self) -> PathBuf {
        self.resolve(self.config_file.category_map_path.as_deref(), CATEGORY_MAP_JSON)
    }

    /// Where the last fetched copy of the Splitwise categories is stored.
    pub fn categories_cache_path(&self) -> PathBuf {
        self.resolve(
            self.config_file.categories_cache_path.as_deref(),
            CATEGORIES_CACHE_JSON,
        )
    }

    /// The audit log.
    pub fn log_path(&self) -> PathBuf {
        self.resolve(self.config_file.log_file.as_deref(), LOG_FILE)
    }

    /// Checks if `p` is relative, and if so, resolves it against the config file's directory.
    fn resolve(&self, p: Option<&Path>, default: &str) -> PathBuf {
        let p = p.unwrap_or_else(|| Path::new(default));
        if p.is_absolute() {
            return p.to_path_buf();
        }
        self.root.join(p)
    }
}

fn parse_url(value: Option<&str>, default: &str, field: &str) -> Result<Url> {
    let value = value.unwrap_or(default);
    Url::parse(value).with_context(|| format!("Invalid {field} in config file: '{value}'"))
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "splitwiseConsumerKey": "k3yk3yk3y",
///   "splitwiseConsumerSecret": "s3cr3t",
///   "splitwiseGroupId": 1234567,
///   "splitwisePayerId": 111,
///   "splitwiseBorrowerId": 222,
///   "mintUsername": "me@example.com",
///   "mintPassword": "hunter2",
///   "startDate": "2022-03-01",
///   "endDate": "2022-03-31",
///   "canadianAccounts": ["Chequing"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    splitwise_consumer_key: String,

    splitwise_consumer_secret: String,

    splitwise_group_id: GroupId,

    /// The Splitwise user who paid for every transaction.
    splitwise_payer_id: UserId,

    /// The Splitwise user who owes half of every transaction.
    splitwise_borrower_id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    mint_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    mint_password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,

    /// Accounts held in CAD. All other accounts are USD.
    #[serde(default)]
    canadian_accounts: Vec<String>,

    /// Relative to the config file or absolute. Defaults to data/mintAndSplitwiseCategories.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_map_path: Option<PathBuf>,

    /// Relative to the config file or absolute. Defaults to data/splitwiseCategories.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categories_cache_path: Option<PathBuf>,

    /// Relative to the config file or absolute. Defaults to log/log.log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    splitwise_base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    mint_base_url: Option<String>,
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if its values are invalid.
    async fn load(path: &Path) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Unable to load the config file at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.splitwise_group_id > 0,
            "splitwiseGroupId must be a positive number"
        );
        ensure!(
            self.splitwise_payer_id > 0,
            "splitwisePayerId must be a positive number"
        );
        ensure!(
            self.splitwise_borrower_id > 0,
            "splitwiseBorrowerId must be a positive number"
        );
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            ensure!(
                start <= end,
                "startDate {start} is after endDate {end} in the config file"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Currency;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"{
        "splitwiseConsumerKey": "key",
        "splitwiseConsumerSecret": "secret",
        "splitwiseGroupId": 30,
        "splitwisePayerId": 10,
        "splitwiseBorrowerId": 20
    }"#;

    async fn load(json: &str) -> Result<Config> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, json).unwrap();
        Config::load(&path).await
    }

    #[tokio::test]
    async fn test_minimal_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, MINIMAL).unwrap();
        let config = Config::load(&path).await.unwrap();

        assert_eq!(dir.path(), config.root());
        assert_eq!("key", config.splitwise_consumer_key());
        assert_eq!(
            Participants {
                payer_id: 10,
                borrower_id: 20,
                group_id: 30
            },
            config.participants()
        );
        assert_eq!(None, config.mint_username());
        assert_eq!(None, config.date_range());
        assert_eq!(
            dir.path().join("data").join("mintAndSplitwiseCategories.json"),
            config.category_map_path()
        );
        assert_eq!(
            dir.path().join("data").join("splitwiseCategories.json"),
            config.categories_cache_path()
        );
        assert_eq!(dir.path().join("log").join("log.log"), config.log_path());
        assert_eq!(SPLITWISE_BASE_URL, config.splitwise_base_url().as_str());
    }

    #[tokio::test]
    async fn test_full_config() {
        let dir = TempDir::new().unwrap();
        let absolute_log = dir.path().join("elsewhere.log");
        let json = serde_json::json!({
            "splitwiseConsumerKey": "key",
            "splitwiseConsumerSecret": "secret",
            "splitwiseGroupId": 30,
            "splitwisePayerId": 10,
            "splitwiseBorrowerId": 20,
            "mintUsername": "me@example.com",
            "mintPassword": "pw",
            "startDate": "2022-03-01",
            "endDate": "2022-03-31",
            "canadianAccounts": ["Chequing"],
            "categoryMapPath": "map.json",
            "logFile": absolute_log,
            "mintBaseUrl": "http://localhost:8080/api/"
        });
        let path = dir.path().join("config.json");
        std::fs::write(&path, json.to_string()).unwrap();
        let config = Config::load(&path).await.unwrap();

        assert_eq!(Some("me@example.com"), config.mint_username());
        assert_eq!(Some("pw"), config.mint_password());
        assert_eq!(
            Some((
                NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2022, 3, 31).unwrap()
            )),
            config.date_range()
        );
        assert_eq!(Currency::Cad, config.account_currencies().currency_of("Chequing"));
        assert_eq!(Currency::Usd, config.account_currencies().currency_of("Visa"));
        assert_eq!(dir.path().join("map.json"), config.category_map_path());
        assert_eq!(absolute_log, config.log_path());
        assert_eq!("http://localhost:8080/api/", config.mint_base_url().as_str());
    }

    #[tokio::test]
    async fn test_only_one_date_is_no_range() {
        let json = MINIMAL.replace("\"splitwiseGroupId\"", "\"startDate\": \"2022-01-01\", \"splitwiseGroupId\"");
        let config = load(&json).await.unwrap();
        assert_eq!(None, config.date_range());
    }

    #[tokio::test]
    async fn test_zero_id_is_rejected() {
        let json = MINIMAL.replace("\"splitwisePayerId\": 10", "\"splitwisePayerId\": 0");
        let err = load(&json).await.unwrap_err();
        assert!(format!("{err:#}").contains("splitwisePayerId"));
    }

    #[tokio::test]
    async fn test_reversed_range_is_rejected() {
        let json = MINIMAL.replace(
            "\"splitwiseGroupId\"",
            "\"startDate\": \"2022-02-01\", \"endDate\": \"2022-01-01\", \"splitwiseGroupId\"",
        );
        let err = load(&json).await.unwrap_err();
        assert!(format!("{err:#}").contains("after endDate"));
    }

    #[tokio::test]
    async fn test_missing_field_fails() {
        let json = MINIMAL.replace("\"splitwiseConsumerKey\": \"key\",", "");
        assert!(load(&json).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("config.json")).await.unwrap_err();
        assert!(format!("{err:#}").contains("config.json"));
    }
}
