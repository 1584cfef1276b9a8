//! Implements the `Splitwise` and `Mint` traits using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without talking to Splitwise or Mint.

use crate::api::{Mint, MintQuery, MintRecord, Splitwise, MINT_PAGE_SIZE};
use crate::model::{Expense, Subcategory, Taxonomy, TopLevelCategory};
use crate::Result;
use anyhow::{anyhow, bail};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// An implementation of the `Splitwise` trait that holds its categories in memory and remembers
/// the expenses it was asked to create. Clones share the same state, so a test can keep a clone
/// to inspect what happened after handing another one to the code under test.
#[derive(Debug, Clone)]
pub struct TestSplitwise {
    state: Arc<Mutex<SplitwiseState>>,
}

#[derive(Debug, Default)]
struct SplitwiseState {
    taxonomy: Taxonomy,
    created: Vec<Expense>,
    rejected_descriptions: BTreeSet<String>,
    category_requests: usize,
}

impl TestSplitwise {
    /// Create a new `TestSplitwise` that serves `taxonomy`.
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            state: Arc::new(Mutex::new(SplitwiseState {
                taxonomy,
                ..SplitwiseState::default()
            })),
        }
    }

    /// Any expense with this description will be rejected by `create_expense`.
    pub fn reject(&self, description: impl Into<String>) -> Result<()> {
        self.lock()?.rejected_descriptions.insert(description.into());
        Ok(())
    }

    /// The expenses that have been created so far, in the order they were created.
    pub fn created(&self) -> Result<Vec<Expense>> {
        Ok(self.lock()?.created.clone())
    }

    /// How many times the categories have been fetched.
    pub fn category_requests(&self) -> Result<usize> {
        Ok(self.lock()?.category_requests)
    }

    fn lock(&self) -> Result<MutexGuard<'_, SplitwiseState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("The test Splitwise state is poisoned"))
    }
}

impl Default for TestSplitwise {
    /// Seeds the categories with a subset of the real Splitwise categories.
    fn default() -> Self {
        Self::new(default_taxonomy())
    }
}

#[async_trait::async_trait]
impl Splitwise for TestSplitwise {
    async fn categories(&self) -> Result<Taxonomy> {
        let mut state = self.lock()?;
        state.category_requests += 1;
        Ok(state.taxonomy.clone())
    }

    async fn create_expense(&self, expense: &Expense) -> Result<Value> {
        let mut state = self.lock()?;
        if state.rejected_descriptions.contains(expense.description()) {
            bail!(
                "Splitwise rejected the expense: {}",
                json!({"base": [format!("Cannot create '{}'", expense.description())]})
            );
        }
        state.created.push(expense.clone());
        let id = state.created.len();
        Ok(json!({
            "expenses": [{
                "id": id,
                "description": expense.description(),
                "cost": expense.cost(),
            }],
            "errors": {},
        }))
    }
}

/// An implementation of the `Mint` trait that pages through records held in memory.
#[derive(Debug, Clone)]
pub struct TestMint {
    records: Arc<Vec<MintRecord>>,
    requests: Arc<Mutex<Vec<MintQuery>>>,
}

impl TestMint {
    /// Create a new `TestMint` that serves `records`.
    pub fn new(records: Vec<MintRecord>) -> Self {
        Self {
            records: Arc::new(records),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The queries that have been made so far.
    pub fn requests(&self) -> Result<Vec<MintQuery>> {
        Ok(self
            .requests
            .lock()
            .map_err(|_| anyhow!("The test Mint state is poisoned"))?
            .clone())
    }
}

impl Default for TestMint {
    /// Seeds the transactions with a handful of records.
    fn default() -> Self {
        Self::new(default_records())
    }
}

#[async_trait::async_trait]
impl Mint for TestMint {
    async fn transactions(&mut self, query: &MintQuery) -> Result<Vec<MintRecord>> {
        self.requests
            .lock()
            .map_err(|_| anyhow!("The test Mint state is poisoned"))?
            .push(*query);
        Ok(self
            .records
            .iter()
            .skip(query.offset)
            .take(MINT_PAGE_SIZE)
            .cloned()
            .collect())
    }
}

/// A subset of the real Splitwise category tree.
fn default_taxonomy() -> Taxonomy {
    let top = |id, name, subs: &[(u64, &str)]| {
        TopLevelCategory::new(
            id,
            name,
            subs.iter()
                .map(|(id, name)| Subcategory::new(*id, *name))
                .collect(),
        )
    };
    Taxonomy::new(vec![
        top(
            1,
            "Utilities",
            &[(5, "Electricity"), (6, "Heat/gas"), (8, "TV/Phone/Internet"), (7, "Water")],
        ),
        top(
            19,
            "Entertainment",
            &[(20, "Games"), (21, "Movies"), (22, "Music"), (24, "Sports")],
        ),
        top(
            25,
            "Food and drink",
            &[(26, "Dining out"), (12, "Groceries"), (38, "Liquor"), (13, "Other")],
        ),
        top(
            31,
            "Transportation",
            &[(32, "Bus/train"), (15, "Car"), (33, "Gas/fuel"), (9, "Parking"), (36, "Taxi")],
        ),
        top(2, "Uncategorized", &[(18, "General")]),
    ])
}

/// Seed transaction data.
fn default_records() -> Vec<MintRecord> {
    let record = |date: &str, amount: &str, merchant: &str, category: &str, is_debit: bool| {
        MintRecord {
            date: date.to_string(),
            amount: amount.to_string(),
            note: String::new(),
            omerchant: merchant.to_uppercase(),
            merchant: merchant.to_string(),
            is_debit,
            category: category.to_string(),
            account: "Credit Card 1".to_string(),
        }
    };
    vec![
        record("Oct 20", "$87.43", "Whole Foods Market", "Groceries", true),
        record("Oct 19", "$6.75", "Starbucks", "Coffee Shops", true),
        record("Oct 18", "$52.30", "Shell Gas Station", "Gas & Fuel", true),
        record("Oct 17", "$1,250.00", "Payroll", "Paycheck", false),
        record("Oct 16", "$142.67", "PG&E Electric", "Utilities", true),
    ]
}
