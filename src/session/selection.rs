use crate::model::{transform, CategoryId, SplitTarget, Transaction};
use crate::session::{Selection, Session};
use crate::Result;
use anyhow::{ensure, Context};
use tracing::debug;

const CREDIT_NOT_SUPPORTED: &str =
    "Skipping. mintwise does not currently support credit transactions.";

impl Session<'_> {
    /// Asks about every transaction, in order, starting from nothing selected.
    ///
    /// Credit transactions are shown but never offered. For each transaction the operator chooses
    /// to split, its Mint category is resolved to a Splitwise category, asking the operator when
    /// the category has not been mapped before, and the expense is built.
    pub async fn select(&mut self, transactions: &[Transaction]) -> Result<Selection> {
        let mut selection = Selection::new(transactions.len());
        for (ix, transaction) in transactions.iter().enumerate() {
            if transaction.is_credit() {
                self.view
                    .show_transaction_with_message(transaction, CREDIT_NOT_SUPPORTED)?;
                continue;
            }
            if !self.view.ask_include(transaction)? {
                continue;
            }
            let category_id = self.resolve_category(transaction.category()).await?;
            let target = SplitTarget {
                payer_id: self.participants.payer_id,
                borrower_id: self.participants.borrower_id,
                group_id: self.participants.group_id,
                category_id,
            };
            let expense = transform(transaction, target, self.audit)
                .with_context(|| format!("Unable to split {transaction}"))?;
            selection.include(ix, expense);
        }
        Ok(selection)
    }

    /// Looks up the Splitwise category for `mint_category`, asking the operator and remembering
    /// the answer when there is no mapping yet.
    async fn resolve_category(&mut self, mint_category: &str) -> Result<CategoryId> {
        if let Some(id) = self.category_map.lookup(mint_category) {
            return Ok(id);
        }
        let choices = self.categories.taxonomy(self.splitwise).await?.flatten();
        ensure!(
            !choices.is_empty(),
            "There are no Splitwise categories to map '{mint_category}' to"
        );
        let choice = self.view.choose_category(mint_category, &choices)?;
        self.category_map
            .save(mint_category, choice.id(), choice.label())
            .await?;
        debug!("Mapped '{mint_category}' to '{choice}'");
        Ok(choice.id())
    }
}
