use crate::model::Transaction;
use crate::session::{Selection, Session};
use crate::Result;
use tracing::debug;

impl Session<'_> {
    /// Runs the selection, shows it for review, and starts over from scratch until the operator
    /// accepts it.
    pub async fn select_and_confirm(&mut self, transactions: &[Transaction]) -> Result<Selection> {
        loop {
            let selection = self.select(transactions).await?;
            if self.confirm(transactions, &selection)? {
                debug!(
                    "Selection accepted with {} expenses",
                    selection.expenses().len()
                );
                return Ok(selection);
            }
            self.view.notify_starting_over()?;
        }
    }

    fn confirm(&mut self, transactions: &[Transaction], selection: &Selection) -> Result<bool> {
        let review = selection.review(transactions, &self.category_map);
        self.view.confirm_selection(&review)
    }
}

#[cfg(test)]
mod tests {
    use crate::test::{credit, debit, ScriptedView, TestEnv};

    #[tokio::test]
    async fn test_rejection_discards_previous_decisions() {
        let env = TestEnv::new();
        env.category_map()
            .await
            .save("Groceries", 12, "Food and drink > Groceries")
            .await
            .unwrap();
        let mut transactions = vec![debit("10.00", "Groceries"), debit("4.00", "Groceries")];
        transactions[1].description = "Bakery".to_string();
        // First pass: split both and reject. Second pass: split only the bakery and accept.
        let mut view = ScriptedView::new()
            .include([true, true, false, true])
            .confirm([false, true]);
        let splitwise = env.splitwise();
        let mut session = env.session(&mut view, &splitwise).await;

        let selection = session.select_and_confirm(&transactions).await.unwrap();
        let expenses = selection.expenses();
        assert_eq!(1, expenses.len());
        assert_eq!("Bakery", expenses[0].description());
        drop(session);

        assert_eq!(1, view.starting_over);
        assert_eq!(2, view.reviews.len());
        assert_eq!(2, view.reviews[0].included.len());
        assert_eq!(0, view.reviews[0].excluded.len());
        assert_eq!(1, view.reviews[1].included.len());
        assert_eq!(vec!["Groceries"], view.reviews[1].excluded);
    }

    #[tokio::test]
    async fn test_review_lists_labels_and_exclusions() {
        let env = TestEnv::new();
        env.category_map()
            .await
            .save("Groceries", 12, "Food and drink > Groceries")
            .await
            .unwrap();
        let transactions = vec![debit("10.00", "Groceries"), credit("20.00", "Paycheck")];
        let mut view = ScriptedView::new().include([true]).confirm([true]);
        let splitwise = env.splitwise();
        let mut session = env.session(&mut view, &splitwise).await;

        session.select_and_confirm(&transactions).await.unwrap();
        drop(session);

        assert_eq!(0, view.starting_over);
        let review = &view.reviews[0];
        assert_eq!(
            vec![("Groceries".to_string(), "Food and drink > Groceries".to_string())],
            review.included
        );
        assert_eq!(vec!["Paycheck"], review.excluded);
    }
}
