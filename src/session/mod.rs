//! One run of mintwise: choosing which transactions to split, reviewing the choices, and
//! submitting the resulting expenses.
//!
//! - `selection` walks the transactions and asks about each one
//! - `confirmation` shows the selection and starts over until the operator accepts it
//! - `submission` creates the accepted expenses in Splitwise

mod confirmation;
mod selection;
mod submission;

use crate::api::Splitwise;
use crate::audit::AuditLog;
use crate::categories::CategorySource;
use crate::category_map::CategoryMap;
use crate::config::Participants;
use crate::model::{Expense, Transaction};
use crate::view::{Review, ReviewItem, View};

pub use submission::{submit, SubmissionOutcome, SubmissionReport};

/// Holds the collaborators that the workflows share for the length of a run.
pub struct Session<'a> {
    view: &'a mut dyn View,
    audit: &'a AuditLog,
    splitwise: &'a dyn Splitwise,
    category_map: CategoryMap,
    categories: CategorySource,
    participants: Participants,
}

impl<'a> Session<'a> {
    pub fn new(
        view: &'a mut dyn View,
        audit: &'a AuditLog,
        splitwise: &'a dyn Splitwise,
        category_map: CategoryMap,
        categories: CategorySource,
        participants: Participants,
    ) -> Self {
        Self {
            view,
            audit,
            splitwise,
            category_map,
            categories,
            participants,
        }
    }

    pub fn category_map(&self) -> &CategoryMap {
        &self.category_map
    }
}

/// Whether a transaction will be split.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub enum Decision {
    #[default]
    Excluded,
    Included(Expense),
}

/// One `Decision` per transaction, in the same order as the transactions.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Selection {
    decisions: Vec<Decision>,
}

impl Selection {
    /// A selection of `len` transactions, all excluded.
    pub fn new(len: usize) -> Self {
        Self {
            decisions: vec![Decision::Excluded; len],
        }
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// The expenses of the included transactions, in transaction order.
    pub fn expenses(&self) -> Vec<&Expense> {
        self.decisions
            .iter()
            .filter_map(|decision| match decision {
                Decision::Included(expense) => Some(expense),
                Decision::Excluded => None,
            })
            .collect()
    }

    fn include(&mut self, ix: usize, expense: Expense) {
        if let Some(decision) = self.decisions.get_mut(ix) {
            *decision = Decision::Included(expense);
        }
    }

    /// Pairs the decisions with their transactions for review. Included transactions are labeled
    /// with the recorded name of their Splitwise category.
    pub fn review<'t>(
        &'t self,
        transactions: &'t [Transaction],
        category_map: &'t CategoryMap,
    ) -> Review<'t> {
        let mut review = Review::default();
        for (transaction, decision) in transactions.iter().zip(&self.decisions) {
            match decision {
                Decision::Included(expense) => review.included.push(ReviewItem {
                    transaction,
                    category_label: category_map
                        .label_for(expense.category_id())
                        .unwrap_or_default(),
                }),
                Decision::Excluded => review.excluded.push(transaction),
            }
        }
        review
    }
}
