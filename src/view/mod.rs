//! Everything the operator sees and answers goes through the `View` trait, so that the workflows
//! can be driven by a script in tests.

mod cli;

use crate::model::{CategoryChoice, Transaction};
use crate::session::SubmissionReport;
use crate::Result;

pub use cli::CliView;

/// The prompts and notifications of a split session.
pub trait View: Send {
    /// Shows a transaction that will not be offered for splitting, and waits for acknowledgement.
    fn show_transaction_with_message(&mut self, transaction: &Transaction, message: &str)
        -> Result<()>;

    /// Shows a transaction and asks whether to split it.
    fn ask_include(&mut self, transaction: &Transaction) -> Result<bool>;

    /// Asks which of `choices` the Mint category `mint_category` corresponds to.
    fn choose_category<'a>(
        &mut self,
        mint_category: &str,
        choices: &'a [CategoryChoice],
    ) -> Result<&'a CategoryChoice>;

    /// Shows the full selection and asks whether to upload it.
    fn confirm_selection(&mut self, review: &Review<'_>) -> Result<bool>;

    fn notify_starting_over(&mut self) -> Result<()>;

    fn notify_dry_run(&mut self) -> Result<()>;

    fn notify_submitted(&mut self, report: &SubmissionReport) -> Result<()>;
}

/// A transaction that was selected for splitting, with the label of its Splitwise category.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ReviewItem<'a> {
    pub transaction: &'a Transaction,
    /// Empty when the category has no recorded label.
    pub category_label: &'a str,
}

/// What the operator reviews before anything is uploaded.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Review<'a> {
    pub included: Vec<ReviewItem<'a>>,
    pub excluded: Vec<&'a Transaction>,
}
