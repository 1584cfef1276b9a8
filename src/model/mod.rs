//! Types that represent the core data model, such as `Transaction` and `Expense`.
mod amount;
mod category;
mod expense;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::{CategoryChoice, CategoryId, Subcategory, Taxonomy, TopLevelCategory};
pub use expense::{transform, CreationMethod, Expense, ExpenseShare, GroupId, SplitTarget, UserId};
pub use transaction::{
    parse_mint_export, AccountCurrencies, Currency, Transaction, TransactionType,
};
