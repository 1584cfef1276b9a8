use crate::audit::AuditLog;
use crate::model::{Amount, CategoryId, Currency, Transaction};
use crate::Result;
use anyhow::bail;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

/// The identifier of a Splitwise user.
pub type UserId = u64;

/// The identifier of a Splitwise group.
pub type GroupId = u64;

/// How Splitwise should treat the expense. We only ever create split expenses.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationMethod {
    #[default]
    Split,
}

serde_plain::derive_display_from_serialize!(CreationMethod);

/// One participant's part in an expense.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ExpenseShare {
    pub(crate) user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) paid_share: Option<Amount>,
    pub(crate) owed_share: Amount,
}

impl ExpenseShare {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn paid_share(&self) -> Option<Amount> {
        self.paid_share
    }

    pub fn owed_share(&self) -> Amount {
        self.owed_share
    }
}

/// A Splitwise expense, derived from exactly one Mint `Transaction`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Expense {
    pub(crate) users: Vec<ExpenseShare>,
    pub(crate) cost: Amount,
    pub(crate) description: String,
    pub(crate) details: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub(crate) date: DateTime<Utc>,
    pub(crate) group_id: GroupId,
    pub(crate) creation_method: CreationMethod,
    pub(crate) payment: bool,
    pub(crate) category_id: CategoryId,
    pub(crate) currency_code: Currency,
}

impl Expense {
    /// The borrower's share comes first, then the payer's.
    pub fn users(&self) -> &[ExpenseShare] {
        &self.users
    }

    pub fn cost(&self) -> Amount {
        self.cost
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// The date in its canonical form, e.g. `2022-03-15T00:00:00.000Z`.
    pub fn timestamp(&self) -> String {
        to_timestamp(&self.date)
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn creation_method(&self) -> CreationMethod {
        self.creation_method
    }

    pub fn is_payment(&self) -> bool {
        self.payment
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn currency_code(&self) -> Currency {
        self.currency_code
    }
}

/// The people and group an expense is split between, and the category it is filed under.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SplitTarget {
    pub payer_id: UserId,
    pub borrower_id: UserId,
    pub group_id: GroupId,
    pub category_id: CategoryId,
}

/// Transforms a debit `Transaction` into an evenly split `Expense`.
///
/// The borrower owes half of the amount rounded to the cent; the payer paid the whole amount and
/// owes whatever is left, so the two owed shares always add up to exactly the amount.
///
/// Both the transaction and the resulting expense are written to `audit`.
///
/// # Errors
/// - Credit transactions cannot be split and are rejected.
/// - Writing to the audit log fails.
pub fn transform(transaction: &Transaction, target: SplitTarget, audit: &AuditLog) -> Result<Expense> {
    if transaction.is_credit() {
        bail!("Credit transactions cannot be split into expenses: {transaction}");
    }

    let amount = transaction.amount();
    let half = (amount.value() / Decimal::TWO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let borrower_share = Amount::new(half)?;
    let payer_share = Amount::new(amount.value() - half)?;

    let expense = Expense {
        users: vec![
            ExpenseShare {
                user_id: target.borrower_id,
                paid_share: None,
                owed_share: borrower_share,
            },
            ExpenseShare {
                user_id: target.payer_id,
                paid_share: Some(amount),
                owed_share: payer_share,
            },
        ],
        cost: amount,
        description: transaction.description().to_string(),
        details: transaction.notes().to_string(),
        date: transaction.date().and_time(chrono::NaiveTime::MIN).and_utc(),
        group_id: target.group_id,
        creation_method: CreationMethod::Split,
        payment: false,
        category_id: target.category_id,
        currency_code: transaction.currency(),
    };

    audit.log("=========TRANSFORMED========")?;
    audit.log_value(transaction)?;
    audit.log("-------------to-------------")?;
    audit.log_value(&expense)?;
    Ok(expense)
}

fn to_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S>(date: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_timestamp(date))
}
