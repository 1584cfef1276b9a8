use crate::api::Splitwise;
use crate::audit::AuditLog;
use crate::model::{Amount, Expense};
use crate::session::{Selection, Session};
use crate::Result;
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

/// The result of creating one expense.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    description: String,
    cost: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SubmissionOutcome {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cost(&self) -> Amount {
        self.cost
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The response from Splitwise, when the expense was created.
    pub fn response(&self) -> Option<&Value> {
        self.response.as_ref()
    }

    /// Why the expense was not created.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// One outcome per submitted expense, in submission order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmissionReport {
    outcomes: Vec<SubmissionOutcome>,
}

impl SubmissionReport {
    pub fn outcomes(&self) -> &[SubmissionOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

/// Creates every expense in Splitwise concurrently and waits for all of them. A failed expense
/// does not stop the others and nothing is rolled back. Each outcome is written to `audit`.
pub async fn submit(
    splitwise: &dyn Splitwise,
    audit: &AuditLog,
    expenses: &[&Expense],
) -> Result<SubmissionReport> {
    let results = join_all(
        expenses
            .iter()
            .map(|expense| splitwise.create_expense(expense)),
    )
    .await;

    let mut outcomes = Vec::with_capacity(results.len());
    for (expense, result) in expenses.iter().zip(results) {
        let outcome = match result {
            Ok(response) => {
                info!("Created the Splitwise expense '{}'", expense.description());
                audit.log("===SUCCESS====")?;
                audit.log_value(expense)?;
                audit.log("---response---")?;
                audit.log_value(&response)?;
                SubmissionOutcome {
                    description: expense.description().to_string(),
                    cost: expense.cost(),
                    response: Some(response),
                    error: None,
                }
            }
            Err(e) => {
                error!(
                    "Unable to create the Splitwise expense '{}': {e:#}",
                    expense.description()
                );
                audit.log("!~~~ERROR~~~~!")?;
                audit.log_value(expense)?;
                audit.log("---response---")?;
                audit.log(&format!("{e:#}"))?;
                SubmissionOutcome {
                    description: expense.description().to_string(),
                    cost: expense.cost(),
                    response: None,
                    error: Some(format!("{e:#}")),
                }
            }
        };
        audit.blank()?;
        outcomes.push(outcome);
    }
    Ok(SubmissionReport { outcomes })
}

impl Session<'_> {
    /// Submits the selected expenses when `save` is set. Otherwise nothing is sent and the
    /// operator is told it was a dry run.
    pub async fn save_if_requested(
        &mut self,
        selection: &Selection,
        save: bool,
    ) -> Result<Option<SubmissionReport>> {
        if !save {
            self.view.notify_dry_run()?;
            return Ok(None);
        }
        let report = submit(self.splitwise, self.audit, &selection.expenses()).await?;
        self.view.notify_submitted(&report)?;
        Ok(Some(report))
    }
}
