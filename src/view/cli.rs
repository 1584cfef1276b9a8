use crate::model::{CategoryChoice, Transaction};
use crate::session::SubmissionReport;
use crate::view::{Review, View};
use crate::Result;
use anyhow::Context;
use comfy_table::presets::{ASCII_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Cell, Color, ColumnConstraint, ContentArrangement, Table, Width};
use console::{pad_str, style, Alignment};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

const TRANSACTION_HEADERS: [&str; 6] = [
    "date",
    "type",
    "mint category",
    "amount",
    "description",
    "notes",
];
const TRANSACTION_WIDTHS: [u16; 6] = [13, 10, 20, 15, 30, 40];

const REVIEW_HEADERS: [&str; 8] = [
    "ACTION",
    "DATE",
    "TYPE",
    "MINT LABEL",
    "SPLITWISE CATEGORY",
    "AMOUNT",
    "DESCRIPTION",
    "NOTES",
];
const REVIEW_WIDTHS: [u16; 8] = [15, 12, 10, 20, 30, 14, 30, 40];

const PICKER_COLUMNS: usize = 3;
const PICKER_NAME_WIDTH: usize = 35;

/// The terminal `View`, prompting with dialoguer.
pub struct CliView {
    theme: ColorfulTheme,
}

impl CliView {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn ask_yes_no(&self, question: &str) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .interact()
            .context("Unable to read the answer")
    }

    fn notify_info(&self, message: &str) {
        println!();
        println!("{}", style(message).cyan().bold());
    }
}

impl Default for CliView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for CliView {
    fn show_transaction_with_message(
        &mut self,
        transaction: &Transaction,
        message: &str,
    ) -> Result<()> {
        println!("{}", transaction_table(transaction));
        let _: String = Input::with_theme(&self.theme)
            .with_prompt(format!("{message} (press Enter to continue)"))
            .allow_empty(true)
            .interact_text()
            .context("Unable to read the acknowledgement")?;
        Ok(())
    }

    fn ask_include(&mut self, transaction: &Transaction) -> Result<bool> {
        println!("{}", transaction_table(transaction));
        self.ask_yes_no("Split this transaction?")
    }

    fn choose_category<'a>(
        &mut self,
        mint_category: &str,
        choices: &'a [CategoryChoice],
    ) -> Result<&'a CategoryChoice> {
        let count = choices.len();
        println!("The Mint category \"{mint_category}\" hasn't been mapped to a Splitwise category.");
        for row in category_columns(choices) {
            println!("{row}");
        }
        let selection: usize = Input::with_theme(&self.theme)
            .with_prompt(format!(
                "To which Splitwise category do you want to map \"{mint_category}\"? [1-{count}]"
            ))
            .validate_with(move |n: &usize| {
                if (1..=count).contains(n) {
                    Ok(())
                } else {
                    Err(format!("Select a category between 1 and {count}."))
                }
            })
            .interact_text()
            .context("Unable to read the category selection")?;
        selection
            .checked_sub(1)
            .and_then(|ix| choices.get(ix))
            .with_context(|| format!("There is no category number {selection}"))
    }

    fn confirm_selection(&mut self, review: &Review<'_>) -> Result<bool> {
        self.notify_info("Please review your selections:");
        println!("{}", review_table(review));
        self.ask_yes_no(r#"Do you want to upload the transactions in green labeled "SPLIT" to Splitwise?"#)
    }

    fn notify_starting_over(&mut self) -> Result<()> {
        self.notify_info("Resetting selections. Let's take it from the top...");
        Ok(())
    }

    fn notify_dry_run(&mut self) -> Result<()> {
        self.notify_info("Nothing was saved to Splitwise because this is a dry run.");
        Ok(())
    }

    fn notify_submitted(&mut self, report: &SubmissionReport) -> Result<()> {
        println!();
        if report.succeeded() > 0 || report.failed() == 0 {
            let message = format!(
                "Successfully saved {} expenses to Splitwise.",
                report.succeeded()
            );
            println!("{}", style(message).green().bold());
        }
        if report.failed() > 0 {
            let message = format!(
                "Failed to save {} of {} expenses to Splitwise:",
                report.failed(),
                report.len()
            );
            println!("{}", style(message).red().bold());
            for outcome in report.outcomes() {
                if let Some(error) = outcome.error() {
                    println!("{}", style(format!("  {}: {error}", outcome.description())).red());
                }
            }
        }
        Ok(())
    }
}

/// Renders one transaction as a bordered, single-row table.
fn transaction_table(transaction: &Transaction) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            TRANSACTION_HEADERS
                .iter()
                .map(|header| Cell::new(header).fg(Color::Cyan)),
        )
        .add_row(vec![
            Cell::new(transaction.display_date()),
            Cell::new(transaction.transaction_type()),
            Cell::new(one_line(transaction.category())),
            Cell::new(format!(
                "{} {}",
                transaction.currency(),
                transaction.amount().with_commas()
            )),
            Cell::new(one_line(transaction.description())),
            Cell::new(one_line(transaction.notes())),
        ])
        .set_constraints(fixed_widths(&TRANSACTION_WIDTHS));
    table
}

fn fixed_widths(widths: &[u16]) -> Vec<ColumnConstraint> {
    widths
        .iter()
        .map(|width| ColumnConstraint::Absolute(Width::Fixed(*width)))
        .collect()
}

/// Lays the flattened taxonomy out in three numbered columns, filled top to bottom.
fn category_columns(choices: &[CategoryChoice]) -> Vec<String> {
    let rows = choices.len().div_ceil(PICKER_COLUMNS);
    (0..rows)
        .map(|row| {
            (0..PICKER_COLUMNS)
                .filter_map(|col| {
                    let ix = col_start(choices.len(), col) + row;
                    let end = col_start(choices.len(), col + 1);
                    (ix < end).then(|| {
                        let name = pad_str(
                            choices[ix].label(),
                            PICKER_NAME_WIDTH,
                            Alignment::Left,
                            None,
                        );
                        format!("{:>3} | {name}", ix + 1)
                    })
                })
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .collect()
}

/// The index of the first choice in column `col`.
fn col_start(count: usize, col: usize) -> usize {
    (col * count).div_ceil(PICKER_COLUMNS)
}

/// Renders the review as a table, green for what will be split and red for the rest.
fn review_table(review: &Review<'_>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(REVIEW_HEADERS);
    for item in &review.included {
        table.add_row(review_row(
            "SPLIT",
            item.transaction,
            item.category_label,
            Color::Green,
        ));
    }
    for transaction in &review.excluded {
        table.add_row(review_row("DON'T SPLIT", transaction, "", Color::Red));
    }
    table.set_constraints(fixed_widths(&REVIEW_WIDTHS));
    table
}

fn review_row(
    action: &str,
    transaction: &Transaction,
    category_label: &str,
    color: Color,
) -> Vec<Cell> {
    [
        action.to_string(),
        transaction.display_date(),
        transaction.transaction_type().to_string(),
        one_line(transaction.category()),
        category_label.to_string(),
        format!("${}", transaction.amount().with_commas()),
        one_line(transaction.description()),
        one_line(transaction.notes()),
    ]
    .into_iter()
    .map(|text| Cell::new(text).fg(color))
    .collect()
}

/// Notes can span lines, which would break the table layout.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
