use crate::api::{self, Mode};
use crate::audit::AuditLog;
use crate::categories::CategorySource;
use crate::category_map::CategoryMap;
use crate::commands::Out;
use crate::session::{Session, SubmissionReport};
use crate::source::{Origin, TransactionSource};
use crate::view::View;
use crate::{Config, Result};
use anyhow::ensure;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info};

/// The options of a split run that come from the command line.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct SplitOptions {
    /// Read the Splitwise categories from the cache instead of fetching them.
    pub offline: bool,
    /// Create the expenses in Splitwise. When false this is a dry run.
    pub save: bool,
    /// A Mint CSV export to read instead of fetching from Mint.
    pub file: Option<PathBuf>,
    /// Echo the audit log to the terminal.
    pub debug: bool,
}

/// Runs a whole split session: fetch the transactions, ask the operator which to split, review
/// the selection, and submit the expenses unless this is a dry run.
pub async fn split(
    config: Config,
    mode: Mode,
    options: SplitOptions,
    view: &mut dyn View,
) -> Result<Out<SubmissionReport>> {
    let audit = AuditLog::open(config.log_path(), options.debug)?;
    let participants = config.participants();
    audit.log("options:")?;
    audit.log_value(&json!({
        "offline": options.offline,
        "save": options.save,
        "exportFile": options.file,
        "config": config.config_path(),
        "splitwiseGroupId": participants.group_id,
        "splitwisePayerId": participants.payer_id,
        "splitwiseBorrowerId": participants.borrower_id,
        "dateRange": config.date_range(),
        "mode": format!("{mode:?}"),
    }))?;

    let splitwise = api::splitwise(&config, mode)?;
    let origin = Origin::choose(options.file.as_deref(), options.offline, &config, mode)?;
    ensure!(
        !(options.offline && options.save),
        "Offline mode cannot save to Splitwise, use it together with --dry-run"
    );
    let mut source = TransactionSource::new(origin, config.account_currencies());
    let transactions = source.fetch().await?;
    info!("Loaded {} transactions", transactions.len());

    let category_map = CategoryMap::load(config.category_map_path()).await?;
    debug!("Category mappings are in {}", category_map.path().display());
    let categories = CategorySource::new(config.categories_cache_path(), options.offline);

    let mut session = Session::new(
        view,
        &audit,
        splitwise.as_ref(),
        category_map,
        categories,
        participants,
    );
    let selection = session.select_and_confirm(transactions).await?;
    let count = selection.expenses().len();

    match session.save_if_requested(&selection, options.save).await? {
        None => Ok(Out::new_message(format!(
            "Dry run: {count} expenses were selected and nothing was saved to Splitwise"
        ))),
        Some(report) => Ok(Out::new(
            format!(
                "Saved {} of {} expenses to Splitwise",
                report.succeeded(),
                report.len()
            ),
            report,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{ScriptedView, TestEnv};

    fn export(env: &TestEnv) -> PathBuf {
        let path = env.dir().join("export.csv");
        std::fs::write(
            &path,
            "Date,Description,Original Description,Amount,Transaction Type,Category,Account Name,Labels,Notes\n\
             3/15/2022,Whole Foods,WHOLE FOODS MKT,87.43,debit,Groceries,Visa,,weekly shop\n\
             3/16/2022,Paycheck,ACME PAYROLL,\"2,500.00\",credit,Paycheck,Chequing,,\n\
             3/17/2022,Tim Hortons,TIM HORTONS,4.50,debit,Coffee Shops,Chequing,,\n",
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_dry_run_from_file() {
        let env = TestEnv::new();
        let config = env.config().await;
        let options = SplitOptions {
            offline: false,
            save: false,
            file: Some(export(&env)),
            debug: false,
        };
        // Whole Foods is mapped to choice 1, Tim Hortons is skipped.
        let mut view = ScriptedView::new()
            .include([true, false])
            .categories([1])
            .confirm([true]);

        let out = split(config.clone(), Mode::Test, options, &mut view)
            .await
            .unwrap();
        assert!(out.structure().is_none());
        assert!(out.message().contains("1 expenses were selected"));
        assert_eq!(vec!["Paycheck"], view.shown_with_message);
        assert_eq!(vec!["Whole Foods", "Tim Hortons"], view.asked_include);
        assert_eq!(1, view.dry_runs);

        let log = std::fs::read_to_string(config.log_path()).unwrap();
        assert!(log.contains("options:"));
        assert!(log.contains("=========TRANSFORMED========"));
        assert!(!log.contains("===SUCCESS===="));
        assert!(config.category_map_path().is_file());
        assert!(config.categories_cache_path().is_file());
    }

    #[tokio::test]
    async fn test_save_from_remote() {
        let env = TestEnv::new();
        let config = env.config().await;
        let options = SplitOptions {
            save: true,
            ..SplitOptions::default()
        };
        // The seeded Mint data has four debits and one credit, and none of their categories are
        // mapped yet.
        let mut view = ScriptedView::new()
            .include([true, false, false, false])
            .categories([1])
            .confirm([true]);

        let out = split(config, Mode::Test, options, &mut view).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(1, report.succeeded());
        assert_eq!(vec![(1, 0)], view.submitted);
        assert_eq!(1, view.shown_with_message.len());
    }

    #[tokio::test]
    async fn test_offline_save_is_rejected() {
        let env = TestEnv::new();
        let config = env.config().await;
        let options = SplitOptions {
            offline: true,
            save: true,
            file: Some(export(&env)),
            debug: false,
        };
        let mut view = ScriptedView::new();
        let err = split(config, Mode::Test, options, &mut view)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--dry-run"), "{err:#}");
    }

    #[tokio::test]
    async fn test_offline_without_export_names_the_missing_file() {
        let env = TestEnv::new();
        let config = env.config().await;
        let options = SplitOptions {
            offline: true,
            save: true,
            ..SplitOptions::default()
        };
        let mut view = ScriptedView::new();
        let err = split(config, Mode::Test, options, &mut view)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("--file"), "{err:#}");
        assert!(view.asked_include.is_empty());
    }

    #[tokio::test]
    async fn test_offline_uses_cached_categories() {
        let env = TestEnv::new();
        let config = env.config().await;
        std::fs::create_dir_all(env.dir().join("data")).unwrap();
        std::fs::write(
            config.categories_cache_path(),
            r#"[{"id": 25, "name": "Food and drink", "subcategories": [{"id": 12, "name": "Groceries"}]}]"#,
        )
        .unwrap();
        let options = SplitOptions {
            offline: true,
            save: false,
            file: Some(export(&env)),
            debug: false,
        };
        let mut view = ScriptedView::new()
            .include([true, false])
            .categories([2])
            .confirm([true]);

        split(config, Mode::Test, options, &mut view).await.unwrap();
        let map = env.category_map().await;
        assert_eq!(Some(12), map.lookup("Groceries"));
        assert_eq!(Some("Food and drink > Groceries"), map.label_for(12));
    }
}
