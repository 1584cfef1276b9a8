//! These structs provide the CLI interface for the mintwise CLI.

use crate::commands::SplitOptions;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// mintwise: Split your Mint transactions into shared Splitwise expenses.
///
/// Transactions are read from a Mint CSV export (--file) or fetched from Mint for the date range
/// in the config file. For each one you are asked whether to split it. Every Mint category is
/// mapped to a Splitwise category the first time it is seen, and that mapping is remembered. After
/// you review your selections, the expenses are created in Splitwise, each split evenly between
/// the payer and the borrower from the config file.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    /// Use the cached copy of the Splitwise categories and never touch the network. Only allowed
    /// together with --dry-run, and transactions must come from --file.
    #[arg(long)]
    offline: bool,

    /// Do not save anything to Splitwise.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// The path to the configuration file.
    #[arg(short, long, env = "MINTWISE_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// The path to a Mint CSV export to split. If absent, transactions are fetched from Mint.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print every audit log entry to the terminal and log at the debug level or higher. The same
    /// information is always written to the log file.
    #[arg(short, long)]
    debug: bool,

    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

impl Args {
    pub fn config(&self) -> &Path {
        &self.config
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn offline(&self) -> bool {
        self.offline
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The log level, raised to at least `debug` when `--debug` is given.
    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            std::cmp::max(self.log_level, LevelFilter::DEBUG)
        } else {
            self.log_level
        }
    }

    /// The options for the split command.
    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            offline: self.offline,
            save: !self.dry_run,
            file: self.file.clone(),
            debug: self.debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["mintwise"]).unwrap();
        assert_eq!(Path::new("config.json"), args.config());
        assert_eq!(None, args.file());
        assert!(!args.offline());
        assert!(!args.dry_run());
        assert_eq!(LevelFilter::INFO, args.log_level());
        assert!(args.split_options().save);
    }

    #[test]
    fn test_short_flags() {
        let args =
            Args::try_parse_from(["mintwise", "-n", "-d", "-c", "my.json", "-f", "export.csv"])
                .unwrap();
        assert!(args.dry_run());
        assert!(args.debug());
        assert_eq!(Path::new("my.json"), args.config());
        assert_eq!(Some(Path::new("export.csv")), args.file());
        let options = args.split_options();
        assert!(!options.save);
        assert!(options.debug);
    }

    #[test]
    fn test_offline_is_checked_when_splitting() {
        let args = Args::try_parse_from(["mintwise", "--offline"]).unwrap();
        let options = args.split_options();
        assert!(options.offline);
        assert!(options.save);
        let args = Args::try_parse_from(["mintwise", "--offline", "--dry-run"]).unwrap();
        assert!(args.offline());
        assert!(!args.split_options().save);
    }

    #[test]
    fn test_debug_raises_log_level() {
        let args = Args::try_parse_from(["mintwise", "--log-level", "warn", "--debug"]).unwrap();
        assert_eq!(LevelFilter::DEBUG, args.log_level());
        let args = Args::try_parse_from(["mintwise", "--log-level", "trace", "--debug"]).unwrap();
        assert_eq!(LevelFilter::TRACE, args.log_level());
    }
}
