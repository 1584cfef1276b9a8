//! mintwise splits Mint transactions into Splitwise expenses, shared evenly between a payer and a
//! borrower.

pub mod api;
pub mod args;
mod audit;
mod categories;
mod category_map;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod session;
mod source;
mod utils;
pub mod view;

pub use api::Mode;
pub use audit::AuditLog;
pub use categories::CategorySource;
pub use category_map::CategoryMap;
pub use config::{Config, Participants};
pub use error::{Error, Result};
pub use source::{Origin, TransactionSource};
